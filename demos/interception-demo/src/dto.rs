use serde::{Deserialize, Serialize};

/// 示例数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoDto {
    pub id: String,
    pub name: String,
}

impl DemoDto {
    /// 放入模型时使用的属性名
    pub const ATTRIBUTE: &'static str = "demo";

    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn sample() -> Self {
        Self::new("id", "name")
    }
}

/// 异常处理函数返回的错误响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub message: String,
}

impl ErrorDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

//! 处理器标识
//!
//! 类似 Spring 的 HandlerMethod：记录被调用的控制器类型、方法名以及声明的响应状态码

use axum::http::StatusCode;
use std::fmt;

/// 控制器方法标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerMethod {
    bean_type: &'static str,
    method: &'static str,
    response_status: Option<StatusCode>,
}

impl HandlerMethod {
    /// * `bean_type` - 控制器类型的简单名称，例如 "DemoController"
    /// * `method` - 方法名
    pub fn new(bean_type: &'static str, method: &'static str) -> Self {
        Self {
            bean_type,
            method,
            response_status: None,
        }
    }

    /// 声明成功时的响应状态码（类似 @ResponseStatus）
    pub fn response_status(mut self, status: StatusCode) -> Self {
        self.response_status = Some(status);
        self
    }

    pub fn bean_type(&self) -> &'static str {
        self.bean_type
    }

    pub fn method_name(&self) -> &'static str {
        self.method
    }

    pub fn declared_status(&self) -> Option<StatusCode> {
        self.response_status
    }
}

impl fmt::Display for HandlerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}()", self.bean_type, self.method)
    }
}

/// 分发器处理的目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    /// 已映射的控制器方法
    Method(HandlerMethod),
    /// 没有路由匹配时的兜底处理
    Fallback,
}

impl Handler {
    pub fn as_method(&self) -> Option<&HandlerMethod> {
        match self {
            Handler::Method(method) => Some(method),
            Handler::Fallback => None,
        }
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Method(method) => method.fmt(f),
            Handler::Fallback => write!(f, "fallback"),
        }
    }
}

impl From<HandlerMethod> for Handler {
    fn from(method: HandlerMethod) -> Self {
        Handler::Method(method)
    }
}

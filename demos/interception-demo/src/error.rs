use mvc_web::exception_handler::WebError;
use thiserror::Error;

/// 由 `RestDemoExceptionHandlerAdvice` 处理的业务错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DemoException {
    message: String,
}

impl DemoException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// 没有注册任何处理函数的业务错误，走框架默认的错误响应
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DirectDemoException {
    message: String,
}

impl DirectDemoException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DemoException> for WebError {
    fn from(error: DemoException) -> Self {
        WebError::user_defined(error)
    }
}

impl From<DirectDemoException> for WebError {
    fn from(error: DirectDemoException) -> Self {
        WebError::user_defined(error)
    }
}

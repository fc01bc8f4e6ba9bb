//! 全局异常处理模块
//!
//! 提供类似 Spring Boot @ControllerAdvice + @ExceptionHandler 的全局异常处理功能。
//!
//! 处理器抛出的错误不会在控制器内部捕获，而是统一交给分发器，
//! 分发器通过 [`ExceptionHandlerRegistry`] 按错误类型查找转换函数：
//!
//! 1. 找到匹配的转换函数 - 使用其返回的状态码和响应体
//! 2. 没有匹配 - 使用框架默认的 [`ErrorResponse`]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::{type_name, TypeId};
use std::error::Error as StdError;
use thiserror::Error;

use crate::interceptor::InterceptorError;
use crate::template::TemplateError;

/// 用户自定义错误的装箱形式
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Web 层错误类型
///
/// **注意**：业务错误由用户自己定义，通过 [`WebError::user_defined`] 或
/// `From` 实现包装成 `UserDefined`，再由全局异常处理器按类型处理
#[derive(Error, Debug)]
pub enum WebError {
    /// 内部服务器错误（包括处理器 panic）- 500
    #[error("Internal server error: {0}")]
    Internal(String),

    /// 模型或响应体序列化失败 - 500
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 视图渲染失败 - 500
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// 拦截器执行失败 - 状态码由拦截器错误决定
    #[error(transparent)]
    Interceptor(#[from] InterceptorError),

    /// 没有匹配的处理器 - 404
    #[error("No handler found for {0}")]
    NotFound(String),

    /// 包装用户自定义的业务错误
    #[error("{0}")]
    UserDefined(BoxError),
}

impl WebError {
    pub fn user_defined<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        WebError::UserDefined(Box::new(error))
    }

    /// 获取错误对应的默认 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Interceptor(e) => e.status_code(),
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            // 用户自定义错误 - 没有注册处理器时返回 500
            WebError::UserDefined(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 尝试将包装的业务错误 downcast 为具体类型
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            WebError::UserDefined(e) => e.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// 框架默认的错误响应格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown Error").to_string(),
            message: message.into(),
            path: path.into(),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

type Converter = Box<dyn Fn(&WebError) -> Option<Response> + Send + Sync>;

/// 单个错误类型的处理器注册信息
struct ExceptionHandlerRegistration {
    name: String,
    exception: TypeId,
    exception_name: &'static str,
    convert: Converter,
}

/// 异常处理器注册表
///
/// 错误类型 -> 纯转换函数 `(error) -> (status, body)` 的映射，进程内全局生效，
/// 对所有控制器的所有处理器一视同仁
#[derive(Default)]
pub struct ExceptionHandlerRegistry {
    handlers: Vec<ExceptionHandlerRegistration>,
}

impl ExceptionHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册错误类型 `E` 的转换函数
    ///
    /// 同一错误类型重复注册时，后注册的替换先注册的
    pub fn register<E, F, B>(&mut self, name: impl Into<String>, handler: F)
    where
        E: StdError + Send + Sync + 'static,
        F: Fn(&E) -> (StatusCode, B) + Send + Sync + 'static,
        B: Serialize,
    {
        let name = name.into();
        let exception = TypeId::of::<E>();
        let exception_name = type_name::<E>();

        let convert: Converter = Box::new(move |error: &WebError| {
            let error = error.downcast_ref::<E>()?;
            let (status, body) = handler(error);
            Some((status, Json(body)).into_response())
        });

        let registration = ExceptionHandlerRegistration {
            name,
            exception,
            exception_name,
            convert,
        };

        match self.handlers.iter_mut().find(|h| h.exception == exception) {
            Some(existing) => {
                tracing::warn!(
                    exception = exception_name,
                    previous = %existing.name,
                    handler = %registration.name,
                    "Exception handler replaced"
                );
                *existing = registration;
            }
            None => {
                tracing::debug!(
                    exception = exception_name,
                    handler = %registration.name,
                    "Exception handler registered"
                );
                self.handlers.push(registration);
            }
        }
    }

    /// 是否已为错误类型 `E` 注册转换函数
    pub fn handles<E: StdError + 'static>(&self) -> bool {
        let exception = TypeId::of::<E>();
        self.handlers.iter().any(|h| h.exception == exception)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// 处理异常，返回最终响应
    pub fn resolve(&self, error: &WebError, request_path: &str) -> Response {
        for handler in &self.handlers {
            if let Some(response) = (handler.convert)(error) {
                tracing::debug!(
                    handler = %handler.name,
                    exception = handler.exception_name,
                    status = response.status().as_u16(),
                    path = request_path,
                    "Error handled by exception handler"
                );
                return response;
            }
        }

        self.default_error_response(error, request_path).into_response()
    }

    /// 框架默认的错误响应
    fn default_error_response(&self, error: &WebError, request_path: &str) -> ErrorResponse {
        let status = error.status_code();

        tracing::error!(
            error = %error,
            path = request_path,
            status = status.as_u16(),
            "Error handled by default handler"
        );

        ErrorResponse::new(status, error.to_string(), request_path)
    }
}

impl std::fmt::Debug for ExceptionHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| (h.name.as_str(), h.exception_name)))
            .finish()
    }
}

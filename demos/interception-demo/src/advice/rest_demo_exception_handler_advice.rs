use mvc_web::prelude::*;

use crate::dto::ErrorDto;
use crate::error::DemoException;

/// 将 `DemoException` 转换为 409 + `ErrorDto`，对所有控制器生效
///
/// `DirectDemoException` 没有对应的处理函数
pub struct RestDemoExceptionHandlerAdvice;

impl RestDemoExceptionHandlerAdvice {
    fn handle_demo_exception(error: &DemoException) -> (StatusCode, ErrorDto) {
        tracing::info!("I am the demoException handler");
        (StatusCode::CONFLICT, ErrorDto::new(error.message()))
    }
}

impl ControllerAdvice for RestDemoExceptionHandlerAdvice {
    fn name(&self) -> &str {
        "RestDemoExceptionHandlerAdvice"
    }

    fn register_exception_handlers(&self, registry: &mut ExceptionHandlerRegistry) {
        registry.register("handle_demo_exception", Self::handle_demo_exception);
    }
}

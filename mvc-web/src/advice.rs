//! 控制器增强
//!
//! 类似 Spring 的 @ControllerAdvice：注册一次，对所有控制器生效。
//! 一个 advice 可以：
//!
//! - 在处理器执行前向模型添加属性（@ModelAttribute）
//! - 为特定错误类型注册异常处理函数（@ExceptionHandler）

use crate::exception_handler::{ExceptionHandlerRegistry, WebError};
use crate::model::Model;

pub trait ControllerAdvice: Send + Sync {
    fn name(&self) -> &str;

    /// 每次处理器调用前执行，向本次请求的模型添加属性
    ///
    /// 直接序列化响应体的处理器不会使用模型，这里添加的属性对它们没有可见效果
    fn model_attributes(&self, _model: &mut Model) -> Result<(), WebError> {
        Ok(())
    }

    /// 分发器构建时调用一次，注册异常处理函数
    fn register_exception_handlers(&self, _registry: &mut ExceptionHandlerRegistry) {}
}

mod rest_demo_advice;
mod rest_demo_exception_handler_advice;

pub use rest_demo_advice::RestDemoAdvice;
pub use rest_demo_exception_handler_advice::RestDemoExceptionHandlerAdvice;

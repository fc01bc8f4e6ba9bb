//! 日志拦截器
//!
//! 记录被调用的处理器方法以及它产生的 ModelAndView

use mvc_web::prelude::*;

pub struct DemoInterceptor;

impl DemoInterceptor {
    /// `post_handle` 输出的日志内容；不是控制器方法时返回 `None`
    pub fn describe(handler: &Handler, model_and_view: Option<&ModelAndView>) -> Option<String> {
        let method = handler.as_method()?;
        let model_and_view = model_and_view
            .map(ToString::to_string)
            .unwrap_or_else(|| "null".to_string());

        Some(format!(
            "i am the interceptor and this is the called method '{}' of '{}' -my ModelAndView is '{}'",
            method.method_name(),
            method.bean_type(),
            model_and_view
        ))
    }
}

#[async_trait]
impl HandlerInterceptor for DemoInterceptor {
    fn name(&self) -> &str {
        "DemoInterceptor"
    }

    async fn pre_handle(&self, _request: &mut Parts, _handler: &Handler) -> InterceptorResult<bool> {
        Ok(true)
    }

    async fn post_handle(
        &self,
        _request: &Parts,
        handler: &Handler,
        model_and_view: Option<&ModelAndView>,
    ) -> InterceptorResult<()> {
        if let Some(message) = Self::describe(handler, model_and_view) {
            tracing::info!("{}", message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_serialized_handler() {
        let handler = Handler::from(HandlerMethod::new("RestDemoController", "rest"));

        assert_eq!(
            DemoInterceptor::describe(&handler, None).unwrap(),
            "i am the interceptor and this is the called method 'rest' of 'RestDemoController' -my ModelAndView is 'null'"
        );
    }

    #[test]
    fn test_describe_view_handler() {
        let handler = Handler::from(HandlerMethod::new("DemoController", "welcome"));
        let model = Model::new().with("a", 1).unwrap();
        let model_and_view = ModelAndView::new("welcome", model);

        let message = DemoInterceptor::describe(&handler, Some(&model_and_view)).unwrap();
        assert!(message.ends_with("-my ModelAndView is 'ModelAndView [view=\"welcome\"; model={a=1}]'"));
    }

    #[test]
    fn test_fallback_is_not_described() {
        assert!(DemoInterceptor::describe(&Handler::Fallback, None).is_none());
    }
}

//! 请求分发器
//!
//! 所有处理器调用都经过 [`HandlerDispatcher::dispatch`]：
//!
//! 1. 拦截器 `pre_handle`
//! 2. 各 advice 向模型添加属性
//! 3. 调用处理器（捕获 panic）
//! 4. 成功：拦截器 `post_handle`，然后渲染视图或序列化响应体
//! 5. 失败：交给异常处理器注册表
//! 6. 拦截器 `after_completion`（作用域守卫，任何情况下都会执行）

use axum::{
    extract::Request,
    http::{request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::advice::ControllerAdvice;
use crate::exception_handler::{ExceptionHandlerRegistry, WebError};
use crate::handler::Handler;
use crate::interceptor::{Completion, HandlerInterceptor, InterceptorChain, InterceptorRegistry};
use crate::model::{Model, ModelAndView};
use crate::template::TemplateEngine;

/// 处理器的返回结果
#[derive(Debug)]
pub enum HandlerResult {
    /// 视图渲染路径
    View(ModelAndView),
    /// 响应体序列化路径，`None` 表示处理器返回了空值
    Body(Option<Value>),
}

pub type HandlerFuture = BoxFuture<'static, Result<HandlerResult, WebError>>;

/// 一次处理器调用，接收本次请求的模型
pub type HandlerInvocation = Box<dyn FnOnce(Model) -> HandlerFuture + Send>;

/// 单次请求在分发过程中的状态
struct Exchange {
    parts: Parts,
    handler: Handler,
    chain: InterceptorChain,
    completion: Completion,
}

pub struct HandlerDispatcher {
    interceptors: InterceptorRegistry,
    advices: Vec<Arc<dyn ControllerAdvice>>,
    exception_handlers: ExceptionHandlerRegistry,
    templates: TemplateEngine,
}

impl HandlerDispatcher {
    pub fn builder() -> HandlerDispatcherBuilder {
        HandlerDispatcherBuilder::default()
    }

    pub fn interceptors(&self) -> &InterceptorRegistry {
        &self.interceptors
    }

    pub fn exception_handlers(&self) -> &ExceptionHandlerRegistry {
        &self.exception_handlers
    }

    /// 分发一次请求
    pub async fn dispatch(
        &self,
        request: Request,
        handler: Handler,
        invocation: HandlerInvocation,
    ) -> Response {
        let (parts, _body) = request.into_parts();
        let chain = self.interceptors.chain(parts.uri.path());

        let mut exchange = scopeguard::guard(
            Exchange {
                parts,
                handler,
                chain,
                completion: Completion::default(),
            },
            |exchange| {
                exchange
                    .chain
                    .trigger_after_completion(&exchange.parts, &exchange.handler, &exchange.completion)
            },
        );

        let response = self.process(&mut exchange, invocation).await;
        exchange.completion.set_status(response.status());
        response
    }

    /// 没有路由匹配时的分发
    pub async fn dispatch_fallback(&self, request: Request) -> Response {
        let target = format!("{} {}", request.method(), request.uri().path());
        let invocation: HandlerInvocation =
            Box::new(move |_model: Model| {
                async move { Err::<HandlerResult, _>(WebError::NotFound(target)) }.boxed()
            });

        self.dispatch(request, Handler::Fallback, invocation).await
    }

    async fn process(&self, exchange: &mut Exchange, invocation: HandlerInvocation) -> Response {
        let path = exchange.parts.uri.path().to_string();

        match exchange
            .chain
            .apply_pre_handle(&mut exchange.parts, &exchange.handler)
            .await
        {
            Ok(true) => {}
            Ok(false) => return StatusCode::OK.into_response(),
            Err(e) => return self.handle_error(exchange, e.into(), &path),
        }

        let outcome = match self.invoke(invocation).await {
            Ok(result) => self.handle_result(exchange, result, &path).await,
            Err(error) => Err(error),
        };

        match outcome {
            Ok(response) => response,
            Err(error) => self.handle_error(exchange, error, &path),
        }
    }

    async fn invoke(&self, invocation: HandlerInvocation) -> Result<HandlerResult, WebError> {
        let mut model = Model::new();
        for advice in &self.advices {
            advice.model_attributes(&mut model)?;
        }

        match AssertUnwindSafe(async move { invocation(model).await })
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic);
                tracing::error!(error = %message, "Handler panicked");
                Err(WebError::Internal(message))
            }
        }
    }

    async fn handle_result(
        &self,
        exchange: &Exchange,
        result: HandlerResult,
        path: &str,
    ) -> Result<Response, WebError> {
        match result {
            HandlerResult::View(mut model_and_view) => {
                model_and_view.resolve_view(path);

                exchange
                    .chain
                    .apply_post_handle(&exchange.parts, &exchange.handler, Some(&model_and_view))
                    .await?;

                let (view, model) = model_and_view.into_parts();
                let view = view.unwrap_or_default();
                let html = self.templates.render(&view, &model)?;

                // 视图渲染路径不使用声明的状态码
                Ok(Html(html).into_response())
            }
            HandlerResult::Body(body) => {
                exchange
                    .chain
                    .apply_post_handle(&exchange.parts, &exchange.handler, None)
                    .await?;

                let status = exchange
                    .handler
                    .as_method()
                    .and_then(|method| method.declared_status())
                    .unwrap_or(StatusCode::OK);

                Ok(match body {
                    Some(body) => (status, Json(body)).into_response(),
                    None => status.into_response(),
                })
            }
        }
    }

    fn handle_error(&self, exchange: &mut Exchange, error: WebError, path: &str) -> Response {
        tracing::debug!(handler = %exchange.handler, error = %error, path = path, "Handler raised an error");
        exchange.completion.set_error(error.to_string());
        self.exception_handlers.resolve(&error, path)
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic occurred".to_string()
    }
}

#[derive(Default)]
pub struct HandlerDispatcherBuilder {
    interceptors: InterceptorRegistry,
    advices: Vec<Arc<dyn ControllerAdvice>>,
    templates: Option<TemplateEngine>,
}

impl HandlerDispatcherBuilder {
    pub fn interceptor<I: HandlerInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.register(interceptor);
        self
    }

    pub fn advice<A: ControllerAdvice + 'static>(mut self, advice: A) -> Self {
        tracing::info!(advice = advice.name(), "Controller advice registered");
        self.advices.push(Arc::new(advice));
        self
    }

    pub fn template_engine(mut self, templates: TemplateEngine) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn build(self) -> HandlerDispatcher {
        let mut exception_handlers = ExceptionHandlerRegistry::new();
        for advice in &self.advices {
            advice.register_exception_handlers(&mut exception_handlers);
        }

        tracing::info!(
            interceptors = self.interceptors.len(),
            advices = self.advices.len(),
            exception_handlers = exception_handlers.len(),
            "Handler dispatcher ready"
        );

        HandlerDispatcher {
            interceptors: self.interceptors,
            advices: self.advices,
            exception_handlers,
            templates: self.templates.unwrap_or_else(TemplateEngine::empty),
        }
    }
}

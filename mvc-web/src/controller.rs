//! 控制器支持
//!
//! 提供类似 Spring MVC 的控制器功能。控制器通过 [`Controller::register`]
//! 声明自己的路由，每个路由都经由 [`HandlerDispatcher`] 执行，
//! 因此拦截器与 advice 对所有路由统一生效。

use anyhow::bail;
use axum::{extract::Request, routing::get, Router};
use futures_util::FutureExt;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::dispatcher::{HandlerDispatcher, HandlerFuture, HandlerInvocation, HandlerResult};
use crate::exception_handler::WebError;
use crate::handler::{Handler, HandlerMethod};
use crate::model::{Model, ModelAndView};

/// 路由信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteInfo {
    /// HTTP 方法
    pub method: &'static str,
    /// 完整路径（包含基础路径）
    pub path: String,
}

impl std::fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<6} {}", self.method, self.path)
    }
}

/// 控制器 trait
pub trait Controller: Send + Sync + 'static {
    /// 控制器类型的简单名称
    fn type_name(&self) -> &'static str;

    /// 基础路径（类似类级别的 @RequestMapping）
    fn base_path(&self) -> &'static str {
        ""
    }

    /// 注册路由
    fn register(self: Arc<Self>, mappings: &mut ControllerMappings<'_>) -> anyhow::Result<()>;
}

/// 路由表构建器
pub struct RequestMappings {
    dispatcher: Arc<HandlerDispatcher>,
    router: Router,
    routes: HashMap<RouteInfo, HandlerMethod>,
    order: Vec<RouteInfo>,
}

impl RequestMappings {
    pub fn new(dispatcher: Arc<HandlerDispatcher>) -> Self {
        Self {
            dispatcher,
            router: Router::new(),
            routes: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// 注册一个控制器的所有路由
    pub fn controller<C: Controller>(mut self, controller: C) -> anyhow::Result<Self> {
        let controller = Arc::new(controller);
        let mut mappings = ControllerMappings {
            type_name: controller.type_name(),
            base_path: controller.base_path(),
            inner: &mut self,
        };
        controller.register(&mut mappings)?;
        Ok(self)
    }

    /// 已注册的路由（按注册顺序）
    pub fn routes(&self) -> &[RouteInfo] {
        &self.order
    }

    /// 生成最终路由，未匹配的请求同样经过分发器
    pub fn into_router(self) -> Router {
        let dispatcher = self.dispatcher;
        self.router.fallback(move |request: Request| async move {
            dispatcher.dispatch_fallback(request).await
        })
    }

    fn add_route<F>(&mut self, path: String, handler: HandlerMethod, invoke: F) -> anyhow::Result<()>
    where
        F: Fn(Model) -> HandlerFuture + Clone + Send + Sync + 'static,
    {
        let route = RouteInfo {
            method: "GET",
            path: path.clone(),
        };

        if let Some(existing) = self.routes.get(&route) {
            bail!(
                "Route conflict: {} is mapped by both {} and {}",
                route,
                existing,
                handler
            );
        }

        tracing::debug!(route = %route, handler = %handler, "Mapped route");
        self.routes.insert(route.clone(), handler.clone());
        self.order.push(route);

        let dispatcher = Arc::clone(&self.dispatcher);
        let method_router = get(move |request: Request| {
            let dispatcher = Arc::clone(&dispatcher);
            let handler = Handler::Method(handler.clone());
            let invocation: HandlerInvocation = Box::new(invoke.clone());
            async move { dispatcher.dispatch(request, handler, invocation).await }
        });

        let router = std::mem::replace(&mut self.router, Router::new());
        self.router = router.route(&path, method_router);
        Ok(())
    }
}

/// 单个控制器的路由注册入口
pub struct ControllerMappings<'a> {
    type_name: &'static str,
    base_path: &'static str,
    inner: &'a mut RequestMappings,
}

impl ControllerMappings<'_> {
    /// 当前控制器某个方法的标识
    pub fn handler(&self, method: &'static str) -> HandlerMethod {
        HandlerMethod::new(self.type_name, method)
    }

    /// 注册视图渲染路由
    pub fn view<F, Fut>(&mut self, path: &str, handler: HandlerMethod, f: F) -> anyhow::Result<()>
    where
        F: Fn(Model) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<ModelAndView, WebError>> + Send + 'static,
    {
        let invoke = move |model: Model| -> HandlerFuture {
            let future = f(model);
            async move { future.await.map(HandlerResult::View) }.boxed()
        };
        self.inner.add_route(self.full_path(path), handler, invoke)
    }

    /// 注册响应体序列化路由，处理器返回 `None` 时响应体为空
    pub fn body<T, F, Fut>(&mut self, path: &str, handler: HandlerMethod, f: F) -> anyhow::Result<()>
    where
        T: Serialize,
        F: Fn() -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<T>, WebError>> + Send + 'static,
    {
        let invoke = move |_model: Model| -> HandlerFuture {
            let future = f();
            async move {
                let body = future.await?.map(serde_json::to_value).transpose()?;
                Ok(HandlerResult::Body(body))
            }
            .boxed()
        };
        self.inner.add_route(self.full_path(path), handler, invoke)
    }

    fn full_path(&self, path: &str) -> String {
        join_path(self.base_path, path)
    }
}

fn join_path(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        }
    } else if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pages;

    impl Pages {
        async fn home(&self, model: Model) -> Result<ModelAndView, WebError> {
            Ok(ModelAndView::new("home", model))
        }

        async fn data(&self) -> Result<Option<u32>, WebError> {
            Ok(Some(1))
        }
    }

    impl Controller for Pages {
        fn type_name(&self) -> &'static str {
            "Pages"
        }

        fn base_path(&self) -> &'static str {
            "/pages"
        }

        fn register(self: Arc<Self>, mappings: &mut ControllerMappings<'_>) -> anyhow::Result<()> {
            let this = Arc::clone(&self);
            mappings.view("/", mappings.handler("home"), move |model| {
                let this = Arc::clone(&this);
                async move { this.home(model).await }
            })?;

            let this = Arc::clone(&self);
            mappings.body("data", mappings.handler("data"), move || {
                let this = Arc::clone(&this);
                async move { this.data().await }
            })?;

            Ok(())
        }
    }

    struct Duplicate;

    impl Controller for Duplicate {
        fn type_name(&self) -> &'static str {
            "Duplicate"
        }

        fn base_path(&self) -> &'static str {
            "/pages/"
        }

        fn register(self: Arc<Self>, mappings: &mut ControllerMappings<'_>) -> anyhow::Result<()> {
            mappings.body("/data", mappings.handler("data"), || async {
                Ok::<Option<u32>, WebError>(None)
            })
        }
    }

    fn mappings() -> RequestMappings {
        RequestMappings::new(Arc::new(HandlerDispatcher::builder().build()))
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "/"), "/");
        assert_eq!(join_path("", "withNull"), "/withNull");
        assert_eq!(join_path("/rest", "/"), "/rest/");
        assert_eq!(join_path("/rest/", "/withNull"), "/rest/withNull");
        assert_eq!(join_path("/rest", "withNull"), "/rest/withNull");
    }

    #[test]
    fn test_routes_are_listed_in_order() {
        let mappings = mappings().controller(Pages).unwrap();
        let paths: Vec<&str> = mappings.routes().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/pages/", "/pages/data"]);
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let error = match mappings().controller(Pages).unwrap().controller(Duplicate) {
            Ok(_) => panic!("duplicate route accepted"),
            Err(error) => error,
        };
        let message = error.to_string();

        assert!(message.contains("/pages/data"));
        assert!(message.contains("Pages#data()"));
        assert!(message.contains("Duplicate#data()"));
    }
}

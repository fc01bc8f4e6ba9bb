//! 请求/响应拦截器模块
//!
//! 提供类似 Spring HandlerInterceptor 的拦截器功能：
//!
//! - `pre_handle` - 处理器执行前调用，返回 `false` 终止请求
//! - `post_handle` - 处理器成功执行后、响应渲染前调用；处理器出错时不会调用
//! - `after_completion` - 响应生成后调用，无论成功、失败、panic 还是请求被取消

use async_trait::async_trait;
use axum::http::{request::Parts, StatusCode};
use std::sync::Arc;

use crate::handler::Handler;
use crate::model::ModelAndView;

/// 处理器拦截器 trait - 类似Spring的HandlerInterceptor
#[async_trait]
pub trait HandlerInterceptor: Send + Sync {
    fn name(&self) -> &str;

    /// 数字越小越先执行 `pre_handle`
    fn priority(&self) -> i32 {
        100
    }

    /// 请求预处理 - 在控制器方法执行前调用
    /// 返回false表示请求应该被终止
    async fn pre_handle(&self, request: &mut Parts, handler: &Handler) -> InterceptorResult<bool>;

    /// 请求后处理 - 在控制器方法执行后调用（但在响应渲染前）
    ///
    /// 视图处理器传入 `Some(ModelAndView)`，直接序列化响应体的处理器传入 `None`
    async fn post_handle(
        &self,
        _request: &Parts,
        _handler: &Handler,
        _model_and_view: Option<&ModelAndView>,
    ) -> InterceptorResult<()> {
        Ok(())
    }

    /// 完成处理 - 在响应生成后调用（用于清理资源）
    ///
    /// 由作用域守卫触发，因此是同步方法
    fn after_completion(
        &self,
        _request: &Parts,
        _handler: &Handler,
        _completion: &Completion,
    ) -> InterceptorResult<()> {
        Ok(())
    }

    /// 拦截器路径匹配 - 决定哪些路径应用此拦截器
    fn path_patterns(&self) -> Vec<&str> {
        vec!["/**"]
    }

    /// 排除路径 - 不应用此拦截器的路径
    fn exclude_patterns(&self) -> Vec<&str> {
        vec![]
    }
}

/// 拦截器执行结果
pub type InterceptorResult<T> = Result<T, InterceptorError>;

#[derive(Debug, thiserror::Error)]
pub enum InterceptorError {
    #[error("Interceptor execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Access denied")]
    AccessDenied,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl InterceptorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ExecutionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// 请求完成时的状态，交给 `after_completion`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    status: Option<StatusCode>,
    error: Option<String>,
}

impl Completion {
    /// 最终响应的状态码；请求在生成响应前被取消时为 `None`
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// 处理器抛出的错误信息（如果有）
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub(crate) fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }
}

/// 简化的路径匹配器
#[derive(Debug, Clone)]
struct PathMatcher {
    patterns: Vec<String>,
}

impl PathMatcher {
    fn new(patterns: Vec<&str>) -> Self {
        Self {
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| Self::match_pattern(pattern, path))
    }

    fn match_pattern(pattern: &str, path: &str) -> bool {
        if pattern == "/**" {
            return true;
        }

        if let Some(prefix) = pattern.strip_suffix("/**") {
            return path == prefix || path.starts_with(&format!("{}/", prefix));
        }

        // 简单的单级通配符支持
        if let Some((prefix, suffix)) = pattern.split_once('*') {
            if !suffix.contains('*') {
                return path.len() >= prefix.len() + suffix.len()
                    && path.starts_with(prefix)
                    && path.ends_with(suffix);
            }
        }

        pattern == path
    }
}

/// 拦截器包装器
struct InterceptorWrapper {
    interceptor: Arc<dyn HandlerInterceptor>,
    include_matcher: PathMatcher,
    exclude_matcher: PathMatcher,
}

impl InterceptorWrapper {
    fn new(interceptor: Arc<dyn HandlerInterceptor>) -> Self {
        let include_matcher = PathMatcher::new(interceptor.path_patterns());
        let exclude_matcher = PathMatcher::new(interceptor.exclude_patterns());

        Self {
            interceptor,
            include_matcher,
            exclude_matcher,
        }
    }

    fn should_apply(&self, path: &str) -> bool {
        self.include_matcher.matches(path) && !self.exclude_matcher.matches(path)
    }
}

/// 拦截器注册表
#[derive(Default)]
pub struct InterceptorRegistry {
    interceptors: Vec<InterceptorWrapper>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<I: HandlerInterceptor + 'static>(&mut self, interceptor: I) {
        self.register_arc(Arc::new(interceptor));
    }

    pub fn register_arc(&mut self, interceptor: Arc<dyn HandlerInterceptor>) {
        tracing::info!(
            interceptor = interceptor.name(),
            priority = interceptor.priority(),
            "Handler interceptor registered"
        );
        self.interceptors.push(InterceptorWrapper::new(interceptor));
        // 稳定排序：同优先级保持注册顺序
        self.interceptors.sort_by_key(|w| w.interceptor.priority());
    }

    /// 为一次请求选出适用的拦截器
    pub fn chain(&self, path: &str) -> InterceptorChain {
        let interceptors = self
            .interceptors
            .iter()
            .filter(|w| w.should_apply(path))
            .map(|w| Arc::clone(&w.interceptor))
            .collect();

        InterceptorChain {
            interceptors,
            entered: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

/// 单次请求的拦截器执行链
///
/// 记录 `pre_handle` 已成功执行到第几个拦截器，
/// `after_completion` 只回调这些拦截器
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn HandlerInterceptor>>,
    entered: usize,
}

impl InterceptorChain {
    /// 按优先级顺序执行 `pre_handle`，遇到 `false` 或错误立即停止
    pub async fn apply_pre_handle(
        &mut self,
        request: &mut Parts,
        handler: &Handler,
    ) -> InterceptorResult<bool> {
        let path = request.uri.path().to_string();

        for interceptor in &self.interceptors {
            let proceed = interceptor
                .pre_handle(request, handler)
                .await
                .map_err(|e| {
                    tracing::warn!(
                        interceptor = interceptor.name(),
                        error = %e,
                        path = %path,
                        "Interceptor pre_handle failed"
                    );
                    e
                })?;

            if !proceed {
                tracing::info!(
                    interceptor = interceptor.name(),
                    path = %path,
                    "Request terminated by interceptor"
                );
                return Ok(false);
            }

            self.entered += 1;
        }

        Ok(true)
    }

    /// 反向执行post_handle（LIFO顺序）
    pub async fn apply_post_handle(
        &self,
        request: &Parts,
        handler: &Handler,
        model_and_view: Option<&ModelAndView>,
    ) -> InterceptorResult<()> {
        for interceptor in self.interceptors[..self.entered].iter().rev() {
            interceptor
                .post_handle(request, handler, model_and_view)
                .await
                .map_err(|e| {
                    tracing::warn!(
                        interceptor = interceptor.name(),
                        error = %e,
                        path = %request.uri.path(),
                        "Interceptor post_handle failed"
                    );
                    e
                })?;
        }

        Ok(())
    }

    /// 确保所有已进入的拦截器的after_completion都被调用，即使有错误
    pub fn trigger_after_completion(&self, request: &Parts, handler: &Handler, completion: &Completion) {
        for interceptor in self.interceptors[..self.entered].iter().rev() {
            if let Err(e) = interceptor.after_completion(request, handler, completion) {
                tracing::error!(
                    interceptor = interceptor.name(),
                    error = %e,
                    path = %request.uri.path(),
                    "Interceptor after_completion failed"
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

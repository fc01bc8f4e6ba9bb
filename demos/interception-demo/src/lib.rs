//! 拦截器、控制器增强与异常处理在视图路由和 REST 路由上的交互示例
//!
//! - [`DemoController`] - 视图路由（模型 + 模板）
//! - [`RestDemoController`] - REST 路由（直接序列化响应体）
//! - [`DemoInterceptor`] - 记录处理器方法与 ModelAndView 的拦截器
//! - [`RestDemoAdvice`] - 向模型添加属性的 advice
//! - [`RestDemoExceptionHandlerAdvice`] - 将 `DemoException` 转换为 409 的 advice

pub mod advice;
pub mod controller;
pub mod dto;
pub mod error;
pub mod interceptors;

use anyhow::Context;
use mvc_core::{Environment, EnvironmentPropertySource, TomlPropertySource};
use mvc_web::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use advice::{RestDemoAdvice, RestDemoExceptionHandlerAdvice};
pub use controller::{DemoController, RestDemoController};
pub use interceptors::DemoInterceptor;

/// 配置文件名
pub const CONFIG_FILE: &str = "application.toml";

/// 环境变量前缀，例如 `DEMO_SERVER_PORT`
pub const ENV_PREFIX: &str = "DEMO_";

/// 组装分发器：拦截器、advice 和模板引擎
pub fn dispatcher(templates: TemplateEngine) -> HandlerDispatcher {
    HandlerDispatcher::builder()
        .interceptor(DemoInterceptor)
        .advice(RestDemoAdvice)
        .advice(RestDemoExceptionHandlerAdvice)
        .template_engine(templates)
        .build()
}

/// 注册全部控制器
pub fn request_mappings(templates: TemplateEngine) -> anyhow::Result<RequestMappings> {
    RequestMappings::new(Arc::new(dispatcher(templates)))
        .controller(DemoController)?
        .controller(RestDemoController)
}

/// 完整的应用路由
pub fn router(templates: TemplateEngine) -> anyhow::Result<Router> {
    Ok(request_mappings(templates)?.into_router())
}

/// 依次在当前目录和 crate 目录查找配置文件所在的目录
pub fn config_dir() -> PathBuf {
    let candidates = [PathBuf::from("."), PathBuf::from(env!("CARGO_MANIFEST_DIR"))];
    candidates
        .iter()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}

/// 加载配置：配置文件（可选）+ 环境变量
pub fn load_environment(dir: &Path) -> anyhow::Result<Environment> {
    let env = Environment::new().with_property_source(EnvironmentPropertySource::new(ENV_PREFIX));

    let file = dir.join(CONFIG_FILE);
    if file.is_file() {
        let source = TomlPropertySource::from_file(&file)
            .with_context(|| format!("Failed to load {}", file.display()))?;
        env.add_property_source(Box::new(source));
    }

    Ok(env)
}

/// 模板配置，相对路径的模板模式以配置目录为基准
pub fn template_properties(env: &Environment, dir: &Path) -> TemplateProperties {
    let mut properties = TemplateProperties::from_environment(env);
    if Path::new(&properties.pattern).is_relative() {
        properties.pattern = dir.join(&properties.pattern).to_string_lossy().into_owned();
    }
    properties
}

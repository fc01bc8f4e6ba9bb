//! 模板引擎支持
//!
//! 基于 Tera 模板引擎渲染视图。视图名加上配置的后缀即为模板名，
//! 例如视图 `welcome` 对应模板 `welcome.html`。

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tera::Tera;

use crate::constants::*;
use crate::model::Model;
use mvc_core::Environment;

/// Tera 模板引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateProperties {
    /// Tera 模板模式（默认 "templates/**/*.html"）
    pub pattern: String,

    /// 视图名到模板名的后缀（默认 ".html"）
    pub suffix: String,
}

impl Default for TemplateProperties {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TEMPLATE_PATTERN.to_string(),
            suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
        }
    }
}

impl TemplateProperties {
    /// 从 Environment 加载配置
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            pattern: env.get_string_or(TEMPLATE_PATTERN, DEFAULT_TEMPLATE_PATTERN),
            suffix: env.get_string_or(TEMPLATE_SUFFIX, DEFAULT_TEMPLATE_SUFFIX),
        }
    }
}

/// 模板错误类型
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to render template '{template}': {cause}")]
    RenderError { template: String, cause: String },

    #[error("Template initialization error: {0}")]
    InitError(String),
}

/// 模板引擎
///
/// 启动时加载全部模板，之后只读共享
#[derive(Clone)]
pub struct TemplateEngine {
    tera: Arc<Tera>,
    suffix: String,
}

impl TemplateEngine {
    /// 按 glob 模式加载模板
    pub fn new(properties: &TemplateProperties) -> Result<Self, TemplateError> {
        let tera = Tera::new(&properties.pattern).map_err(|e| {
            TemplateError::InitError(format!(
                "Failed to initialize Tera with pattern '{}': {}",
                properties.pattern, e
            ))
        })?;

        let names: Vec<&str> = tera.get_template_names().collect();
        tracing::info!(
            pattern = %properties.pattern,
            templates = ?names,
            "Template engine created"
        );

        Ok(Self {
            tera: Arc::new(tera),
            suffix: properties.suffix.clone(),
        })
    }

    /// 从内存中的模板创建（模板名需包含后缀）
    pub fn from_raw_templates<'a, I>(templates: I, suffix: &str) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| TemplateError::InitError(e.to_string()))?;

        Ok(Self {
            tera: Arc::new(tera),
            suffix: suffix.to_string(),
        })
    }

    /// 没有任何模板的引擎，渲染任何视图都会失败
    pub fn empty() -> Self {
        Self {
            tera: Arc::new(Tera::default()),
            suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
        }
    }

    /// 视图名对应的模板名
    pub fn template_name(&self, view: &str) -> String {
        format!("{}{}", view, self.suffix)
    }

    /// 渲染视图
    pub fn render(&self, view: &str, model: &Model) -> Result<String, TemplateError> {
        let template = self.template_name(view);

        let context = tera::Context::from_value(model.clone().into_value()).map_err(|e| {
            TemplateError::RenderError {
                template: template.clone(),
                cause: e.to_string(),
            }
        })?;

        self.tera
            .render(&template, &context)
            .map_err(|e| TemplateError::RenderError {
                template,
                cause: render_cause(&e),
            })
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates", &self.tera.get_template_names().collect::<Vec<_>>())
            .field("suffix", &self.suffix)
            .finish()
    }
}

/// Tera 的错误信息在 source 链里，拼接成一行便于日志查看
fn render_cause(error: &tera::Error) -> String {
    let mut cause = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        cause.push_str(": ");
        cause.push_str(&inner.to_string());
        source = inner.source();
    }
    cause
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> TemplateEngine {
        TemplateEngine::from_raw_templates(
            [("hello.html", "Hello {{ name }}")],
            ".html",
        )
        .unwrap()
    }

    #[test]
    fn test_render_with_model() {
        let model = Model::new().with("name", "World").unwrap();
        assert_eq!(engine().render("hello", &model).unwrap(), "Hello World");
    }

    #[test]
    fn test_missing_template_is_error() {
        let result = engine().render("absent", &Model::new());
        match result {
            Err(TemplateError::RenderError { template, .. }) => assert_eq!(template, "absent.html"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_engine_cannot_render() {
        assert!(TemplateEngine::empty().render("hello", &Model::new()).is_err());
    }
}

//! 模型与视图
//!
//! `Model` 保存视图渲染所需的数据，`ModelAndView` 把模型和视图名绑定在一起，
//! 类似 Spring MVC 的 ModelAndView。

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::constants::DEFAULT_VIEW_NAME;
use crate::exception_handler::WebError;

/// 请求级别的模型数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    attributes: Map<String, Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加模型属性，同名属性会被覆盖
    pub fn insert<K: Into<String>, V: Serialize>(&mut self, key: K, value: V) -> Result<(), WebError> {
        let value = serde_json::to_value(value)?;
        self.attributes.insert(key.into(), value);
        Ok(())
    }

    /// 链式添加模型属性
    pub fn with<K: Into<String>, V: Serialize>(mut self, key: K, value: V) -> Result<Self, WebError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.attributes)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// 视图渲染结果 - 视图名 + 模型
///
/// 视图名为空时由分发器根据请求路径推导（见 [`translate_view_name`]）
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAndView {
    view: Option<String>,
    model: Model,
}

impl ModelAndView {
    /// 指定视图名
    pub fn new(view: impl Into<String>, model: Model) -> Self {
        Self {
            view: Some(view.into()),
            model,
        }
    }

    /// 处理器返回的是一个值而不是视图名
    ///
    /// 值存在时以 `attribute` 为键放入模型；值为 `None` 时模型保持不变，
    /// 不会序列化任何内容。视图名留空，由请求路径推导。
    pub fn from_return_value<T: Serialize>(
        mut model: Model,
        attribute: &str,
        value: Option<T>,
    ) -> Result<Self, WebError> {
        if let Some(value) = value {
            model.insert(attribute, value)?;
        }
        Ok(Self { view: None, model })
    }

    pub fn view_name(&self) -> Option<&str> {
        self.view.as_deref()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn into_parts(self) -> (Option<String>, Model) {
        (self.view, self.model)
    }

    /// 视图名为空时使用请求路径推导出的默认视图名
    pub(crate) fn resolve_view(&mut self, request_path: &str) {
        if self.view.is_none() {
            self.view = Some(translate_view_name(request_path));
        }
    }
}

impl fmt::Display for ModelAndView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.view {
            Some(view) => write!(f, "ModelAndView [view=\"{}\"; model={}]", view, self.model),
            None => write!(f, "ModelAndView [view=[none]; model={}]", self.model),
        }
    }
}

/// 根据请求路径推导默认视图名
///
/// `/withNull` -> `withNull`，`/docs/page.html` -> `docs/page`，`/` -> `index`
pub fn translate_view_name(path: &str) -> String {
    let trimmed = path.trim_start_matches('/').trim_end_matches('/');

    let without_extension = match trimmed.rfind('.') {
        Some(dot) if !trimmed[dot..].contains('/') => &trimmed[..dot],
        _ => trimmed,
    };

    if without_extension.is_empty() {
        DEFAULT_VIEW_NAME.to_string()
    } else {
        without_extension.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Payload {
        id: &'static str,
    }

    #[test]
    fn test_view_name_translation() {
        assert_eq!(translate_view_name("/withNull"), "withNull");
        assert_eq!(translate_view_name("/rest/withNull/"), "rest/withNull");
        assert_eq!(translate_view_name("/docs/page.html"), "docs/page");
        assert_eq!(translate_view_name("/v1.2/page"), "v1.2/page");
        assert_eq!(translate_view_name("/"), "index");
        assert_eq!(translate_view_name(""), "index");
    }

    #[test]
    fn test_none_return_value_leaves_model_untouched() {
        let model = Model::new().with("existing", 1).unwrap();
        let mav = ModelAndView::from_return_value(model, "demo", None::<Payload>).unwrap();

        assert!(mav.view_name().is_none());
        assert!(!mav.model().contains("demo"));
        assert_eq!(mav.model().len(), 1);
    }

    #[test]
    fn test_some_return_value_is_exposed_under_attribute() {
        let mav = ModelAndView::from_return_value(Model::new(), "demo", Some(Payload { id: "id" }))
            .unwrap();

        assert_eq!(mav.model().get("demo"), Some(&json!({"id": "id"})));
    }

    #[test]
    fn test_resolve_view_keeps_explicit_name() {
        let mut explicit = ModelAndView::new("welcome", Model::new());
        explicit.resolve_view("/other");
        assert_eq!(explicit.view_name(), Some("welcome"));

        let mut derived = ModelAndView::from_return_value(Model::new(), "demo", None::<Payload>).unwrap();
        derived.resolve_view("/withNull");
        assert_eq!(derived.view_name(), Some("withNull"));
    }

    #[test]
    fn test_display() {
        let model = Model::new().with("name", "x").unwrap();
        let mav = ModelAndView::new("welcome", model);
        assert_eq!(mav.to_string(), r#"ModelAndView [view="welcome"; model={name="x"}]"#);
    }
}

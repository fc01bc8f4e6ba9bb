//! 视图控制器
//!
//! 处理器填充模型并选择模板，由模板引擎渲染为 HTML

use mvc_web::prelude::*;
use std::sync::Arc;

use crate::dto::DemoDto;
use crate::error::{DemoException, DirectDemoException};

pub struct DemoController;

impl DemoController {
    async fn welcome(mut model: Model) -> Result<ModelAndView, WebError> {
        let time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        model.insert("time", time)?;
        model.insert(DemoDto::ATTRIBUTE, DemoDto::sample())?;
        Ok(ModelAndView::new("welcome", model))
    }

    /// 返回空值：模型中不添加任何属性，视图名由请求路径推导
    async fn rest_with_null(model: Model) -> Result<ModelAndView, WebError> {
        ModelAndView::from_return_value::<DemoDto>(model, DemoDto::ATTRIBUTE, None)
    }

    async fn rest_with_exception(_model: Model) -> Result<ModelAndView, WebError> {
        Err(DemoException::new("oh no").into())
    }

    async fn rest_with_direct_exception(_model: Model) -> Result<ModelAndView, WebError> {
        Err(DirectDemoException::new("oh no").into())
    }
}

impl Controller for DemoController {
    fn type_name(&self) -> &'static str {
        "DemoController"
    }

    fn register(self: Arc<Self>, mappings: &mut ControllerMappings<'_>) -> anyhow::Result<()> {
        let welcome = mappings.handler("welcome");
        mappings.view("/", welcome, Self::welcome)?;

        let with_null = mappings.handler("rest_with_null").response_status(StatusCode::CREATED);
        mappings.view("/withNull", with_null, Self::rest_with_null)?;

        let with_exception = mappings
            .handler("rest_with_exception")
            .response_status(StatusCode::CREATED);
        mappings.view("/withException", with_exception, Self::rest_with_exception)?;

        let with_direct_exception = mappings
            .handler("rest_with_direct_exception")
            .response_status(StatusCode::CREATED);
        mappings.view(
            "/withDirectException",
            with_direct_exception,
            Self::rest_with_direct_exception,
        )?;

        Ok(())
    }
}

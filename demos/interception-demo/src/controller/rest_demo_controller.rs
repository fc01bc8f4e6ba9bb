//! REST 控制器
//!
//! 返回值直接序列化为 JSON 响应体，不经过模型和模板

use mvc_web::prelude::*;
use std::sync::Arc;

use crate::dto::DemoDto;
use crate::error::{DemoException, DirectDemoException};

pub struct RestDemoController;

impl RestDemoController {
    async fn rest() -> Result<Option<DemoDto>, WebError> {
        Ok(Some(DemoDto::sample()))
    }

    async fn rest_with_null() -> Result<Option<DemoDto>, WebError> {
        Ok(None)
    }

    async fn rest_with_exception() -> Result<Option<DemoDto>, WebError> {
        Err(DemoException::new("oh no").into())
    }

    async fn rest_with_another_exception() -> Result<Option<DemoDto>, WebError> {
        Err(DemoException::new("oh no").into())
    }

    async fn rest_with_direct_exception() -> Result<Option<DemoDto>, WebError> {
        Err(DirectDemoException::new("oh no").into())
    }
}

impl Controller for RestDemoController {
    fn type_name(&self) -> &'static str {
        "RestDemoController"
    }

    fn base_path(&self) -> &'static str {
        "/rest"
    }

    fn register(self: Arc<Self>, mappings: &mut ControllerMappings<'_>) -> anyhow::Result<()> {
        let rest = mappings.handler("rest").response_status(StatusCode::CREATED);
        mappings.body("/", rest, Self::rest)?;

        // 没有声明状态码，空响应体使用默认的 200
        let with_null = mappings.handler("rest_with_null");
        mappings.body("/withNull", with_null, Self::rest_with_null)?;

        let with_exception = mappings
            .handler("rest_with_exception")
            .response_status(StatusCode::CREATED);
        mappings.body("/withException", with_exception, Self::rest_with_exception)?;

        let with_another_exception = mappings
            .handler("rest_with_another_exception")
            .response_status(StatusCode::CREATED);
        mappings.body(
            "/withAnotherException",
            with_another_exception,
            Self::rest_with_another_exception,
        )?;

        let with_direct_exception = mappings
            .handler("rest_with_direct_exception")
            .response_status(StatusCode::CREATED);
        mappings.body(
            "/withDirectException",
            with_direct_exception,
            Self::rest_with_direct_exception,
        )?;

        Ok(())
    }
}

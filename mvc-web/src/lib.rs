//! # MVC Web
//!
//! 基于 Axum 的 Spring MVC 风格请求处理
//!
//! ## 核心特性
//!
//! - **拦截器** - `pre_handle` / `post_handle` / `after_completion` 三个阶段
//! - **控制器增强** - 全局模型属性与按错误类型注册的异常处理函数
//! - **视图渲染** - 基于 Tera 的模板视图，以及直接序列化的响应体
//! - **中间件支持** - 集成 Tower 中间件生态系统

pub mod advice;
pub mod constants;
pub mod controller;
pub mod dispatcher;
pub mod exception_handler;
pub mod handler;
pub mod interceptor;
pub mod middleware;
pub mod model;
pub mod server;
pub mod template;

pub mod prelude {
    //! 预导入模块

    pub use crate::advice::*;
    pub use crate::controller::*;
    pub use crate::dispatcher::*;
    pub use crate::exception_handler::*;
    pub use crate::handler::*;
    pub use crate::interceptor::*;
    pub use crate::model::*;
    pub use crate::server::*;
    pub use crate::template::*;

    pub use async_trait::async_trait;
    pub use axum;
    pub use axum::http::{request::Parts, StatusCode};
    pub use axum::response::{IntoResponse, Response};
    pub use axum::Router;
}

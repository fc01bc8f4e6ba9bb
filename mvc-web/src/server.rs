//! Web 服务器模块
//!
//! 基于 Axum 的 Web 服务器实现

use anyhow::Context;
use axum::{middleware::from_fn, Router};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

use crate::constants::*;
use crate::middleware::request_logging;
use mvc_core::Environment;

/// Web 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerProperties {
    /// 服务器监听地址
    pub host: String,

    /// 服务器监听端口
    pub port: u16,

    /// 请求超时时间（秒）
    pub request_timeout: u64,

    /// 是否启用 CORS
    pub enable_cors: bool,

    /// 是否启用请求日志
    pub enable_request_logging: bool,
}

impl Default for ServerProperties {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            enable_cors: false,
            enable_request_logging: true,
        }
    }
}

impl ServerProperties {
    /// 从 Environment 加载配置
    pub fn from_environment(env: &Environment) -> Self {
        let port = env.get_i64_or(SERVER_PORT, DEFAULT_PORT as i64);
        let port = u16::try_from(port).unwrap_or_else(|_| {
            tracing::warn!(port, "Invalid server port, falling back to {}", DEFAULT_PORT);
            DEFAULT_PORT
        });

        Self {
            host: env.get_string_or(SERVER_HOST, DEFAULT_HOST),
            port,
            request_timeout: env
                .get_i64_or(SERVER_REQUEST_TIMEOUT, DEFAULT_REQUEST_TIMEOUT_SECS as i64)
                .max(1) as u64,
            enable_cors: env.get_bool_or(SERVER_ENABLE_CORS, false),
            enable_request_logging: env.get_bool_or(SERVER_ENABLE_REQUEST_LOGGING, true),
        }
    }

    /// 获取服务器地址
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Web 服务器
pub struct WebServer {
    config: ServerProperties,
    router: Router,
}

impl WebServer {
    pub fn new(config: ServerProperties, router: Router) -> Self {
        Self { config, router }
    }

    /// 应用外层中间件后的路由
    pub fn app(&self) -> Router {
        let mut app = self
            .router
            .clone()
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.request_timeout)));

        if self.config.enable_cors {
            app = app.layer(CorsLayer::permissive());
        }

        if self.config.enable_request_logging {
            app = app.layer(from_fn(request_logging));
        }

        app
    }

    /// 启动服务器，收到 Ctrl+C 后优雅退出
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.address();
        let app = self.app();

        tracing::info!("Starting web server on {}", addr);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!("Server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvc_core::{ConfigValue, MapPropertySource};

    #[test]
    fn test_defaults() {
        let props = ServerProperties::default();
        assert_eq!(props.address(), "0.0.0.0:8080");
        assert_eq!(props.request_timeout, 30);
        assert!(!props.enable_cors);
        assert!(props.enable_request_logging);
    }

    #[test]
    fn test_from_environment() {
        let env = Environment::new().with_property_source(
            MapPropertySource::new("test")
                .with_property(SERVER_HOST, ConfigValue::String("127.0.0.1".to_string()))
                .with_property(SERVER_PORT, ConfigValue::Int(9090))
                .with_property(SERVER_ENABLE_CORS, ConfigValue::Bool(true)),
        );

        let props = ServerProperties::from_environment(&env);
        assert_eq!(props.address(), "127.0.0.1:9090");
        assert!(props.enable_cors);
        assert!(props.enable_request_logging);
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let env = Environment::new()
            .with_property_source(MapPropertySource::new("test").with_property(SERVER_PORT, ConfigValue::Int(70000)));

        assert_eq!(ServerProperties::from_environment(&env).port, DEFAULT_PORT);
    }
}

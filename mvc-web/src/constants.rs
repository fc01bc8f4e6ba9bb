//! 框架配置常量定义
//!
//! 定义所有框架使用的配置键名称

// ==================== Server 配置 ====================

/// 服务器监听地址
pub const SERVER_HOST: &str = "server.host";

/// 服务器监听端口
pub const SERVER_PORT: &str = "server.port";

/// 请求超时时间（秒）
pub const SERVER_REQUEST_TIMEOUT: &str = "server.request-timeout";

/// 是否启用 CORS
pub const SERVER_ENABLE_CORS: &str = "server.enable-cors";

/// 是否启用请求日志
pub const SERVER_ENABLE_REQUEST_LOGGING: &str = "server.enable-request-logging";

// ==================== 模板引擎配置 ====================

/// Tera 模板 glob 模式
pub const TEMPLATE_PATTERN: &str = "mvc.template.pattern";

/// 模板文件后缀，视图名拼接后缀后查找模板
pub const TEMPLATE_SUFFIX: &str = "mvc.template.suffix";

// ==================== 默认值 ====================

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_TEMPLATE_PATTERN: &str = "templates/**/*.html";

pub const DEFAULT_TEMPLATE_SUFFIX: &str = ".html";

/// 请求路径为空时使用的默认视图名
pub const DEFAULT_VIEW_NAME: &str = "index";

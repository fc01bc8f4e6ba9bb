use anyhow::anyhow;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Environment;
use crate::Result;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 紧凑格式（默认）
    Compact,
    /// 完整格式（带时间、级别、目标）
    Full,
    /// JSON 格式
    Json,
    /// 美化格式（适合开发）
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别（默认：Info）
    pub level: LogLevel,

    /// 日志格式（默认：Compact）
    pub format: LogFormat,

    /// 是否显示目标（模块路径）（默认：false）
    pub show_target: bool,

    /// 自定义过滤器（可选）
    /// 例如："mvc_web=debug,tower_http=warn"
    pub filter: Option<String>,

    /// 读取配置时遇到的无效值，日志系统初始化后输出
    warnings: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            show_target: false,
            filter: None,
            warnings: Vec::new(),
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// 从 Environment 读取配置，无法识别的值回退到默认值
    ///
    /// 读取的键：`logging.level`、`logging.format`、`logging.show-target`、`logging.filter`
    pub fn from_environment(env: &Environment) -> Self {
        let mut config = Self::default();

        if let Some(level) = env.get_string("logging.level") {
            match level.parse() {
                Ok(level) => config.level = level,
                Err(e) => config.warnings.push(format!("{}, falling back to {}", e, config.level)),
            }
        }

        if let Some(format) = env.get_string("logging.format") {
            match format.parse() {
                Ok(format) => config.format = format,
                Err(e) => config.warnings.push(format!("{}, falling back to {}", e, config.format)),
            }
        }

        config.show_target = env.get_bool_or("logging.show-target", config.show_target);
        config.filter = env.get_string("logging.filter");

        config
    }

    /// 无效配置值的说明
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn env_filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.level.to_string());
        match &self.filter {
            Some(filter) => EnvFilter::try_new(filter).unwrap_or_else(|_| fallback()),
            // 优先使用 RUST_LOG 环境变量，否则使用配置的级别
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
        }
    }

    /// 初始化日志系统
    pub fn init(self) -> Result<()> {
        let env_filter = self.env_filter();

        let result = match self.format {
            LogFormat::Compact => fmt()
                .with_env_filter(env_filter)
                .compact()
                .with_target(self.show_target)
                .try_init(),
            LogFormat::Full => fmt()
                .with_env_filter(env_filter)
                .with_target(self.show_target)
                .try_init(),
            LogFormat::Json => fmt()
                .with_env_filter(env_filter)
                .json()
                .with_target(self.show_target)
                .try_init(),
            LogFormat::Pretty => fmt()
                .with_env_filter(env_filter)
                .pretty()
                .with_target(self.show_target)
                .try_init(),
        };

        result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
        Ok(())
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Full => write!(f, "full"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

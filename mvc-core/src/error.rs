/// 统一的错误处理类型
///
/// 启动与配置阶段使用 anyhow::Result，通过 .context() 方法添加错误上下文信息。
///
/// # 示例
///
/// ```rust,ignore
/// use anyhow::Context;
///
/// let source = TomlPropertySource::from_file("application.toml")
///     .context("Failed to load application.toml")?;
/// ```
pub use anyhow::Result;

use thiserror::Error;

/// 配置源加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML from {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },
}

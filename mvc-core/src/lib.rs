// mvc-core: 配置与日志基础设施
//
// - Environment：多配置源（TOML 文件、环境变量、内存）按优先级合并
// - LoggingConfig：基于 tracing-subscriber 的日志初始化

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use error::{ConfigError, Result};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::config::{
        ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
        TomlPropertySource,
    };
    pub use crate::error::Result;
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use anyhow::{anyhow, Context};
}

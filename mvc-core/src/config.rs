use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// 配置值类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 转换为整数，字符串形式的数字也可以（环境变量都是字符串）
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// 配置源 trait
pub trait PropertySource: Send + Sync {
    /// 获取配置源名称
    fn name(&self) -> &str;

    /// 获取配置值
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// 配置源优先级（数字越大优先级越高）
    fn priority(&self) -> i32 {
        0
    }
}

/// Environment - 配置管理器
///
/// 按优先级依次查询所有配置源，第一个命中的值生效
pub struct Environment {
    sources: RwLock<Vec<Box<dyn PropertySource>>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources = self.sources.read();
        f.debug_struct("Environment")
            .field(
                "sources",
                &sources.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
        }
    }

    /// 添加配置源
    pub fn add_property_source(&self, source: Box<dyn PropertySource>) {
        let mut sources = self.sources.write();
        tracing::debug!(source = source.name(), priority = source.priority(), "Property source added");
        sources.push(source);
        // 按优先级降序排序
        sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// 链式添加配置源
    pub fn with_property_source(self, source: impl PropertySource + 'static) -> Self {
        self.add_property_source(Box::new(source));
        self
    }

    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        let sources = self.sources.read();
        for source in sources.iter() {
            if let Some(value) = source.get(key) {
                tracing::trace!("Config '{}' found in source '{}'", key, source.name());
                return Some(value);
            }
        }
        None
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(String::from))
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// ========== Property Sources ==========

/// 环境变量配置源
pub struct EnvironmentPropertySource {
    prefix: String,
    priority: i32,
}

impl EnvironmentPropertySource {
    /// * `prefix` - 环境变量前缀，例如 "DEMO_"
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            priority: 100, // 环境变量优先级较高
        }
    }

    /// 将配置键转换为环境变量名
    /// 例如: server.request-timeout -> DEMO_SERVER_REQUEST_TIMEOUT
    fn key_to_env(&self, key: &str) -> String {
        format!(
            "{}{}",
            self.prefix,
            key.replace(['.', '-'], "_").to_uppercase()
        )
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        std::env::var(self.key_to_env(key))
            .ok()
            .map(ConfigValue::String)
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// TOML 文件配置源
pub struct TomlPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl TomlPropertySource {
    /// 从文件加载 TOML 配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::parse(&content, path.to_string_lossy().to_string())
    }

    /// 从字符串解析 TOML 配置
    pub fn parse(content: &str, name: String) -> Result<Self, ConfigError> {
        let value: toml::Value = toml::from_str(content).map_err(|source| ConfigError::Parse {
            name: name.clone(),
            source,
        })?;

        let mut properties = HashMap::new();
        Self::flatten_toml(&value, String::new(), &mut properties);

        Ok(Self {
            name,
            properties,
            priority: 0, // 文件配置优先级最低
        })
    }

    /// 展平 TOML 结构
    /// 例如: { server: { port: 8080 } } -> { "server.port": 8080 }
    fn flatten_toml(value: &toml::Value, prefix: String, result: &mut HashMap<String, ConfigValue>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let new_prefix = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    Self::flatten_toml(val, new_prefix, result);
                }
            }
            other => {
                if let Some(config) = Self::toml_value_to_config(other) {
                    result.insert(prefix, config);
                }
            }
        }
    }

    fn toml_value_to_config(value: &toml::Value) -> Option<ConfigValue> {
        let config = match value {
            toml::Value::String(s) => ConfigValue::String(s.clone()),
            toml::Value::Integer(i) => ConfigValue::Int(*i),
            toml::Value::Float(f) => ConfigValue::Float(*f),
            toml::Value::Boolean(b) => ConfigValue::Bool(*b),
            toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
            toml::Value::Array(arr) => {
                ConfigValue::Array(arr.iter().filter_map(Self::toml_value_to_config).collect())
            }
            // 数组中的表没有扁平化键，直接忽略
            toml::Value::Table(_) => return None,
        };
        Some(config)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for TomlPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 内存配置源（用于测试或运行时配置）
pub struct MapPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            priority: 50,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[server]
host = "127.0.0.1"
port = 9090
enable-cors = false

[logging]
level = "debug"
targets = ["a", "b"]
"#;

    #[test]
    fn test_toml_is_flattened() {
        let source = TomlPropertySource::parse(SAMPLE, "sample".to_string()).unwrap();

        assert_eq!(
            source.get("server.host"),
            Some(ConfigValue::String("127.0.0.1".to_string()))
        );
        assert_eq!(source.get("server.port"), Some(ConfigValue::Int(9090)));
        assert_eq!(source.get("server.enable-cors"), Some(ConfigValue::Bool(false)));
        assert!(source.get("server").is_none());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = TomlPropertySource::parse("server = [", "broken".to_string());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_higher_priority_source_wins() {
        let env = Environment::new()
            .with_property_source(TomlPropertySource::parse(SAMPLE, "sample".to_string()).unwrap())
            .with_property_source(
                MapPropertySource::new("overrides")
                    .with_property("server.port", ConfigValue::String("7070".to_string())),
            );

        assert_eq!(env.get_i64("server.port"), Some(7070));
        assert_eq!(env.get_string("server.host").as_deref(), Some("127.0.0.1"));
        assert_eq!(env.get_i64_or("server.workers", 4), 4);
    }

    #[test]
    fn test_typed_getters() {
        let env = Environment::new()
            .with_property_source(TomlPropertySource::parse(SAMPLE, "sample".to_string()).unwrap())
            .with_property_source(
                MapPropertySource::new("flags")
                    .with_property("feature.on", ConfigValue::String("yes".to_string())),
            );

        assert!(env.get_bool_or("feature.on", false));
        assert!(!env.get_bool_or("server.enable-cors", true));
    }

    #[test]
    fn test_env_key_mapping() {
        let source = EnvironmentPropertySource::new("DEMO_");
        assert_eq!(source.key_to_env("server.request-timeout"), "DEMO_SERVER_REQUEST_TIMEOUT");
        assert_eq!(source.key_to_env("server.port"), "DEMO_SERVER_PORT");
    }
}

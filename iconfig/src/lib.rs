
use serde::{Deserialize, Serialize};
use toml::Value;
use std::any::Any;
use std::fmt;
use std::path::Path;
use serde::de::DeserializeOwned;
use bottle::{Container, Provider, ServiceName};

/// Configuration layers read by [`load`], lowest precedence first.
pub const DEFAULT_LAYERS: [&str; 3] = ["/etc/bottle/config.toml", "config/config.toml", "./config.toml"];

/// A flexible configuration container that can hold any valid TOML data
/// and supports merging configurations.
///
/// # Examples
///
/// ```
/// use iconfig::ApplicationConfig;
///
/// let mut base = ApplicationConfig::from_str(r#"
///     [server]
///     host = "localhost"
///     port = 8080
/// "#).unwrap();
///
/// let overlay = ApplicationConfig::from_str(r#"
///     [server]
///     port = 9090
///     [database]
///     url = "postgres://localhost"
/// "#).unwrap();
///
/// base.merge(overlay);
///
/// assert_eq!(base.get("server.host").unwrap().as_str(), Some("localhost"));
/// assert_eq!(base.get("server.port").unwrap().as_integer(), Some(9090));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(flatten)]
    value: Value,
}

impl fmt::Display for ApplicationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self { value: Value::Table(toml::Table::new()) }
    }
}

impl ApplicationConfig {
    /// Parse a config from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, anyhow::Error> {
        let value = toml::from_str(s)?;
        Ok(Self { value })
    }

    /// Read a config from a TOML file
    pub fn from_file<P: AsRef<Path>>(fname: P) -> Result<Self, anyhow::Error> {
        let path = fname.as_ref();
        if !path.exists() {
            return Err(anyhow::anyhow!("File {} does not exist", path.display()));
        }
        let config = std::fs::read_to_string(path)?;
        Self::from_str(&config)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
    }

    /// Merge another config into this one
    ///
    /// This performs a deep merge where:
    /// - Tables are merged recursively
    /// - Arrays are concatenated
    /// - Other values are overwritten by the new config
    pub fn merge(&mut self, other: Self) {
        self.value = merge_values(&self.value, &other.value);
    }

    /// Get a reference to the underlying TOML value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Get a value by dotted path (e.g., "server.port")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.value;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Convert the config to a TOML string
    pub fn to_string_pretty(&self) -> String {
        self.value.to_string()
    }

    /// Deserialize the whole config
    pub fn resolve<T: DeserializeOwned>(&self) -> Result<T, anyhow::Error> {
        self.value
            .clone()
            .try_into()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))
    }

    /// Deserialize the section found at `prefix`; an empty prefix means the whole config
    pub fn resolve_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<T, anyhow::Error> {
        if prefix.is_empty() {
            return self.resolve::<T>();
        }

        let part = self
            .get(prefix)
            .ok_or_else(|| anyhow::anyhow!("No config found for {}", prefix))?;
        part.clone()
            .try_into()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize {}: {}", prefix, e))
    }
}

fn merge_values(a: &Value, b: &Value) -> Value {
    match (a, b) {
        // If both are tables, merge them recursively
        (Value::Table(a_map), Value::Table(b_map)) => {
            let mut result = a_map.clone();
            for (k, v) in b_map {
                let merged = match result.get(k) {
                    Some(existing) => merge_values(existing, v),
                    None => v.clone(),
                };
                result.insert(k.clone(), merged);
            }
            Value::Table(result)
        }
        // If both are arrays, concatenate them
        (Value::Array(a_vec), Value::Array(b_vec)) => {
            let mut result = a_vec.clone();
            result.extend(b_vec.iter().cloned());
            Value::Array(result)
        }
        // In all other cases, use the value from b
        _ => b.clone(),
    }
}

/// Load the default layers.
pub fn load() -> Result<ApplicationConfig, anyhow::Error> {
    load_from(DEFAULT_LAYERS)
}

/// Merge every existing file of `layers` in order; later files override
/// earlier ones. Missing files are skipped, but at least one must exist.
pub fn load_from<I>(layers: I) -> Result<ApplicationConfig, anyhow::Error>
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut config: Option<ApplicationConfig> = None;
    for layer in layers {
        let path = layer.as_ref();
        if !path.exists() {
            continue;
        }
        let overlay = ApplicationConfig::from_file(path)?;
        config = Some(match config.take() {
            Some(mut base) => {
                base.merge(overlay);
                base
            }
            None => overlay,
        });
    }
    config.ok_or_else(|| anyhow::anyhow!("No config file found"))
}

/// Provides `config` as an [`ApplicationConfig`] service.
pub fn provider(config: ApplicationConfig) -> Provider {
    Provider::value(config)
}

/// Provides the section `prefix` of the [`ApplicationConfig`] registered as
/// `config`, deserialized into `T`.
///
/// The section is built from the config service, so evicting the config
/// evicts every section read from it.
pub fn section<T>(config: impl Into<ServiceName>, prefix: &str) -> Provider
where
    T: DeserializeOwned + Any + Send + Sync,
{
    let config = config.into();
    let prefix = prefix.to_string();
    Provider::new(move |container: &dyn Container| {
        let app = container.get::<ApplicationConfig>(&config)?;
        app.resolve_prefix::<T>(&prefix)
    })
}

//! # PMOCatalog Configuration Module
//!
//! This module provides configuration management for the catalog workspace:
//! - Loading configuration from YAML files
//! - Merging with the embedded default configuration
//! - Environment variable overrides
//! - Typed getters and setters, plus serde-based access for structured sections
//! - Thread-safe singleton access pattern
//!
//! Crates that need their own settings extend [`Config`] with an extension
//! trait (see `pmoconnect::ServerConfigExt` or `pmojellyfin::JellyfinConfigExt`).
//!
//! ## Usage
//!
//! ```no_run
//! use pmoconfig::get_config;
//!
//! let config = get_config();
//! let level = config.get_log_min_level()?;
//! config.set_log_enable_console(false)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde::{de::DeserializeOwned, Serialize};
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::info;

const DEFAULT_CONFIG: &str = include_str!("default_config.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load PMOCatalog configuration"));
}

const ENV_CONFIG_DIR: &str = "PMOCATALOG_CONFIG";
const ENV_PREFIX: &str = "PMOCATALOG_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmocatalog";

const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Generates a getter/setter pair for a `bool` value with a default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Configuration manager
///
/// Holds the merged YAML tree of the embedded defaults, the on-disk
/// `config.yaml` and the `PMOCATALOG_CONFIG__*` environment overrides.
/// Every setter writes the whole tree back to disk.
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.lock_data().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    fn lock_data(&self) -> MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        if !directory.is_empty() {
            return directory.to_string();
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOCATALOG_CONFIG` environment variable
    /// 3. `.pmocatalog` in the current directory
    /// 4. `.pmocatalog` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for read/write permissions.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Directory holding `config.yaml`
    pub fn directory(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let yaml = {
            let data = self.lock_data();
            serde_yaml::to_string(&*data)?
        };
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["application", "skip_ssl_verify"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock_data();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock_data();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                if let Some(next) = map.get(&Value::String(key.to_lowercase())) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Deserializes the subtree at `path`, `None` when the path is absent
    pub fn get_typed<T: DeserializeOwned>(&self, path: &[&str]) -> Result<Option<T>> {
        match self.get_value(path) {
            Ok(Value::Null) | Err(_) => Ok(None),
            Ok(value) => Ok(Some(serde_yaml::from_value(value)?)),
        }
    }

    /// Serializes `value` into the subtree at `path` and saves
    pub fn set_typed<T: Serialize>(&self, path: &[&str], value: &T) -> Result<()> {
        let value = Self::lower_keys_value(serde_yaml::to_value(value)?);
        self.set_value(path, value)
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let new_key = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(new_key, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    /// Minimum log level, as an `EnvFilter` directive
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"]) {
            Ok(Value::String(s)) => Ok(s),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }
}

/// Returns the global configuration instance
///
/// The instance is lazily loaded on first access.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Converts an integer into a YAML number, for callers building raw values
pub fn yaml_number(value: u64) -> Value {
    Value::Number(Number::from(value))
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_defaults_are_loaded() {
        let (_dir, config) = temp_config();
        assert!(config.get_log_enable_console().unwrap());
        assert_eq!(
            config.get_value(&["jellyfin", "page_size"]).unwrap(),
            yaml_number(100)
        );
    }

    #[test]
    fn test_set_value_is_persisted() {
        let (dir, config) = temp_config();
        config
            .set_value(&["application", "skip_ssl_verify"], Value::Bool(true))
            .unwrap();

        let reloaded = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(
            reloaded
                .get_value(&["application", "skip_ssl_verify"])
                .unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let (_dir, config) = temp_config();
        config.set_log_min_level("DEBUG".to_string()).unwrap();
        assert_eq!(
            config.get_value(&["HOST", "Logger", "MIN_LEVEL"]).unwrap(),
            Value::String("DEBUG".to_string())
        );
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let (_dir, config) = temp_config();
        assert!(config.get_value(&["nope", "missing"]).is_err());
    }

    #[test]
    fn test_typed_roundtrip() {
        let (_dir, config) = temp_config();
        let hosts = vec!["a.example".to_string(), "b.example".to_string()];
        config.set_typed(&["custom", "hosts"], &hosts).unwrap();

        let back: Option<Vec<String>> = config.get_typed(&["custom", "hosts"]).unwrap();
        assert_eq!(back, Some(hosts));
        let absent: Option<Vec<String>> = config.get_typed(&["custom", "other"]).unwrap();
        assert!(absent.is_none());
    }

    #[test]
    fn test_merge_yaml_replaces_scalars_and_keeps_defaults() {
        let mut default: Value = serde_yaml::from_str("a: 1\nb:\n  c: 2\n  d: 3").unwrap();
        let external: Value = serde_yaml::from_str("b:\n  c: 5").unwrap();
        merge_yaml(&mut default, &external);
        let expected: Value = serde_yaml::from_str("a: 1\nb:\n  c: 5\n  d: 3").unwrap();
        assert_eq!(default, expected);
    }
}

//! Extension de pmoconfig pour les paramètres du client Jellyfin
//!
//! ```rust,ignore
//! use pmoconfig::get_config;
//! use pmojellyfin::JellyfinConfigExt;
//!
//! let config = get_config();
//! let device_id = config.get_jellyfin_device_id()?;
//! ```

use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::Value;
use uuid::Uuid;

const DEFAULT_CLIENT_NAME: &str = "PMOCatalog";
const DEFAULT_PAGE_SIZE: usize = 100;

/// Trait d'extension pour les paramètres Jellyfin de `pmoconfig::Config`
pub trait JellyfinConfigExt {
    /// Identifiant d'appareil envoyé dans l'en-tête d'autorisation
    ///
    /// Jellyfin suit les sessions par appareil : l'identifiant est généré
    /// une fois puis persisté.
    fn get_jellyfin_device_id(&self) -> Result<String>;

    /// Nom de client envoyé dans l'en-tête d'autorisation
    fn get_jellyfin_client_name(&self) -> Result<String>;

    fn set_jellyfin_client_name(&self, name: &str) -> Result<()>;

    /// Nombre d'éléments demandés par page
    fn get_jellyfin_page_size(&self) -> Result<usize>;

    fn set_jellyfin_page_size(&self, size: usize) -> Result<()>;
}

impl JellyfinConfigExt for Config {
    fn get_jellyfin_device_id(&self) -> Result<String> {
        let path = &["jellyfin", "device_id"];
        match self.get_value(path) {
            Ok(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
            _ => {
                let id = Uuid::new_v4().to_string();
                self.set_value(path, Value::String(id.clone()))?;
                Ok(id)
            }
        }
    }

    fn get_jellyfin_client_name(&self) -> Result<String> {
        match self.get_value(&["jellyfin", "client_name"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Ok(DEFAULT_CLIENT_NAME.to_string()),
        }
    }

    fn set_jellyfin_client_name(&self, name: &str) -> Result<()> {
        self.set_value(&["jellyfin", "client_name"], Value::String(name.to_string()))
    }

    fn get_jellyfin_page_size(&self) -> Result<usize> {
        match self.get_value(&["jellyfin", "page_size"]) {
            Ok(Value::Number(n)) => Ok(n
                .as_u64()
                .filter(|n| *n > 0)
                .map_or(DEFAULT_PAGE_SIZE, |n| n as usize)),
            _ => Ok(DEFAULT_PAGE_SIZE),
        }
    }

    fn set_jellyfin_page_size(&self, size: usize) -> Result<()> {
        self.set_value(&["jellyfin", "page_size"], pmoconfig::yaml_number(size as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_is_generated_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();

        let id = config.get_jellyfin_device_id().unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(config.get_jellyfin_device_id().unwrap(), id);

        let reloaded = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(reloaded.get_jellyfin_device_id().unwrap(), id);
    }

    #[test]
    fn test_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(config.get_jellyfin_page_size().unwrap(), 100);
        config.set_jellyfin_page_size(25).unwrap();
        assert_eq!(config.get_jellyfin_page_size().unwrap(), 25);
        config.set_jellyfin_page_size(0).unwrap();
        assert_eq!(config.get_jellyfin_page_size().unwrap(), 100);
        assert_eq!(config.get_jellyfin_client_name().unwrap(), "PMOCatalog");
    }
}

//! Extension de pmoconfig pour la liste des serveurs et l'arbitrage
//!
//! ```rust,ignore
//! use pmoconfig::get_config;
//! use pmoconnect::ServerConfigExt;
//!
//! let config = get_config();
//! for server in config.get_servers()? {
//!     println!("{} ({})", server.nickname, server.connection.hostname);
//! }
//! ```

use crate::arbitrator::ArbitrationTimings;
use crate::server::ServerConfig;
use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::Value;
use std::time::Duration;

/// Trait d'extension donnant à `pmoconfig::Config` l'accès aux réglages de connexion
pub trait ServerConfigExt {
    /// Serveurs configurés, dans l'ordre d'insertion
    fn get_servers(&self) -> Result<Vec<ServerConfig>>;

    /// Remplace toute la liste des serveurs et sauvegarde la configuration
    fn set_servers(&self, servers: &[ServerConfig]) -> Result<()>;

    /// Ignorer les erreurs de certificat TLS (serveurs domestiques auto-signés)
    fn get_skip_ssl_verify(&self) -> Result<bool>;

    fn set_skip_ssl_verify(&self, skip: bool) -> Result<()>;

    /// Décalage et échéance de la course entre hostnames principal et alternatif
    ///
    /// Les valeurs absentes ou invalides retombent sur 333 ms et 5 s.
    fn get_arbitration_timings(&self) -> Result<ArbitrationTimings>;
}

impl ServerConfigExt for Config {
    fn get_servers(&self) -> Result<Vec<ServerConfig>> {
        Ok(self
            .get_typed::<Vec<ServerConfig>>(&["servers"])?
            .unwrap_or_default())
    }

    fn set_servers(&self, servers: &[ServerConfig]) -> Result<()> {
        self.set_typed(&["servers"], &servers)
    }

    fn get_skip_ssl_verify(&self) -> Result<bool> {
        match self.get_value(&["application", "skip_ssl_verify"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => Ok(false),
        }
    }

    fn set_skip_ssl_verify(&self, skip: bool) -> Result<()> {
        self.set_value(&["application", "skip_ssl_verify"], Value::Bool(skip))
    }

    fn get_arbitration_timings(&self) -> Result<ArbitrationTimings> {
        let millis = |key: &str| match self.get_value(&["application", "arbitration", key]) {
            Ok(Value::Number(n)) => n.as_u64().map(Duration::from_millis),
            _ => None,
        };

        let defaults = ArbitrationTimings::default();
        Ok(ArbitrationTimings {
            stagger: millis("stagger_ms").unwrap_or(defaults.stagger),
            deadline: millis("deadline_ms")
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.deadline),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::ServerConnection;

    fn temp_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_defaults() {
        let (_dir, config) = temp_config();
        assert!(config.get_servers().unwrap().is_empty());
        assert!(!config.get_skip_ssl_verify().unwrap());
        assert_eq!(
            config.get_arbitration_timings().unwrap(),
            ArbitrationTimings::default()
        );
    }

    #[test]
    fn test_servers_are_persisted() {
        let (dir, config) = temp_config();
        let mut connection = ServerConnection::new("http://192.168.1.10:8096", "alice");
        connection.alt_hostname = Some("https://music.example.org".into());
        let server = ServerConfig::new("Home", connection);
        config.set_servers(std::slice::from_ref(&server)).unwrap();

        let reloaded = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(reloaded.get_servers().unwrap(), vec![server]);
    }

    #[test]
    fn test_arbitration_timings_override() {
        let (_dir, config) = temp_config();
        config
            .set_value(
                &["application", "arbitration", "stagger_ms"],
                pmoconfig::yaml_number(100),
            )
            .unwrap();
        config
            .set_value(
                &["application", "arbitration", "deadline_ms"],
                pmoconfig::yaml_number(0),
            )
            .unwrap();

        let timings = config.get_arbitration_timings().unwrap();
        assert_eq!(timings.stagger, Duration::from_millis(100));
        assert_eq!(timings.deadline, ArbitrationTimings::default().deadline);
    }
}

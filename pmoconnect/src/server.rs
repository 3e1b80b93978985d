//! Entrées de serveurs persistées

use crate::arbitrator::ConnectionDescriptor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Protocole parlé par un serveur
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerType {
    #[default]
    Jellyfin,
    Subsonic,
}

/// Hostnames et compte d'un serveur, tels que stockés dans la configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConnection {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_hostname: Option<String>,
    pub username: String,
    /// Les entrées sans type sont des serveurs Jellyfin
    #[serde(default)]
    pub server_type: ServerType,
}

impl ServerConnection {
    pub fn new(hostname: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            alt_hostname: None,
            username: username.into(),
            server_type: ServerType::default(),
        }
    }

    pub fn with_server_type(mut self, server_type: ServerType) -> Self {
        self.server_type = server_type;
        self
    }

    /// Descripteur pour un arbitrage ; `insecure_transport` vient des
    /// réglages de l'application, pas de l'entrée du serveur
    pub fn descriptor(&self, insecure_transport: bool) -> ConnectionDescriptor {
        ConnectionDescriptor {
            hostname: self.hostname.clone(),
            alt_hostname: self.alt_hostname.clone(),
            username: self.username.clone(),
            server_type: self.server_type,
            insecure_transport,
        }
    }
}

/// Un serveur configuré
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub id: Uuid,
    pub nickname: String,
    pub connection: ServerConnection,
    /// Serveur auquel se connecter au démarrage
    #[serde(default)]
    pub default: bool,
}

impl ServerConfig {
    pub fn new(nickname: impl Into<String>, connection: ServerConnection) -> Self {
        Self {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            connection,
            default: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_type_defaults_to_jellyfin() {
        let conn: ServerConnection =
            serde_yaml::from_str("hostname: http://nas:8096\nusername: alice\n").unwrap();
        assert_eq!(conn.server_type, ServerType::Jellyfin);

        let conn: ServerConnection = serde_yaml::from_str(
            "hostname: http://nas:4533\nusername: alice\nserver_type: Subsonic\n",
        )
        .unwrap();
        assert_eq!(conn.server_type, ServerType::Subsonic);
    }

    #[test]
    fn test_descriptor_carries_server_type() {
        let conn = ServerConnection::new("http://nas:4533", "alice")
            .with_server_type(ServerType::Subsonic);
        let descriptor = conn.descriptor(true);
        assert_eq!(descriptor.server_type, ServerType::Subsonic);
        assert!(descriptor.insecure_transport);
        assert_eq!(descriptor.alternate(), None);
    }
}

//! Types d'erreurs de l'arbitrage et de la gestion de session

use thiserror::Error;
use uuid::Uuid;

/// Type Result pour les opérations de connexion
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Erreurs de résolution et de gestion d'une session serveur
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Aucun hôte n'a répondu (succès ou refus) avant l'échéance
    #[error("Server is unreachable: {0}")]
    Unreachable(String),

    /// Un hôte a été joint mais a refusé les identifiants
    #[error("Authentication rejected by {hostname}: {message}")]
    AuthRejected { hostname: String, message: String },

    /// Le client d'un hostname n'a pas pu être créé
    #[error("Failed to create client: {0}")]
    ClientBuild(String),

    #[error("Server {0} not found in configuration")]
    ServerNotFound(Uuid),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl ConnectError {
    /// Vrai quand le serveur était joignable et a refusé l'authentification
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ConnectError::AuthRejected { .. })
    }
}

/// Issue d'une tentative d'authentification ratée, rapportée par un [`crate::ServerClient`]
#[derive(Error, Debug)]
pub enum LoginError {
    /// Le serveur a répondu en refusant les identifiants
    #[error("Login rejected: {0}")]
    Rejected(String),

    /// Le serveur n'a pas pu être joint (DNS, TLS, timeout, 5xx...)
    #[error("Network error: {0}")]
    Network(anyhow::Error),
}

impl LoginError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, LoginError::Rejected(_))
    }
}

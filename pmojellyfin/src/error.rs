//! Gestion des erreurs du client Jellyfin

use thiserror::Error;

/// Type Result pour pmojellyfin
pub type Result<T> = std::result::Result<T, JellyfinError>;

/// Erreurs rencontrées en dialoguant avec un serveur Jellyfin
#[derive(Error, Debug)]
pub enum JellyfinError {
    /// Identifiants invalides ou token expiré (HTTP 401/403)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Échec réseau (DNS, TLS, timeout, connexion refusée)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Tout autre statut d'échec
    #[error("Jellyfin API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Endpoint utilisateur appelé avant l'authentification
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl JellyfinError {
    /// Construit l'erreur correspondant à un code HTTP
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    /// Vrai quand le serveur a répondu en refusant les identifiants
    pub fn is_auth_error(&self) -> bool {
        matches!(self, JellyfinError::Unauthorized(_))
    }
}

//! Authentification via `/Users/AuthenticateByName`

use super::JellyfinApi;
use crate::error::{JellyfinError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticateRequest<'a> {
    username: &'a str,
    pw: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticateResponse {
    user: UserDto,
    access_token: String,
    #[serde(default)]
    server_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserDto {
    id: String,
    #[serde(default)]
    name: String,
}

/// Session obtenue après une authentification réussie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub token: String,
    pub user_id: String,
    pub user_name: String,
    pub server_id: Option<String>,
}

impl JellyfinApi {
    /// Authentifie l'utilisateur avec son nom et son mot de passe
    ///
    /// En cas de succès, le token d'accès est joint à toutes les requêtes suivantes.
    ///
    /// # Erreurs
    ///
    /// * `JellyfinError::Unauthorized` - identifiants refusés (HTTP 401/403)
    /// * `JellyfinError::Http` - serveur injoignable
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthInfo> {
        info!("Logging in to {} as {}", self.base_url, username);

        let request = AuthenticateRequest {
            username,
            pw: password,
        };
        let response: AuthenticateResponse =
            self.post("/Users/AuthenticateByName", &request).await?;

        let auth = AuthInfo {
            token: response.access_token,
            user_id: response.user.id,
            user_name: response.user.name,
            server_id: response.server_id,
        };
        debug!("Login successful - User ID: {}", auth.user_id);

        self.set_auth(Some(auth.clone()));
        Ok(auth)
    }

    pub fn auth_info(&self) -> Option<AuthInfo> {
        self.auth().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth().is_some()
    }

    /// Identifiant de l'utilisateur connecté, requis par les endpoints `/Users/{id}`
    pub fn user_id(&self) -> Result<String> {
        self.auth()
            .as_ref()
            .map(|auth| auth.user_id.clone())
            .ok_or(JellyfinError::NotAuthenticated)
    }

    /// Oublie le token d'accès
    pub fn logout(&self) {
        debug!("Logging out of {}", self.base_url);
        self.set_auth(None);
    }
}

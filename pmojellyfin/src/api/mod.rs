//! Accès bas-niveau à l'API REST Jellyfin
//!
//! [`JellyfinApi`] envoie les requêtes authentifiées vers un serveur. Chaque
//! requête porte l'en-tête `Authorization: MediaBrowser ...` qui identifie le
//! client et l'appareil, plus le token d'accès une fois connecté.

pub mod auth;
pub mod items;

use crate::error::{JellyfinError, Result};
use auth::AuthInfo;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{RwLock, RwLockReadGuard};
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout des requêtes quand aucun client n'est fourni
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Identité du client telle qu'annoncée au serveur
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub client_name: String,
    pub device_name: String,
    /// Stable par installation, voir `JellyfinConfigExt::get_jellyfin_device_id`
    pub device_id: String,
    pub version: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            client_name: "PMOCatalog".to_string(),
            device_name: "pmocatalog".to_string(),
            device_id: uuid::Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client bas-niveau d'un serveur Jellyfin
pub struct JellyfinApi {
    client: Client,
    base_url: String,
    device: DeviceInfo,
    auth: RwLock<Option<AuthInfo>>,
}

impl JellyfinApi {
    /// Crée un client avec son propre pool de connexions HTTP
    pub fn new(base_url: &str, device: DeviceInfo) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Self::with_client(client, base_url, device)
    }

    /// Crée un client au-dessus d'un `reqwest::Client` préconfiguré
    pub fn with_client(client: Client, base_url: &str, device: DeviceInfo) -> Result<Self> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            device,
            auth: RwLock::new(None),
        })
    }

    /// URL du serveur sans slash final
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    fn auth(&self) -> RwLockReadGuard<'_, Option<AuthInfo>> {
        self.auth.read().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn set_auth(&self, auth: Option<AuthInfo>) {
        *self.auth.write().unwrap_or_else(|e| e.into_inner()) = auth;
    }

    /// Valeur de l'en-tête `Authorization`
    pub fn authorization_header(&self) -> String {
        let mut header = format!(
            r#"MediaBrowser Client="{}", Device="{}", DeviceId="{}", Version="{}""#,
            self.device.client_name, self.device.device_name, self.device.device_id, self.device.version
        );
        if let Some(auth) = self.auth().as_ref() {
            header.push_str(&format!(r#", Token="{}""#, auth.token));
        }
        header
    }

    /// Requête GET avec paramètres de query
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} with {} params", url, params.len());

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization_header())
            .query(params)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Requête POST avec un corps JSON
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.authorization_header())
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("API error ({}): {}", status.as_u16(), error_text);
            return Err(JellyfinError::from_status_code(status.as_u16(), error_text));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            JellyfinError::JsonParse(e)
        })
    }
}

/// Valide une URL `http(s)` de serveur et retire le slash final
fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| JellyfinError::InvalidUrl(format!("{trimmed}: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(trimmed.to_string()),
        _ => Err(JellyfinError::InvalidUrl(format!(
            "{trimmed}: expected an http(s) URL"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> DeviceInfo {
        DeviceInfo {
            client_name: "Test".into(),
            device_name: "box".into(),
            device_id: "dev-1".into(),
            version: "1.0".into(),
        }
    }

    #[test]
    fn test_base_url_normalization() {
        let api = JellyfinApi::new("http://192.168.1.10:8096/", device()).unwrap();
        assert_eq!(api.base_url(), "http://192.168.1.10:8096");

        let api = JellyfinApi::new(" https://music.example.org/jellyfin ", device()).unwrap();
        assert_eq!(api.base_url(), "https://music.example.org/jellyfin");
    }

    #[test]
    fn test_invalid_urls() {
        for url in ["", "music.example.org", "ftp://music.example.org"] {
            assert!(matches!(
                JellyfinApi::new(url, device()),
                Err(JellyfinError::InvalidUrl(_))
            ));
        }
    }

    #[test]
    fn test_authorization_header() {
        let api = JellyfinApi::new("http://localhost:8096", device()).unwrap();
        assert_eq!(
            api.authorization_header(),
            r#"MediaBrowser Client="Test", Device="box", DeviceId="dev-1", Version="1.0""#
        );

        api.set_auth(Some(AuthInfo {
            token: "abc".into(),
            user_id: "u1".into(),
            user_name: "alice".into(),
            server_id: None,
        }));
        assert!(api.authorization_header().ends_with(r#", Token="abc""#));
    }
}

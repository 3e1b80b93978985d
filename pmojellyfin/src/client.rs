//! Backend Jellyfin pour `pmoconnect`
//!
//! [`JellyfinClientFactory`] construit un [`JellyfinServer`] par hostname
//! candidat ; le serveur qui remporte l'arbitrage est à la fois le client
//! authentifié et le catalogue à parcourir.

use crate::api::{DeviceInfo, JellyfinApi, DEFAULT_TIMEOUT};
use crate::config_ext::JellyfinConfigExt;
use crate::provider::JellyfinProvider;
use async_trait::async_trait;
use pmocatalog::{
    Album, Artist, BoxedIterator, CatalogFilter, CatalogProvider, CoverPrefetchFn,
    ProviderCapabilities, Track,
};
use pmoconfig::Config;
use pmoconnect::{
    ClientFactory, ConnectError, ConnectionDescriptor, LoginError, ServerClient, ServerType,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Serveur Jellyfin joint par un hostname
pub struct JellyfinServer {
    hostname: String,
    api: Arc<JellyfinApi>,
    provider: JellyfinProvider,
}

impl JellyfinServer {
    pub fn new(hostname: impl Into<String>, api: JellyfinApi, page_size: usize) -> Self {
        let api = Arc::new(api);
        Self {
            hostname: hostname.into(),
            provider: JellyfinProvider::new(api.clone(), page_size),
            api,
        }
    }

    pub fn api(&self) -> &Arc<JellyfinApi> {
        &self.api
    }

    pub fn provider(&self) -> &JellyfinProvider {
        &self.provider
    }
}

#[async_trait]
impl ServerClient for JellyfinServer {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn login(&self, username: &str, credential: &str) -> Result<(), LoginError> {
        match self.api.login(username, credential).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_auth_error() => Err(LoginError::Rejected(e.to_string())),
            Err(e) => Err(LoginError::Network(e.into())),
        }
    }
}

impl CatalogProvider for JellyfinServer {
    fn capabilities(&self) -> ProviderCapabilities {
        self.provider.capabilities()
    }

    fn album_sort_orders(&self) -> Vec<&'static str> {
        self.provider.album_sort_orders()
    }

    fn artist_sort_orders(&self) -> Vec<&'static str> {
        self.provider.artist_sort_orders()
    }

    fn iterate_albums(&self, sort_order: &str, filter: &CatalogFilter) -> BoxedIterator<Album> {
        self.provider.iterate_albums(sort_order, filter)
    }

    fn search_albums(&self, query: &str, filter: &CatalogFilter) -> BoxedIterator<Album> {
        self.provider.search_albums(query, filter)
    }

    fn iterate_tracks(&self, query: &str) -> BoxedIterator<Track> {
        self.provider.iterate_tracks(query)
    }

    fn iterate_artists(&self, sort_order: &str) -> BoxedIterator<Artist> {
        self.provider.iterate_artists(sort_order)
    }

    fn set_prefetch_cover_callback(&self, callback: Option<CoverPrefetchFn>) {
        self.provider.set_prefetch_cover_callback(callback)
    }
}

/// Construit les clients [`JellyfinServer`] pour l'arbitre de connexion
#[derive(Debug, Clone)]
pub struct JellyfinClientFactory {
    device: DeviceInfo,
    page_size: usize,
    timeout: Duration,
}

impl Default for JellyfinClientFactory {
    fn default() -> Self {
        Self {
            device: DeviceInfo::default(),
            page_size: pmocatalog::DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl JellyfinClientFactory {
    pub fn new(device: DeviceInfo, page_size: usize) -> Self {
        Self {
            device,
            page_size,
            ..Default::default()
        }
    }

    /// Factory utilisant le nom de client, l'identifiant d'appareil et la taille de page de `config`
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let device = DeviceInfo {
            client_name: config.get_jellyfin_client_name()?,
            device_id: config.get_jellyfin_device_id()?,
            ..Default::default()
        };
        Ok(Self::new(device, config.get_jellyfin_page_size()?))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }
}

impl ClientFactory for JellyfinClientFactory {
    type Client = JellyfinServer;

    fn build(
        &self,
        hostname: &str,
        descriptor: &ConnectionDescriptor,
    ) -> pmoconnect::Result<JellyfinServer> {
        if descriptor.server_type != ServerType::Jellyfin {
            return Err(ConnectError::ClientBuild(format!(
                "{:?} servers are not handled by the Jellyfin backend",
                descriptor.server_type
            )));
        }
        debug!(
            hostname,
            insecure = descriptor.insecure_transport,
            "Creating Jellyfin client"
        );
        let client = Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(descriptor.insecure_transport)
            .build()
            .map_err(|e| ConnectError::ClientBuild(e.to_string()))?;
        let api = JellyfinApi::with_client(client, hostname, self.device.clone())
            .map_err(|e| ConnectError::ClientBuild(e.to_string()))?;
        Ok(JellyfinServer::new(hostname, api, self.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_rejects_invalid_hostname() {
        let factory = JellyfinClientFactory::default();
        let descriptor = ConnectionDescriptor::new("not a url", "alice");
        assert!(matches!(
            factory.build("not a url", &descriptor),
            Err(ConnectError::ClientBuild(_))
        ));
    }

    #[test]
    fn test_factory_rejects_other_server_types() {
        let factory = JellyfinClientFactory::default();
        let descriptor = ConnectionDescriptor::new("http://nas.local:4533", "alice")
            .with_server_type(ServerType::Subsonic);
        assert!(matches!(
            factory.build("http://nas.local:4533", &descriptor),
            Err(ConnectError::ClientBuild(_))
        ));
    }

    #[test]
    fn test_factory_keeps_configured_hostname() {
        let factory = JellyfinClientFactory::default();
        let descriptor = ConnectionDescriptor::new("http://nas.local:8096/", "alice").insecure(true);
        let server = factory.build("http://nas.local:8096/", &descriptor).unwrap();
        assert_eq!(server.hostname(), "http://nas.local:8096/");
        assert_eq!(server.api().base_url(), "http://nas.local:8096");
    }

    #[test]
    fn test_factory_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        config.set_jellyfin_page_size(40).unwrap();

        let factory = JellyfinClientFactory::from_config(&config).unwrap();
        assert_eq!(factory.page_size, 40);
        assert_eq!(factory.device().device_id, config.get_jellyfin_device_id().unwrap());
    }
}

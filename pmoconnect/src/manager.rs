//! Gestion de la liste des serveurs et de la session active
//!
//! [`ServerManager`] détient la connexion au serveur parcouru. Il conserve la
//! liste des serveurs dans [`pmoconfig`], résout les connexions via un
//! [`ConnectionArbitrator`] et notifie les listeners à la connexion et à la
//! déconnexion.

use crate::arbitrator::{ArbitrationTimings, ClientFactory, ConnectionArbitrator, Session};
use crate::config_ext::ServerConfigExt;
use crate::error::{ConnectError, Result};
use crate::server::{ServerConfig, ServerConnection};
use pmocatalog::{CatalogProvider, CoverPrefetchFn};
use pmoconfig::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Listener appelé à la connexion ou à la déconnexion
pub type ServerCallback = Box<dyn Fn() + Send + Sync>;

/// Se connecte aux serveurs configurés et expose le catalogue actif
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoconnect::ServerManager;
/// use pmojellyfin::JellyfinClientFactory;
///
/// let mut manager = ServerManager::new(pmoconfig::get_config(), JellyfinClientFactory::default());
/// if let Some(server) = manager.get_default_server()? {
///     manager.connect_to_server(&server, "password").await?;
/// }
/// ```
pub struct ServerManager<F: ClientFactory> {
    config: Arc<Config>,
    arbitrator: ConnectionArbitrator<F>,
    server: Option<Arc<F::Client>>,
    server_id: Option<Uuid>,
    logged_in_user: Option<String>,
    prefetch_cover: Option<CoverPrefetchFn>,
    on_server_connected: Vec<ServerCallback>,
    on_logout: Vec<ServerCallback>,
}

impl<F> ServerManager<F>
where
    F: ClientFactory,
    F::Client: CatalogProvider,
{
    /// Crée un manager avec les délais d'arbitrage de `config`
    pub fn new(config: Arc<Config>, factory: F) -> Self {
        let timings = config.get_arbitration_timings().unwrap_or_else(|e| {
            warn!("Invalid arbitration settings, using defaults: {}", e);
            ArbitrationTimings::default()
        });

        Self {
            config,
            arbitrator: ConnectionArbitrator::new(factory).with_timings(timings),
            server: None,
            server_id: None,
            logged_in_user: None,
            prefetch_cover: None,
            on_server_connected: Vec::new(),
            on_logout: Vec::new(),
        }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Catalogue du serveur connecté
    pub fn server(&self) -> Option<Arc<F::Client>> {
        self.server.clone()
    }

    pub fn server_id(&self) -> Option<Uuid> {
        self.server_id
    }

    pub fn logged_in_user(&self) -> Option<&str> {
        self.logged_in_user.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.server.is_some()
    }

    /// Installe le callback de préchargement des pochettes, maintenant et pour les connexions futures
    pub fn set_prefetch_cover_callback(&mut self, callback: Option<CoverPrefetchFn>) {
        if let Some(server) = &self.server {
            server.set_prefetch_cover_callback(callback.clone());
        }
        self.prefetch_cover = callback;
    }

    /// Se connecte à `server`, en fait le serveur par défaut et notifie les listeners
    ///
    /// # Erreurs
    ///
    /// [`ConnectError::Unreachable`] quand aucun hostname n'a répondu,
    /// [`ConnectError::AuthRejected`] quand les identifiants ont été refusés.
    pub async fn connect_to_server(&mut self, server: &ServerConfig, password: &str) -> Result<()> {
        let client = self
            .connect(&server.connection, password)
            .await?
            .into_authenticated()?;
        client.set_prefetch_cover_callback(self.prefetch_cover.clone());

        self.server = Some(client);
        self.server_id = Some(server.id);
        self.logged_in_user = Some(server.connection.username.clone());
        self.set_default_server(server.id)?;

        info!(
            server = %server.nickname,
            user = %server.connection.username,
            "Connected to server"
        );
        for callback in &self.on_server_connected {
            callback();
        }
        Ok(())
    }

    /// Vérifie que `connection` est joignable et accepte `password`
    ///
    /// Ne touche pas à la session courante. Abandonne avec
    /// [`ConnectError::Unreachable`] après `limit`.
    pub async fn test_connection_and_auth(
        &self,
        connection: &ServerConnection,
        password: &str,
        limit: Duration,
    ) -> Result<()> {
        match tokio::time::timeout(limit, self.connect(connection, password)).await {
            Ok(session) => session?.into_authenticated().map(|_| ()),
            Err(_) => Err(ConnectError::Unreachable(format!(
                "{}: connection test timed out",
                connection.hostname
            ))),
        }
    }

    async fn connect(
        &self,
        connection: &ServerConnection,
        password: &str,
    ) -> Result<Session<F::Client>> {
        let insecure = self.config.get_skip_ssl_verify()?;
        self.arbitrator
            .resolve(&connection.descriptor(insecure), password)
            .await
    }

    /// Serveur marqué par défaut, sinon le premier configuré
    pub fn get_default_server(&self) -> Result<Option<ServerConfig>> {
        let servers = self.config.get_servers()?;
        let default = servers.iter().position(|s| s.default).unwrap_or(0);
        Ok(servers.into_iter().nth(default))
    }

    /// Marque `server_id` comme serveur par défaut
    ///
    /// Si aucun serveur ne porte cet identifiant, le premier devient le serveur par défaut.
    pub fn set_default_server(&self, server_id: Uuid) -> Result<()> {
        let mut servers = self.config.get_servers()?;
        let mut found = false;
        for server in servers.iter_mut() {
            server.default = server.id == server_id;
            found |= server.default;
        }
        if !found {
            debug!(%server_id, "Unknown default server, falling back to the first one");
            if let Some(first) = servers.first_mut() {
                first.default = true;
            }
        }
        self.config.set_servers(&servers)?;
        Ok(())
    }

    /// Ajoute un nouveau serveur à la configuration
    pub fn add_server(&self, nickname: &str, connection: ServerConnection) -> Result<ServerConfig> {
        let server = ServerConfig::new(nickname, connection);
        let mut servers = self.config.get_servers()?;
        servers.push(server.clone());
        self.config.set_servers(&servers)?;
        info!(server = %server.nickname, id = %server.id, "Server added");
        Ok(server)
    }

    pub fn delete_server(&self, server_id: Uuid) -> Result<()> {
        let mut servers = self.config.get_servers()?;
        let before = servers.len();
        servers.retain(|s| s.id != server_id);
        if servers.len() == before {
            return Err(ConnectError::ServerNotFound(server_id));
        }
        self.config.set_servers(&servers)?;
        info!(id = %server_id, "Server deleted");
        Ok(())
    }

    /// Abandonne la session et notifie les listeners ; sans effet si déconnecté
    pub fn logout(&mut self) {
        if self.server.is_none() {
            return;
        }
        for callback in &self.on_logout {
            callback();
        }
        self.server = None;
        self.server_id = None;
        self.logged_in_user = None;
        info!("Logged out");
    }

    pub fn on_server_connected(&mut self, callback: impl Fn() + Send + Sync + 'static) {
        self.on_server_connected.push(Box::new(callback));
    }

    pub fn on_logout(&mut self, callback: impl Fn() + Send + Sync + 'static) {
        self.on_logout.push(Box::new(callback));
    }
}

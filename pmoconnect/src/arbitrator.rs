//! Course entre les tentatives de connexion sur un hostname principal et un alternatif
//!
//! Un serveur peut être configuré avec deux hostnames (typiquement adresses LAN
//! et WAN). [`ConnectionArbitrator::resolve`] s'authentifie sur les deux, le
//! principal immédiatement et l'alternatif après un court décalage, et garde le
//! premier hôte qui répond. Un refus d'authentification compte comme une
//! réponse : l'appelant doit pouvoir distinguer « mauvais mot de passe » de
//! « serveur introuvable ».
//!
//! Chaque tentative tourne dans une tâche qui écrit dans un canal `mpsc`
//! dimensionné au nombre de tentatives : un perdant tardif ne bloque jamais,
//! son résultat est simplement abandonné. La seule annulation est l'échéance
//! côté réception.

use crate::error::{ConnectError, LoginError, Result};
use crate::server::ServerType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// Avance donnée au hostname principal
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(333);
/// Durée maximale de tout l'arbitrage
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Client d'authentification lié à un seul hostname
#[async_trait]
pub trait ServerClient: Send + Sync + 'static {
    fn hostname(&self) -> &str;

    /// S'authentifie auprès du serveur
    ///
    /// Doit renvoyer [`LoginError::Rejected`] quand le serveur a répondu en
    /// refusant les identifiants, [`LoginError::Network`] dans tous les autres cas.
    async fn login(&self, username: &str, credential: &str) -> std::result::Result<(), LoginError>;
}

/// Construit un [`ServerClient`] par hostname candidat
pub trait ClientFactory: Send + Sync {
    type Client: ServerClient;

    fn build(&self, hostname: &str, descriptor: &ConnectionDescriptor) -> Result<Self::Client>;
}

/// Où et sous quel compte se connecter
///
/// Le mot de passe ne fait pas partie du descripteur : il est passé à
/// [`ConnectionArbitrator::resolve`] et n'est donc jamais persisté avec lui.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub hostname: String,
    #[serde(default)]
    pub alt_hostname: Option<String>,
    pub username: String,
    /// Backend pour lequel la factory doit construire un client
    #[serde(default)]
    pub server_type: ServerType,
    /// Accepte les certificats TLS invalides
    #[serde(default)]
    pub insecure_transport: bool,
}

impl ConnectionDescriptor {
    pub fn new(hostname: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn with_alternate(mut self, alt_hostname: impl Into<String>) -> Self {
        self.alt_hostname = Some(alt_hostname.into());
        self
    }

    pub fn with_server_type(mut self, server_type: ServerType) -> Self {
        self.server_type = server_type;
        self
    }

    pub fn insecure(mut self, insecure_transport: bool) -> Self {
        self.insecure_transport = insecure_transport;
        self
    }

    /// Hostname alternatif, `None` s'il est absent ou vide
    pub fn alternate(&self) -> Option<&str> {
        self.alt_hostname
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

/// Décalage et échéance d'un arbitrage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbitrationTimings {
    pub stagger: Duration,
    pub deadline: Duration,
}

impl Default for ArbitrationTimings {
    fn default() -> Self {
        Self {
            stagger: DEFAULT_STAGGER,
            deadline: DEFAULT_DEADLINE,
        }
    }
}

/// Hostname configuré auquel une session est liée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Primary,
    Alternate,
}

/// Client lié à l'hôte qui a répondu le premier
#[derive(Debug)]
pub struct Session<C> {
    pub client: Arc<C>,
    pub hostname: String,
    pub endpoint: Endpoint,
    /// Renseigné quand l'hôte a répondu mais refusé les identifiants
    pub auth_error: Option<String>,
}

impl<C> Session<C> {
    pub fn is_authenticated(&self) -> bool {
        self.auth_error.is_none()
    }

    /// Le client, ou [`ConnectError::AuthRejected`] nommant l'hôte qui a refusé
    pub fn into_authenticated(self) -> Result<Arc<C>> {
        match self.auth_error {
            None => Ok(self.client),
            Some(message) => Err(ConnectError::AuthRejected {
                hostname: self.hostname,
                message,
            }),
        }
    }
}

/// Résout un [`ConnectionDescriptor`] en [`Session`]
pub struct ConnectionArbitrator<F> {
    factory: F,
    timings: ArbitrationTimings,
}

impl<F: ClientFactory> ConnectionArbitrator<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            timings: ArbitrationTimings::default(),
        }
    }

    pub fn with_timings(mut self, timings: ArbitrationTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn timings(&self) -> ArbitrationTimings {
        self.timings
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Met en concurrence les tentatives et renvoie le premier hôte qui a répondu
    ///
    /// # Erreurs
    ///
    /// - [`ConnectError::ClientBuild`] si un client ne peut pas être créé
    /// - [`ConnectError::Unreachable`] si aucun hôte n'a répondu avant
    ///   l'échéance, ou si toutes les tentatives ont échoué au niveau réseau
    ///
    /// Un refus d'authentification n'est *pas* une erreur ici : il revient
    /// sous forme de session avec `auth_error` renseigné.
    pub async fn resolve(
        &self,
        descriptor: &ConnectionDescriptor,
        credential: &str,
    ) -> Result<Session<F::Client>> {
        let mut attempts = vec![(
            Endpoint::Primary,
            Arc::new(self.factory.build(&descriptor.hostname, descriptor)?),
            Duration::ZERO,
        )];
        if let Some(alt) = descriptor.alternate() {
            attempts.push((
                Endpoint::Alternate,
                Arc::new(self.factory.build(alt, descriptor)?),
                self.timings.stagger,
            ));
        }

        let (tx, mut rx) = mpsc::channel(attempts.len());
        for (endpoint, client, delay) in attempts {
            let tx = tx.clone();
            let username = descriptor.username.clone();
            let credential = credential.to_string();
            tokio::spawn(async move {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                debug!(hostname = %client.hostname(), ?endpoint, "Login attempt");

                let auth_error = match client.login(&username, &credential).await {
                    Ok(()) => None,
                    Err(LoginError::Rejected(message)) => Some(message),
                    Err(LoginError::Network(e)) => {
                        debug!(hostname = %client.hostname(), "Host not reached: {}", e);
                        return;
                    }
                };
                // la capacité couvre toutes les tentatives : jamais bloquant, et
                // le signal d'un perdant tardif part avec le récepteur
                let _ = tx.try_send(Session {
                    hostname: client.hostname().to_string(),
                    client,
                    endpoint,
                    auth_error,
                });
            });
        }
        drop(tx);

        match timeout(self.timings.deadline, rx.recv()).await {
            Ok(Some(session)) => {
                info!(
                    hostname = %session.hostname,
                    endpoint = ?session.endpoint,
                    authenticated = session.is_authenticated(),
                    "Server reached"
                );
                Ok(session)
            }
            Ok(None) => {
                warn!(hostname = %descriptor.hostname, "No endpoint reachable");
                Err(ConnectError::Unreachable(format!(
                    "{}: every endpoint failed",
                    descriptor.hostname
                )))
            }
            Err(_) => {
                warn!(
                    hostname = %descriptor.hostname,
                    deadline_ms = self.timings.deadline.as_millis() as u64,
                    "No endpoint answered before the deadline"
                );
                Err(ConnectError::Unreachable(format!(
                    "{}: no answer within {:?}",
                    descriptor.hostname, self.timings.deadline
                )))
            }
        }
    }
}

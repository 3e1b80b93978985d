//! # PMOConnect
//!
//! Établit une session avec un serveur de musique configuré avec un hostname
//! principal et un hostname alternatif optionnel.
//!
//! - [`ConnectionArbitrator`] lance l'authentification sur les deux hostnames
//!   et garde le premier qui répond, en distinguant un serveur injoignable
//!   d'identifiants refusés.
//! - [`ServerManager`] conserve la liste des serveurs dans `pmoconfig`, suit
//!   le serveur connecté et notifie les listeners.
//!
//! Les backends se branchent via [`ServerClient`] et [`ClientFactory`].

pub mod arbitrator;
pub mod config_ext;
pub mod error;
pub mod manager;
pub mod server;

pub use arbitrator::{
    ArbitrationTimings, ClientFactory, ConnectionArbitrator, ConnectionDescriptor, Endpoint,
    ServerClient, Session, DEFAULT_DEADLINE, DEFAULT_STAGGER,
};
pub use config_ext::ServerConfigExt;
pub use error::{ConnectError, LoginError, Result};
pub use manager::{ServerCallback, ServerManager};
pub use server::{ServerConfig, ServerConnection, ServerType};

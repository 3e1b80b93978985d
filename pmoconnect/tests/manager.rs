use async_trait::async_trait;
use pmocatalog::{
    Album, Artist, BoxedIterator, CatalogFilter, CatalogIterator, CatalogProvider,
    CoverPrefetchFn, ProviderCapabilities, Track,
};
use pmoconfig::Config;
use pmoconnect::{
    ClientFactory, ConnectError, ConnectionDescriptor, LoginError, ServerClient, ServerConnection,
    ServerManager,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Réponse d'un faux hôte à l'authentification
#[derive(Debug, Clone)]
enum Host {
    Password(&'static str),
    Down,
    Slow(Duration),
}

struct FakeServer {
    hostname: String,
    host: Host,
    prefetch: Mutex<Option<CoverPrefetchFn>>,
}

fn empty<T: pmocatalog::CatalogItem + Send + 'static>() -> BoxedIterator<T> {
    Box::new(CatalogIterator::new(
        |_: usize, _: usize| std::future::ready(Ok::<Vec<T>, anyhow::Error>(Vec::new())),
        10,
    ))
}

#[async_trait]
impl ServerClient for FakeServer {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn login(&self, _username: &str, credential: &str) -> Result<(), LoginError> {
        match &self.host {
            Host::Password(expected) if *expected == credential => Ok(()),
            Host::Password(_) => Err(LoginError::Rejected("Invalid username or password".into())),
            Host::Down => Err(LoginError::Network(anyhow::anyhow!("connection refused"))),
            Host::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(())
            }
        }
    }
}

impl CatalogProvider for FakeServer {
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::default()
    }

    fn album_sort_orders(&self) -> Vec<&'static str> {
        vec!["Title (A-Z)"]
    }

    fn artist_sort_orders(&self) -> Vec<&'static str> {
        vec!["Name (A-Z)"]
    }

    fn iterate_albums(&self, _sort_order: &str, _filter: &CatalogFilter) -> BoxedIterator<Album> {
        empty()
    }

    fn search_albums(&self, _query: &str, _filter: &CatalogFilter) -> BoxedIterator<Album> {
        empty()
    }

    fn iterate_tracks(&self, _query: &str) -> BoxedIterator<Track> {
        empty()
    }

    fn iterate_artists(&self, _sort_order: &str) -> BoxedIterator<Artist> {
        empty()
    }

    fn set_prefetch_cover_callback(&self, callback: Option<CoverPrefetchFn>) {
        *self.prefetch.lock().unwrap() = callback;
    }
}

#[derive(Default)]
struct FakeFactory {
    hosts: HashMap<String, Host>,
}

impl FakeFactory {
    fn with(mut self, hostname: &str, host: Host) -> Self {
        self.hosts.insert(hostname.to_string(), host);
        self
    }
}

impl ClientFactory for FakeFactory {
    type Client = FakeServer;

    fn build(
        &self,
        hostname: &str,
        _descriptor: &ConnectionDescriptor,
    ) -> pmoconnect::Result<FakeServer> {
        Ok(FakeServer {
            hostname: hostname.to_string(),
            host: self.hosts.get(hostname).cloned().unwrap_or(Host::Down),
            prefetch: Mutex::new(None),
        })
    }
}

fn manager(factory: FakeFactory) -> (tempfile::TempDir, ServerManager<FakeFactory>) {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(Config::load_config(dir.path().to_str().unwrap()).unwrap());
    (dir, ServerManager::new(config, factory))
}

#[test]
fn server_list_management() {
    let (_dir, manager) = manager(FakeFactory::default());
    assert!(manager.get_default_server().unwrap().is_none());

    let home = manager
        .add_server("Home", ServerConnection::new("http://lan", "alice"))
        .unwrap();
    let work = manager
        .add_server("Work", ServerConnection::new("http://work", "bob"))
        .unwrap();

    // pas de serveur par défaut explicite : le premier
    assert_eq!(manager.get_default_server().unwrap().unwrap().id, home.id);

    manager.set_default_server(work.id).unwrap();
    assert_eq!(manager.get_default_server().unwrap().unwrap().id, work.id);

    manager.delete_server(work.id).unwrap();
    assert_eq!(manager.get_default_server().unwrap().unwrap().id, home.id);
    assert!(matches!(
        manager.delete_server(work.id),
        Err(ConnectError::ServerNotFound(id)) if id == work.id
    ));

    // identifiant inconnu : retour au premier serveur
    manager.set_default_server(uuid::Uuid::new_v4()).unwrap();
    assert!(manager.get_default_server().unwrap().unwrap().default);
}

#[tokio::test(start_paused = true)]
async fn connect_sets_session_and_notifies() {
    let factory = FakeFactory::default()
        .with("http://lan", Host::Down)
        .with("https://wan", Host::Password("secret"));
    let (_dir, mut manager) = manager(factory);

    let connected = Arc::new(AtomicUsize::new(0));
    let logged_out = Arc::new(AtomicUsize::new(0));
    let (c, l) = (connected.clone(), logged_out.clone());
    manager.on_server_connected(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    manager.on_logout(move || {
        l.fetch_add(1, Ordering::SeqCst);
    });

    let prefetch: CoverPrefetchFn =
        Arc::new(|_id: String| -> pmocatalog::HookFuture { Box::pin(async { Ok(()) }) });
    manager.set_prefetch_cover_callback(Some(prefetch));

    let mut connection = ServerConnection::new("http://lan", "alice");
    connection.alt_hostname = Some("https://wan".into());
    let other = manager
        .add_server("Other", ServerConnection::new("http://other", "carol"))
        .unwrap();
    let server = manager.add_server("Home", connection).unwrap();

    manager.connect_to_server(&server, "secret").await.unwrap();

    assert_eq!(manager.server_id(), Some(server.id));
    assert_eq!(manager.logged_in_user(), Some("alice"));
    let client = manager.server().unwrap();
    assert_eq!(client.hostname(), "https://wan");
    assert!(client.prefetch.lock().unwrap().is_some());
    assert_eq!(manager.get_default_server().unwrap().unwrap().id, server.id);
    assert_ne!(other.id, server.id);
    assert_eq!(connected.load(Ordering::SeqCst), 1);

    manager.logout();
    assert!(!manager.is_connected());
    assert_eq!(manager.server_id(), None);
    assert_eq!(manager.logged_in_user(), None);
    assert_eq!(logged_out.load(Ordering::SeqCst), 1);

    // une seconde déconnexion est sans effet
    manager.logout();
    assert_eq!(logged_out.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn wrong_password_is_reported_with_hostname() {
    let factory = FakeFactory::default().with("http://lan", Host::Password("secret"));
    let (_dir, mut manager) = manager(factory);
    let server = manager
        .add_server("Home", ServerConnection::new("http://lan", "alice"))
        .unwrap();

    let err = manager.connect_to_server(&server, "nope").await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(matches!(err, ConnectError::AuthRejected { ref hostname, .. } if hostname == "http://lan"));
    assert!(!manager.is_connected());
}

#[tokio::test(start_paused = true)]
async fn connection_test_is_bounded() {
    let factory = FakeFactory::default()
        .with("http://lan", Host::Password("secret"))
        .with("http://slow", Host::Slow(Duration::from_secs(3)));
    let (_dir, manager) = manager(factory);

    manager
        .test_connection_and_auth(
            &ServerConnection::new("http://lan", "alice"),
            "secret",
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    let result = manager
        .test_connection_and_auth(
            &ServerConnection::new("http://slow", "alice"),
            "secret",
            Duration::from_secs(1),
        )
        .await;
    assert!(matches!(result, Err(ConnectError::Unreachable(_))));

    let result = manager
        .test_connection_and_auth(
            &ServerConnection::new("http://down", "alice"),
            "secret",
            Duration::from_secs(1),
        )
        .await;
    assert!(matches!(result, Err(ConnectError::Unreachable(_))));
    assert!(!manager.is_connected());
}

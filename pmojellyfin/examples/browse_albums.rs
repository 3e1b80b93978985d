//! Se connecte au serveur Jellyfin par défaut et liste quelques albums
//!
//! Le premier lancement enregistre le serveur passé en ligne de commande.
//!
//! Utilisation :
//! ```bash
//! JELLYFIN_PASSWORD=secret cargo run --example browse_albums -- http://192.168.1.10:8096 alice [https://music.example.org]
//! RUST_LOG=debug JELLYFIN_PASSWORD=secret cargo run --example browse_albums
//! ```

use pmocatalog::{
    CatalogFilter, CatalogItem, CatalogProvider, CoverPrefetchFn, HookFuture, ItemIterator,
};
use pmoconfig::get_config;
use pmoconnect::{ServerConnection, ServerManager};
use pmojellyfin::{JellyfinClientFactory, ALBUM_SORT_RANDOM, ALBUM_SORT_RECENTLY_ADDED};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config();

    if config.get_log_enable_console()? {
        let level = config.get_log_min_level()?.to_lowercase();
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let factory = JellyfinClientFactory::from_config(&config)?;
    let mut manager = ServerManager::new(config, factory);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [hostname, username, rest @ ..] = args.as_slice() {
        let mut connection = ServerConnection::new(hostname.as_str(), username.as_str());
        connection.alt_hostname = rest.first().cloned();
        let server = manager.add_server("Jellyfin", connection)?;
        manager.set_default_server(server.id)?;
        println!("Registered server {}", server.id);
    }

    let Some(server) = manager.get_default_server()? else {
        eprintln!("No server configured, pass <hostname> <username> [alt_hostname]");
        return Ok(());
    };
    let password = std::env::var("JELLYFIN_PASSWORD").unwrap_or_default();

    let prefetch: CoverPrefetchFn = Arc::new(|cover_id: String| -> HookFuture {
        Box::pin(async move {
            tracing::debug!("Would prefetch cover {}", cover_id);
            Ok::<(), anyhow::Error>(())
        })
    });
    manager.set_prefetch_cover_callback(Some(prefetch));
    manager.connect_to_server(&server, &password).await?;

    let Some(catalog) = manager.server() else {
        return Ok(());
    };

    println!("=== {} ===", ALBUM_SORT_RECENTLY_ADDED);
    let mut recent = catalog.iterate_albums(ALBUM_SORT_RECENTLY_ADDED, &CatalogFilter::default());
    if let Some(page) = recent.next(10).await? {
        for album in page {
            println!("  {} - {} ({})", album.artist_names.join(", "), album.name, album.year);
        }
    }

    println!("\n=== {} favorites ===", ALBUM_SORT_RANDOM);
    let favorites = CatalogFilter {
        exclude_unfavorited: true,
        ..Default::default()
    };
    let mut random = catalog.iterate_albums(ALBUM_SORT_RANDOM, &favorites);
    while let Some(page) = random.next(25).await? {
        for album in page {
            println!("  {} [{}]", album.name, album.id());
        }
    }

    manager.logout();
    Ok(())
}

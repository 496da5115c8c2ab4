use dmapplemusic::AppleMusicClient;
use dmconfig::get_config;
use dmqueue::{QueueDispatcher, QueueServerExt};
use dmresolver::{ResolverBuilder, ResolverServerExt};
use dmserver::{LoggingOptions, ServerBuilder};
use dmspotify::{SpotifyClient, SpotifyConfigExt};
use dmyoutube::YouTubeClient;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Serveur et logs ==========
    let config = get_config();

    let mut server = ServerBuilder::from_config(&config).build();
    server
        .init_logging(LoggingOptions::from_config(&config))
        .await?;

    // ========== PHASE 2 : Catalogues ==========
    info!("🎵 Registering catalogs...");

    let youtube = Arc::new(YouTubeClient::from_config(&config).await?);
    let mut resolver = ResolverBuilder::from_config(&config)?
        .catalog(youtube.clone())
        .surrogate_finder(youtube);

    if config.is_spotify_configured() {
        resolver = resolver.catalog(Arc::new(SpotifyClient::from_config(&config)?));
    } else {
        warn!("⚠️ Spotify credentials missing, Spotify URLs and search are disabled");
    }

    match AppleMusicClient::from_config(&config) {
        Ok(client) => resolver = resolver.catalog(Arc::new(client)),
        Err(e) => warn!("⚠️ Failed to set up Apple Music: {}", e),
    }

    let resolver = Arc::new(resolver.build()?);

    // ========== PHASE 3 : API et canal temps réel ==========
    info!("📡 Initializing lookup API and queue channel...");
    server.init_lookup_api(resolver.clone()).await?;
    server
        .init_queue_channel(QueueDispatcher::new(resolver))
        .await?;

    let server_info = server.info();
    server.start().await?;
    info!(
        "✅ {} {} ready on {}:{}",
        server_info.name, server_info.version, server_info.bind_address, server_info.http_port
    );

    server.wait().await;
    Ok(())
}

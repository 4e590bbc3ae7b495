use cyberfish::application::{BindingService, SettingsService};
use cyberfish::config::Settings;
use cyberfish::domain::binding::SharedGamepadSource;
use cyberfish::domain::settings::{Config, ConfigStore};
use cyberfish::domain::stream::{ManagerOptions, StreamConnectionManager};
use cyberfish::infrastructure::media::WebRtcTransportFactory;
use cyberfish::infrastructure::persistence::FileConfigRepository;
use cyberfish::infrastructure::signaling::WhepClient;
use cyberfish::interface::api::{build_router, init_metrics, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter)),
        )
        .init();

    info!("Starting CyberFish control core");

    let prometheus_handle = init_metrics()?;

    // Operator configuration
    let repository = Arc::new(FileConfigRepository::new(&settings.storage.config_path));
    info!("Operator config at {}", repository.path().display());
    let config_store = Arc::new(ConfigStore::new(repository));
    let config = match config_store.load_config().await {
        Ok(config) => config,
        Err(e) => {
            warn!("Falling back to default drone address: {}", e);
            Config::default()
        }
    };

    // Stream session
    let endpoint = settings.whep_endpoint(&config.ip, config.stream_port);
    info!("Drone camera at {}", endpoint);
    let signaling = Arc::new(WhepClient::new(endpoint, settings.request_timeout())?);
    let factory = Arc::new(WebRtcTransportFactory::new(
        settings.stream.ice_servers.clone(),
    ));
    let stream = StreamConnectionManager::new(
        factory,
        signaling,
        ManagerOptions {
            retry_delay: settings.retry_delay(),
            ..Default::default()
        },
    );

    let starter = stream.clone();
    tokio::spawn(async move { starter.start().await });

    // Gamepad capture
    let gamepads = Arc::new(SharedGamepadSource::new());
    let bindings = Arc::new(BindingService::new(
        Arc::clone(&config_store),
        Arc::clone(&gamepads),
    ));

    let state = AppState {
        config_store: Arc::clone(&config_store),
        settings: Arc::new(SettingsService::new(
            Arc::clone(&config_store),
            stream.clone(),
            settings.clone(),
        )),
        stream: stream.clone(),
        gamepads,
        bindings,
    };

    let app = build_router(state, prometheus_handle);
    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    info!("API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    stream.dispose().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

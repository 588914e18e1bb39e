use crate::cli::ServeOpts;
use crate::config::{BindMode, Config, StoreBackend};
use crate::gateway::auth::ResolvedAuth;
use crate::gateway::routes;
use crate::providers::{JitsiProvider, ProviderRegistry};
use crate::store::{MemorySettingsStore, SettingsStore, SqliteSettingsStore};

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub auth: Arc<ResolvedAuth>,
    pub providers: Arc<ProviderRegistry>,
    pub shutdown_tx: broadcast::Sender<()>,
    pub start_time: std::time::Instant,
    pub version: String,
}

impl GatewayState {
    pub fn new(config: Config, providers: ProviderRegistry) -> Self {
        let auth = ResolvedAuth::from_config(&config.auth);
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            providers: Arc::new(providers),
            shutdown_tx,
            start_time: std::time::Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The gateway server.
pub struct GatewayServer {
    state: GatewayState,
    addr: SocketAddr,
}

impl GatewayServer {
    /// Open the settings store, initialize providers and resolve the bind
    /// address. A provider configuration error aborts startup.
    pub async fn start(config: Config, opts: ServeOpts) -> Result<Self> {
        let port = opts.port.unwrap_or(config.server.port);
        let bind_addr = resolve_bind_address(&config, opts.bind.as_deref(), port)?;

        let store = open_settings_store(&config)?;
        let providers = build_registry(&config, store)?;

        let state = GatewayState::new(config, providers);
        if state.auth.user_count() == 0 {
            warn!("No API users configured; every admin request will be rejected");
        }

        info!("Gateway server binding to {}", bind_addr);

        Ok(Self {
            state,
            addr: bind_addr,
        })
    }

    /// Run the server until shutdown signal is received.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let state = self.state.clone();
        let app = build_router(state.clone());

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!(
            "Jitsi connector v{} listening on {}",
            state.version, self.addr
        );

        print_startup_banner(&state, &self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(state.shutdown_tx.clone()))
            .await?;

        info!("Gateway server shut down gracefully");
        Ok(())
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Trigger graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.state.shutdown_tx.send(());
    }
}

/// Open the configured settings store.
pub fn open_settings_store(config: &Config) -> Result<Arc<dyn SettingsStore>> {
    match config.store.backend {
        StoreBackend::Sqlite => {
            let path = config.store_path();
            let store = SqliteSettingsStore::open(&path)
                .with_context(|| format!("Cannot open settings store '{}'", path.display()))?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory settings store; settings will not survive a restart");
            Ok(Arc::new(MemorySettingsStore::new()))
        }
    }
}

/// Initialize every enabled provider and register it.
pub fn build_registry(config: &Config, store: Arc<dyn SettingsStore>) -> Result<ProviderRegistry> {
    let registry = ProviderRegistry::new();

    let jitsi = &config.providers.jitsi;
    if jitsi.enabled {
        let provider = JitsiProvider::initialize(&jitsi.params, store, jitsi.configuration)
            .context("Cannot initialize Jitsi provider")?;
        registry.register(Arc::new(provider));
    } else {
        info!("Jitsi provider disabled");
    }

    Ok(registry)
}

/// Build the Axum router with all routes.
fn build_router(state: GatewayState) -> Router {
    routes::build_routes(state)
}

/// Wait for shutdown signal (Ctrl+C, SIGTERM or an explicit trigger).
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let mut trigger = shutdown_tx.subscribe();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
        _ = trigger.recv() => {
            info!("Shutdown requested");
        }
    }

    let _ = shutdown_tx.send(());
}

/// Resolve the bind address from configuration.
fn resolve_bind_address(
    config: &Config,
    bind_override: Option<&str>,
    port: u16,
) -> Result<SocketAddr> {
    let bind = match bind_override {
        Some(b) => b.parse().map_err(anyhow::Error::msg)?,
        None => config.server.bind,
    };

    let host = match bind {
        BindMode::Loopback => "127.0.0.1",
        BindMode::Lan => "0.0.0.0",
        BindMode::Custom => config
            .server
            .custom_bind_host
            .as_deref()
            .unwrap_or("0.0.0.0"),
    };

    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))
}

/// Print startup banner with server info.
fn print_startup_banner(state: &GatewayState, addr: &SocketAddr) {
    let providers: Vec<String> = state
        .providers
        .list()
        .into_iter()
        .map(|p| format!("{} v{}", p.title, p.version))
        .collect();

    info!("-------------------------------------------");
    info!("  Jitsi connector v{}", state.version);
    info!("  Listening on: http://{}", addr);
    info!("  API users: {}", state.auth.user_count());
    info!("  Providers: {}", providers.join(", "));
    info!("  Settings: http://{}{}", addr, routes::ADMIN_SETTINGS_PATH);
    info!("  Health: http://{}/api/health", addr);
    info!("-------------------------------------------");
}

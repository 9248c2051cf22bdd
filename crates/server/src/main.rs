use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dayoff_core::{
    create_authenticator, load_config, run_scan_source, stdin_lines, validate_config,
    AttendanceApi, Authenticator, FanoutPresenter, FileKeyValueStore, HttpAttendanceClient,
    LogPresenter, OwnerVerifier, PasscodeVerifier, Scanner, SettingsStore,
};
use dayoff_server::api::{create_router, WsBroadcaster};
use dayoff_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("dayoff-scanner {}", VERSION);

    // Determine config path
    let config_path = std::env::var("DAYOFF_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Attendance API: {}", config.attendance.base_url);
    info!("Storage path: {:?}", config.storage.path);

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Settings storage
    let backend = FileKeyValueStore::new(config.storage.path.clone()).with_context(|| {
        format!("Failed to open storage at {:?}", config.storage.path)
    })?;
    let store = SettingsStore::new(Arc::new(backend));

    // Attendance API client
    let api: Arc<dyn AttendanceApi> = Arc::new(
        HttpAttendanceClient::new(&config.attendance)
            .context("Failed to create attendance client")?,
    );

    // Status changes go to the log and to WebSocket clients
    let ws_broadcaster = WsBroadcaster::default();
    let presenter = FanoutPresenter::new()
        .with(Arc::new(LogPresenter))
        .with(Arc::new(ws_broadcaster.clone()));

    let scanner = Arc::new(Scanner::new(
        &config.scanner,
        api,
        store,
        Arc::new(presenter),
    ));
    info!("Scanner initialized");

    // Optional line-based scan source (e.g. a keyboard-wedge reader)
    let stdin_task = if config.scanner.read_stdin {
        info!("Reading scans from stdin");
        let verifier: Arc<dyn OwnerVerifier> = Arc::new(PasscodeVerifier::new(
            config.scanner.import_passcode.clone(),
            None,
        ));
        Some(tokio::spawn(run_scan_source(
            Arc::clone(&scanner),
            stdin_lines(),
            verifier,
        )))
    } else {
        None
    };

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        scanner,
        ws_broadcaster,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    if let Some(task) = stdin_task {
        task.abort();
    }
    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

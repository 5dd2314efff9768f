use anyhow::Result;
use clap::Parser;
use ipam_server::{create_router, db::Database, AppState, Config};
use std::sync::Arc;
use tower::ServiceExt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_PATH: &str = "/etc/ipam-server/config.yaml";

/// IPAM Server - IPv4 inventory with bulk range allocation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Data directory for the database
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Unix socket path for API communication
    #[arg(short = 's', long)]
    unix_socket: Option<String>,
}

fn resolve_config_path(requested: &str) -> String {
    if std::path::Path::new(requested).exists() || requested != DEFAULT_CONFIG_PATH {
        return requested.to_string();
    }

    let current_dir_config = "config.yaml";
    if std::path::Path::new(current_dir_config).exists() {
        info!("Config not found at {}, using {}", requested, current_dir_config);
        current_dir_config.to_string()
    } else {
        requested.to_string()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipam_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting IPAM Server");

    let config_path = resolve_config_path(&args.config);
    let mut config = match Config::from_file(&config_path) {
        Ok(cfg) => {
            info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration from {}: {}", config_path, e);
            info!("Using default configuration");
            Config::default()
        }
    };

    if let Some(data_dir) = args.data_dir {
        let db_path = std::path::Path::new(&data_dir).join("ipam.db");
        config.database_path = db_path.to_string_lossy().to_string();
        info!("Using data directory: {}", data_dir);
    }

    if let Some(socket_path) = args.unix_socket {
        config.api.unix_socket = Some(socket_path);
    }

    let db_url = format!("sqlite:{}", config.database_path);
    let db = match Database::new(&db_url).await {
        Ok(database) => {
            info!("Database initialized at {}", config.database_path);
            Arc::new(database)
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e);
        }
    };

    info!(
        "Bulk limits: basic {} addresses (commit every {}), enhanced {} addresses (commit every {})",
        config.bulk.basic.max_range,
        config.bulk.basic.commit_interval,
        config.bulk.enhanced.max_range,
        config.bulk.enhanced.commit_interval
    );

    let state = AppState::new(Arc::clone(&db), config.bulk.clone());

    if let Some(socket_path) = config.api.unix_socket.clone() {
        // Remove a stale socket left by a previous run
        let _ = std::fs::remove_file(&socket_path);

        let app = create_router(state.clone());
        let listener = tokio::net::UnixListener::bind(&socket_path).map_err(|e| {
            error!("Failed to bind Unix socket at {}: {}", socket_path, e);
            e
        })?;

        info!("API server listening on Unix socket: {}", socket_path);

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let app = app.clone();
                        tokio::spawn(async move {
                            let stream = hyper_util::rt::TokioIo::new(stream);
                            let hyper_service = hyper::service::service_fn(
                                move |request: hyper::Request<hyper::body::Incoming>| {
                                    app.clone().oneshot(request)
                                },
                            );

                            if let Err(err) = hyper_util::server::conn::auto::Builder::new(
                                hyper_util::rt::TokioExecutor::new(),
                            )
                            .serve_connection(stream, hyper_service)
                            .await
                            {
                                error!("Error serving Unix socket connection: {}", err);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting Unix socket connection: {}", e);
                    }
                }
            }
        });
    }

    let api_addr = format!("{}:{}", config.api.listen_address, config.api.port);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .map_err(|e| {
            error!("Failed to bind API server to {}: {}", api_addr, e);
            e
        })?;

    info!("API server listening on {}", api_addr);
    info!("Swagger UI available at http://{}/swagger-ui", api_addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("API server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

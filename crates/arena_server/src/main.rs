//! Arena server - tic-tac-toe match coordination over HTTP.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use arena_server::{
    AppState, MatchService, MemoryRepository, Repository, ServerConfig, SqliteRepository,
    StorageBackend, router,
};
use axum::{body::Body, http::Request};
use clap::Parser;
use cli::{Cli, Command};
use tower::ServiceBuilder;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            database_url,
            memory,
        } => {
            let mut config = ServerConfig::load(Some(config.as_path()))?;
            if let Some(host) = host {
                config.set_host(host);
            }
            if let Some(port) = port {
                config.set_port(port);
            }
            if let Some(database_url) = database_url {
                config.set_database_url(database_url);
            }
            if memory {
                config.set_storage(StorageBackend::Memory);
            }
            init_tracing(&config);
            run_server(config).await
        }
        Command::Migrate {
            config,
            database_url,
        } => {
            let mut config = ServerConfig::load(Some(config.as_path()))?;
            if let Some(database_url) = database_url {
                config.set_database_url(database_url);
            }
            init_tracing(&config);
            run_migrations(&config)
        }
    }
}

fn init_tracing(config: &ServerConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();
}

/// Opens the configured storage backend, migrating SQLite first.
#[instrument(skip(config), fields(storage = %config.storage()))]
fn open_repository(config: &ServerConfig) -> Result<Arc<dyn Repository>> {
    match config.storage() {
        StorageBackend::Memory => Ok(Arc::new(MemoryRepository::new())),
        StorageBackend::Sqlite => {
            let repository = SqliteRepository::new(config.database_url().clone())?
                .with_busy_timeout(*config.busy_timeout_ms());
            repository.run_migrations()?;
            Ok(Arc::new(repository))
        }
    }
}

/// Apply migrations and exit
#[instrument(skip(config), fields(database_url = %config.database_url()))]
fn run_migrations(config: &ServerConfig) -> Result<()> {
    let repository = SqliteRepository::new(config.database_url().clone())?
        .with_busy_timeout(*config.busy_timeout_ms());
    let applied = repository.run_migrations()?;
    info!(applied, "Database is up to date");
    Ok(())
}

/// Run the HTTP server
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    info!("Starting arena server");

    let repository = open_repository(&config)?;
    let state = AppState::new(MatchService::new(repository));

    // Wrap router with request logging
    let app = router(state).layer(
        ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }),
    );

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(address = %listener.local_addr()?, "Server ready");

    axum::serve(listener, app).await?;
    info!("Server stopped");
    Ok(())
}

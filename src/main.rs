//! tictactoe_server - command-line entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use tictactoe_server::{AppState, GameRepository, GameService, RngIndex, ServerConfig, router};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?.with_overrides(
        None,
        None,
        cli.database_url,
        None,
    );

    match cli.command {
        Command::Serve { host, port, seed } => {
            run_server(config.with_overrides(host, port, None, seed)).await
        }
        Command::CreateUser { username } => create_user(&config, username),
        Command::Migrate => migrate(&config).map(|_| ()),
    }
}

/// Opens the configured database and brings its schema up to date.
#[instrument(skip(config), fields(database_url = %config.database_url()))]
fn migrate(config: &ServerConfig) -> Result<GameRepository> {
    let repository = GameRepository::new(config.database_url().clone())?;
    repository
        .run_migrations()
        .context("Failed to migrate database")?;
    Ok(repository)
}

/// Creates a user and prints the issued token.
#[instrument(skip(config))]
fn create_user(config: &ServerConfig, username: String) -> Result<()> {
    let repository = migrate(config)?;
    let user = repository
        .create_user(username)
        .context("Failed to create user")?;

    info!(user_id = user.id(), username = %user.username(), "User created");
    println!("{}", user.api_token());
    Ok(())
}

/// Runs the HTTP game server until Ctrl+C.
#[instrument(skip(config), fields(addr = %config.bind_addr()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    let repository = migrate(&config)?;

    let service = match config.seed() {
        Some(seed) => {
            info!(seed, "Computer opponent seeded");
            GameService::new(repository, RngIndex::seeded(*seed))
        }
        None => GameService::new(repository, RngIndex::from_entropy()),
    };

    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    info!("Server ready at http://{}/", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Completes when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tictactoe_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

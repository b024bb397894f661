//! tictactoe_server - HTTP entry point
//!
//! Loads configuration, migrates the database and serves the game API.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use axum::{body::Body, http::Request};
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use tictactoe_server::{AppConfig, GameRepository, GameService, SeededRandom, router};
use tower::ServiceBuilder;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tictactoe_server=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?.with_database_path(cli.db_path);

    match cli.command {
        Command::Serve { port, host, seed } => serve(config.with_server(host, port), seed).await,
        Command::Migrate => {
            migrate(&config)?;
            Ok(())
        }
    }
}

/// Apply migrations against the configured database.
#[instrument(skip(config), fields(db_path = %config.database().path()))]
fn migrate(config: &AppConfig) -> Result<GameRepository> {
    let repository = GameRepository::new(config.database().path().clone())?;
    repository.run_migrations()?;
    Ok(repository)
}

/// Run the HTTP game server
#[instrument(skip(config))]
async fn serve(config: AppConfig, seed: Option<u64>) -> Result<()> {
    let repository = migrate(&config)?;
    let rng = match seed {
        Some(seed) => SeededRandom::from_seed(seed),
        None => SeededRandom::from_entropy(),
    };
    let service = Arc::new(GameService::new(repository, *config.game(), rng));

    let app = router(service).layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
        debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
        req
    }));

    let addr = format!("{}:{}", config.server().host(), config.server().port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        %addr,
        board_size = config.game().board_size(),
        win_line_length = config.game().win_line_length(),
        "Server ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

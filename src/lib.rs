pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub use config::Config;
use db::Store;
use models::account::Role;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("daemon" | "-d" | "--daemon") => run_daemon(config).await,

        Some("init" | "--init") => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        Some("create-admin") => {
            if args.len() < 4 {
                println!("Usage: booklog create-admin <username> <password> [display name]");
                return Ok(());
            }
            let display_name = args.get(4).cloned();
            cmd_create_admin(&config, &args[2], &args[3], display_name.as_deref()).await
        }

        Some("help" | "-h" | "--help") => {
            print_help();
            Ok(())
        }

        Some(other) => {
            println!("Unknown command: {other}");
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("booklog v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: booklog <command>");
    println!();
    println!("Commands:");
    println!("  daemon                                  Run the web service (default)");
    println!("  init                                    Create a default config.toml");
    println!("  create-admin <user> <password> [name]   Create an admin account");
    println!("  help                                    Show this help");
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    info!(
        "Booklog v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    if config.uses_default_secret() {
        warn!("auth.jwt_secret is still the shipped default; set a real secret in config.toml");
    }

    let port = config.server.port;
    let state = api::create_app_state_from_config(config).await?;

    let app = api::router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web API running at http://{addr}");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Daemon stopped");

    Ok(())
}

/// One-time bootstrap: create an admin account if the username is free.
async fn cmd_create_admin(
    config: &Config,
    username: &str,
    password: &str,
    display_name: Option<&str>,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.get_account(username).await?.is_some() {
        println!("Account '{}' already exists", username.trim());
        return Ok(());
    }

    let account = store
        .create_account(
            username,
            password,
            display_name.unwrap_or("Administrator"),
            Role::Admin,
            &config.auth,
        )
        .await?;

    println!("✓ Admin account created: {}", account.username);
    Ok(())
}

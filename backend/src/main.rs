//! Backend entry-point: configuration, wiring, and the Actix server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::ports::{DailyLogRepository, UserRepository};
use backend::domain::{DailyLogService, FactoryCatalog};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{MemoryDailyLogRepository, MemoryUserRepository};
use backend::server::{ServerConfig, create_server, seed_default_admin};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "backend", about = "Factory operations reporting backend")]
struct Args {
    /// Socket address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// TOML factory catalog; the builtin catalog is used when omitted.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// File holding the session key material. An ephemeral key is
    /// generated when omitted, invalidating sessions on restart.
    #[arg(long)]
    session_key_file: Option<PathBuf>,

    /// Disable the `Secure` cookie flag for plain-HTTP deployments.
    #[arg(long)]
    insecure_cookies: bool,
}

fn load_catalog(path: Option<&PathBuf>) -> std::io::Result<FactoryCatalog> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            FactoryCatalog::from_toml_str(&raw).map_err(|err| {
                std::io::Error::other(format!("invalid catalog {}: {err}", path.display()))
            })
        }
        None => Ok(FactoryCatalog::builtin()),
    }
}

fn load_session_key(path: Option<&PathBuf>) -> std::io::Result<Key> {
    match path {
        Some(path) => {
            let bytes = std::fs::read(path)?;
            Ok(Key::derive_from(&bytes))
        }
        None => {
            warn!("no session key file configured; sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    let args = Args::parse();
    let catalog = load_catalog(args.catalog.as_ref())?;
    let key = load_session_key(args.session_key_file.as_ref())?;

    let logs: Arc<dyn DailyLogRepository> = Arc::new(MemoryDailyLogRepository::new());
    let users: Arc<dyn UserRepository> = Arc::new(MemoryUserRepository::new());
    seed_default_admin(&users).await?;

    let http_state = HttpState::new(DailyLogService::new(logs, catalog), users);
    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(key, !args.insecure_cookies, SameSite::Lax, args.bind);

    create_server(health_state, http_state, config)?.await
}

//! Checks configuration and storage connectivity without starting the server.

use anyhow::Context;
use movies_api::domain::movie::MovieFilter;
use movies_api::infra::telemetry;
use movies_api::{AppConfig, MovieStore, PostgresMovieStore, StorageBackend};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads env vars (or .env):\n\
           STORAGE_BACKEND (postgres|memory, default postgres)\n\
           DATABASE_URL, DB_MAX_CONNECTIONS, HOST, PORT\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    telemetry::init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    println!("> Preflight:");
    println!("  bind address: {}", config.bind_addr());

    match &config.storage {
        StorageBackend::Memory => {
            println!("  storage: in-memory (nothing to check)");
        }
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            println!("  storage: postgres (max_connections={})", max_connections);
            let store = PostgresMovieStore::connect(database_url, *max_connections)
                .await
                .context("Failed to connect to the movie database")?;
            store.ping().await.context("Database ping failed")?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(store.pool())
                .await?;
            println!("  server: {}", version);

            let movies = store.count(&MovieFilter::default()).await?;
            println!("  movies stored: {}", movies);
        }
    }

    println!("> Preflight OK");
    Ok(())
}

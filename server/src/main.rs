use anyhow::{Context, Result};
use clap::Parser;
use pizzeria_server::{Api, Pizzeria, PizzeriaConfig};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host interface to bind (default: localhost).
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Durable datastore URL (falls back to the REDIS_URL env var; omit both
    /// to run on the in-process store only).
    #[arg(long)]
    redis_url: Option<String>,

    /// Key prefix for player records in the durable datastore.
    #[arg(long, default_value = "player:")]
    redis_prefix: String,

    /// Bound on each durable round trip in milliseconds (must be > 0).
    #[arg(long)]
    durable_timeout_ms: Option<u64>,

    /// Max request body size in bytes (0 disables the limit).
    #[arg(long)]
    http_body_limit_bytes: Option<usize>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
}

fn build_config(args: &Args) -> Result<PizzeriaConfig> {
    let defaults = PizzeriaConfig::default();
    if let Some(0) = args.durable_timeout_ms {
        anyhow::bail!("durable_timeout_ms must be > 0 when set");
    }
    let redis_url = args.redis_url.clone().or_else(|| {
        std::env::var("REDIS_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
    });

    Ok(PizzeriaConfig {
        redis_url,
        redis_prefix: args.redis_prefix.clone(),
        durable_timeout: args
            .durable_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.durable_timeout),
        http_body_limit_bytes: match args.http_body_limit_bytes {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => defaults.http_body_limit_bytes,
        },
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing();

    let config = build_config(&args)?;
    match &config.redis_url {
        Some(_) => info!("durable backend enabled"),
        None => info!("no durable backend configured; serving from in-process store"),
    }

    let pizzeria =
        Arc::new(Pizzeria::new(config).context("failed to initialize player store")?);
    let api = Api::new(pizzeria);
    let app = api.router();

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await.context("axum server error")?;

    Ok(())
}

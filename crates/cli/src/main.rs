use std::{path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use hydrate_engine::{HydrateConfig, Hydrator, SourceContainer, load_config, load_config_from_path};
use tracing::{Subscriber, info};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

mod user;

use user::User;

/// Hydrate a user from the contact and business sources several times,
/// pausing past the cache TTL partway through.
#[derive(Debug, Parser)]
#[command(name = "hydrate", version, about)]
struct Cli {
    /// Path to a JSON config file (defaults to the standard config location).
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the cache entry time-to-live, in milliseconds.
    #[arg(long)]
    ttl_ms: Option<u64>,

    /// Override the background sweep interval, in milliseconds.
    #[arg(long)]
    sweep_interval_ms: Option<u64>,

    /// Number of hydrations to run.
    #[arg(long, default_value_t = 4)]
    rounds: u32,

    /// Pause inserted after this many rounds.
    #[arg(long, default_value_t = 2)]
    pause_after: u32,

    /// Length of the pause, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    pause_ms: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let hydrator = Hydrator::with_config(SourceContainer::with_defaults(), &config.cache).context("failed to start hydrator")?;
    info!(
        ttl_ms = config.cache.ttl_ms,
        sweep_interval_ms = config.cache.sweep_interval_ms,
        rounds = cli.rounds,
        sources = ?hydrator.container().kinds(),
        "hydration walkthrough starting"
    );

    for round in 1..=cli.rounds {
        if round > 1 && round - 1 == cli.pause_after {
            println!("Pausing for {} ms", cli.pause_ms);
            thread::sleep(Duration::from_millis(cli.pause_ms));
        }
        println!("Round {}", round);
        let user: User = hydrator.hydrate().context("failed to hydrate user")?;
        let rendered = user.render().with_context(|| format!("failed to read user in round {}", round))?;
        println!("{}\n", rendered);
    }

    let stats = hydrator.cache().stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        "hydration walkthrough finished"
    );
    hydrator.cache().shutdown();
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = subscriber_for(&filter).try_init();
}

fn subscriber_for(filter: &str) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(filter)).finish()
}

fn resolve_config(cli: &Cli) -> Result<HydrateConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path).with_context(|| format!("failed to load config from {}", path.display()))?,
        None => load_config().context("failed to load config")?,
    };
    if let Some(ttl_ms) = cli.ttl_ms {
        config.cache.ttl_ms = ttl_ms;
    }
    if let Some(sweep_interval_ms) = cli.sweep_interval_ms {
        config.cache.sweep_interval_ms = sweep_interval_ms;
    }
    config.validate().context("invalid cache settings")?;
    Ok(config)
}

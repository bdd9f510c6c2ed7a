//! connector-factory command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use connector_factory::{get_default_profiles_path, ConnectorRegistry, ProfileStore};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build database connectors from named profiles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Profiles file path (defaults to the platform config directory)
    #[arg(short, long)]
    profiles: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered connectors
    List,
    /// Print the engine URL for a profile, password masked
    Url { profile: String },
    /// Create the engine for a profile and test the connection
    Check { profile: String },
}

fn load_profiles(path: Option<PathBuf>) -> Result<ProfileStore> {
    let path = match path {
        Some(path) => path,
        None => get_default_profiles_path()?,
    };
    ProfileStore::load(&path).with_context(|| format!("loading profiles from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("connector_factory={}", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::List => {
            let registry = ConnectorRegistry::builtin()?;
            for descriptor in registry.descriptors() {
                println!(
                    "{:<12} {:<22} requires: {}",
                    descriptor.name,
                    descriptor.database_type.display_name(),
                    descriptor.required_keys.join(", ")
                );
            }
        }
        Command::Url { profile } => {
            let store = load_profiles(args.profiles)?;
            let connector = store.get(&profile)?.build()?;
            let engine = connector
                .create_connection()
                .with_context(|| format!("creating connection for profile '{}'", profile))?;
            println!("{}", engine.redacted_url());
        }
        Command::Check { profile } => {
            let store = load_profiles(args.profiles)?;
            let connector = store.get(&profile)?.build()?;
            let engine = connector
                .create_connection()
                .with_context(|| format!("creating connection for profile '{}'", profile))?;

            info!("Testing {} ({})", profile, engine.redacted_url());
            let alive = engine
                .test_connection()
                .await
                .with_context(|| format!("testing connection for profile '{}'", profile))?;
            if !alive {
                anyhow::bail!("{}: server did not answer the test query", profile);
            }
            println!("{}: ok", profile);
        }
    }

    Ok(())
}

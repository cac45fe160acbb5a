use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zenclass::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "zenclass",
    version,
    about = "Zen Class reporting API over learners, mentors, attendance, tasks and drives",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the reporting API (default)
    Serve {
        /// Host address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve from an empty in-memory store instead of MongoDB
        #[arg(long, default_value = "false")]
        memory: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.set_log_format(format)?;
    }

    setup_tracing(&config, cli.verbose)?;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        memory: false,
    }) {
        Commands::Serve { host, port, memory } => {
            tracing::info!(
                host = ?host,
                port = ?port,
                memory = %memory,
                "Starting serve command"
            );
            commands::serve(config, host, port, memory).await?;
        }

        Commands::Config => {
            commands::show_config(&config)?;
        }
    }

    Ok(())
}

fn setup_tracing(config: &Config, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("zenclass=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(format!("zenclass={},warn", config.logging.level))
        })
    };

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

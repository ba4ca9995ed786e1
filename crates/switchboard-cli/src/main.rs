//! switchboard - route a prompt through the provider fallback chain
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use switchboard_core::ProviderId;
use switchboard_runtime::{FallbackRouter, RouterConfig};

mod commands;

/// switchboard - multi-provider text generation with fallback
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a YAML router configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error); defaults to RUST_LOG, then warn
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a response, falling back across providers
    Ask {
        /// The user's message
        message: String,

        /// Domain tag selecting the prompt template
        #[arg(short, long, default_value = "dialogue")]
        domain: String,

        /// Provider to try first (openai, anthropic, google, huggingface)
        #[arg(short, long)]
        prefer: Option<ProviderId>,

        /// Include the per-provider attempt log
        #[arg(long)]
        trace: bool,
    },

    /// Print the prompt that would be sent, without calling anything
    Prompt {
        /// The user's message
        message: String,

        /// Domain tag selecting the prompt template
        #[arg(short, long, default_value = "dialogue")]
        domain: String,
    },

    /// List registered providers and the resulting try-order
    Providers {
        /// Provider to try first
        #[arg(short, long)]
        prefer: Option<ProviderId>,
    },
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<RouterConfig> {
    match path {
        Some(path) => RouterConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(RouterConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Ask {
            message,
            domain,
            prefer,
            trace,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let router = FallbackRouter::from_config(&config);
            let reply = commands::ask(&router, &message, &domain, prefer, trace).await;
            commands::print_json(&reply)?;
        }
        Commands::Prompt { message, domain } => {
            let message = commands::validate_message(&message)?;
            println!("{}", commands::prompt(message, &domain));
        }
        Commands::Providers { prefer } => {
            let config = load_config(cli.config.as_ref())?;
            let router = FallbackRouter::from_config(&config);
            commands::print_json(&commands::providers(&router, prefer))?;
        }
    }

    Ok(())
}

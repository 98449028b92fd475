use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendcast::announcer::Announcer;
use trendcast::config::Config;

#[derive(Parser)]
#[command(
    name = "trendcast",
    version,
    about = "Announces trending repositories on a fixed schedule",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file (environment variables otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the announcement loop
    Run {
        /// Log composed messages instead of publishing them
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// Run a single discovery attempt and print the composed message
    Discover,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    match cli.command {
        Commands::Run { dry_run } => run(config, dry_run).await,
        Commands::Discover => discover(config).await,
    }
}

/// Start the scheduler and dispatch loop, stopping on Ctrl-C
async fn run(config: Config, dry_run: bool) -> Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dry_run,
        "trendcast starting, lets find some trending projects"
    );

    let announcer = Arc::new(Announcer::from_config(&config, dry_run).await?);

    {
        let announcer = Arc::clone(&announcer);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received");
                announcer.stop();
            }
        });
    }

    announcer.run().await?;

    tracing::info!("trendcast shut down cleanly, see you next time");
    Ok(())
}

/// One-shot preview: discover and compose, but never publish or record
async fn discover(config: Config) -> Result<()> {
    let announcer = Announcer::from_config(&config, true).await?;
    let message = announcer.attempt_once().await;

    if message.has_subject() {
        tracing::info!(
            project = %message.subject_name,
            chars = message.char_len(),
            "composed announcement"
        );
        println!("{}", message.body);
    } else {
        tracing::warn!("no unannounced trending project found");
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "trendcast=debug"
    } else {
        "trendcast=info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    Ok(())
}

use anyhow::Result;
use clap::Parser;
use rag_desk::{
    cli::{self, Cli},
    config::{self, LogFormat},
};
use tracing::{debug, error};

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Load configuration first (before logging setup)
    let mut config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };
    args.apply(&mut config);
    if let Err(e) = config::validate(&config) {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    // Environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.logs.level.clone());
    if let Err(e) = validate_log_level(&log_level) {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    // Logs go to stderr; stdout only carries answers.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.logs.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.compact().init(),
    }

    debug!("Configuration loaded: {:?}", config.api);

    if let Err(e) = cli::run(args.command, config).await {
        error!(kind = e.kind(), "Command failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    Ok(())
}

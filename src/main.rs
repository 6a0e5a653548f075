// Examgen - Randomized exam generation and timed sharing
// Copyright (c) 2025 Examgen Contributors
// Licensed under the MIT License

use examgen::cli::{Cli, Commands};
use examgen::config::{load_config, ExamGenConfig, LoggingConfig};
use examgen::logging::{init_logging, LoggingGuard};
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Optional .env with EXAMGEN_ACCESS_TOKEN and overrides
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Run commands need the config before logging so file logging can be set up
    let config = if cli.command.needs_config() {
        match load_config(&cli.config) {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("❌ {e}");
                process::exit(2);
            }
        }
    } else {
        None
    };

    let guard = match start_logging(&cli, config.as_ref()) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "examgen - Randomized exam generation and timed sharing"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown...");
                }
            }
            println!("\n⚠️  Shutdown signal received, stopping the clock...");
            let _ = shutdown_tx.send(true);
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
                println!("\n⚠️  Shutdown signal received, stopping the clock...");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let exit_code = match execute_command(&cli, config, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Console logging always; JSON file logging when the loaded config enables it
fn start_logging(
    cli: &Cli,
    config: Option<&ExamGenConfig>,
) -> examgen::domain::Result<LoggingGuard> {
    let console_only = LoggingConfig::default();
    let (level, logging) = match config {
        Some(c) => (
            cli.log_level
                .as_deref()
                .unwrap_or(c.application.log_level.as_str()),
            &c.logging,
        ),
        None => (cli.log_level.as_deref().unwrap_or("info"), &console_only),
    };
    init_logging(level, logging)
}

/// Execute the CLI command
async fn execute_command(
    cli: &Cli,
    config: Option<ExamGenConfig>,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    let loaded = || config.ok_or_else(|| anyhow::anyhow!("configuration not loaded"));
    match &cli.command {
        Commands::Generate(args) => args.execute(loaded()?, shutdown_signal).await,
        Commands::Share(args) => args.execute(loaded()?, shutdown_signal).await,
        Commands::Unshare(args) => args.execute(loaded()?, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}

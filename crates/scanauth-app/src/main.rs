// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanauth — submit a folder of ID scan artifacts for document authentication.
//
// Entry point. Initialises logging, loads configuration, starts the
// authentication service and runs one folder through it.

mod report;
mod services;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use scanauth_core::AppConfig;
use scanauth_core::config::{ClassificationStrategy, MissingFolderPolicy};
use scanauth_core::error::Result;
use scanauth_core::human_errors::humanize_error;

use services::config_store::{load_config, persist_config};
use services::data_dir;
use services::session::AuthSession;

#[derive(Parser, Debug)]
#[command(
    name = "scanauth",
    version,
    about = "Authenticate an ID document from a folder of scan artifacts"
)]
struct Args {
    /// Folder holding the scan set (defaults to the configured folder)
    folder: Option<PathBuf>,

    /// Filename classification strategy: pattern-substring or prefix-token
    #[arg(long)]
    strategy: Option<ClassificationStrategy>,

    /// Fail instead of submitting an empty request when the folder is missing
    #[arg(long)]
    strict: bool,

    /// Configuration file (defaults to <data dir>/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for host logs and the report log
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Location of the authentication host binaries
    #[arg(long)]
    host_dir: Option<PathBuf>,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    pause: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    println!("Usage: scanauth [folder]");
    println!();

    let code = match run(&args).await {
        Ok(()) => {
            println!("Completed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "authentication run failed");
            eprintln!("{}", humanize_error(&e));
            ExitCode::FAILURE
        }
    };

    if args.pause {
        println!("Press \"Enter\" to close scanauth");
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    }

    code
}

async fn run(args: &Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(data_dir::config_path);
    let config = apply_overrides(load_config(&config_path), args);

    if args.save_config {
        persist_config(&config_path, &config)?;
        tracing::info!(path = %config_path.display(), "configuration saved");
    }

    let log_dir = config.log_directory.clone().unwrap_or_else(data_dir::log_dir);

    println!("CreateService started");
    let started = Instant::now();
    let session = AuthSession::create(&config, &log_dir).await?;
    println!("CreateService completed in {} ms", started.elapsed().as_millis());
    println!("HostVersion: {}", session.host_version().await?);

    let folder = args.folder.clone().unwrap_or_else(|| config.default_folder.clone());
    session.authenticate(&folder).await?;
    Ok(())
}

/// Command-line flags win over the configuration file.
fn apply_overrides(mut config: AppConfig, args: &Args) -> AppConfig {
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if args.strict {
        config.missing_folder = MissingFolderPolicy::Error;
    }
    if let Some(dir) = &args.log_dir {
        config.log_directory = Some(dir.clone());
    }
    if let Some(dir) = &args.host_dir {
        config.host_directory = Some(dir.clone());
    }
    config
}

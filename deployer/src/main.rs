//! Nomad Deployer - Entry Point
//!
//! Listens for container registry notifications and redeploys the Nomad jobs
//! that run the pushed image.

use std::collections::HashMap;
use std::env;

use deployer::app::cli::CliArgs;
use deployer::app::options::AppOptions;
use deployer::app::run::run;
use deployer::logs::{init_logging, LogOptions};
use deployer::storage::settings::{default_search_dirs, resolve_settings, SettingsSource};
use deployer::utils::version_info;

use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli_args = CliArgs::parse(env::args().skip(1));

    // Print version and exit
    let version = version_info();
    if cli_args.contains("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Unable to print version: {e}"),
        }
        return;
    }

    // Logging is not configured until every settings layer is read
    let env_vars: HashMap<String, String> = env::vars().collect();
    let (settings, source) = match resolve_settings(
        cli_args.config_path().as_deref(),
        &env_vars,
        &cli_args.values,
        &default_search_dirs(),
    )
    .await
    {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Unable to load settings: {e}");
            std::process::exit(1);
        }
    };

    let log_options = LogOptions {
        log_level: settings.log_level(),
        format: settings.log.format,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match &source {
        SettingsSource::File(path) => info!("Loaded settings from {}", path.display()),
        SettingsSource::Defaults => warn!("No config file found, using defaults"),
    }

    info!(
        build = %version.git_hash,
        version = %version.version,
        "Nomad Deployer is starting..."
    );

    let options = AppOptions::from(&settings);
    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("Nomad Deployer failed: {e}");
        std::process::exit(1);
    }

    info!("Nomad Deployer stopped");
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    warn!("Unable to install signal handlers, falling back to Ctrl+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
        }
        info!("Ctrl+C received, shutting down...");
    }
}

// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Casebook - customer support cases with polling chat.
//!
//! This is the binary entry point.

mod bootstrap;
mod serve;
mod shutdown;

use std::path::PathBuf;

use casebook_config::model::CasebookConfig;
use clap::{Parser, Subcommand};

/// Casebook - customer support cases with polling chat.
#[derive(Parser, Debug)]
#[command(name = "casebook", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP service.
    Serve,
    /// Create the first admin account.
    BootstrapAdmin {
        /// Login name of the admin.
        #[arg(long)]
        user_name: String,
        /// Contact address of the admin.
        #[arg(long)]
        email: Option<String>,
    },
    /// Load and validate configuration, then exit.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> CasebookConfig {
    let loaded = match path {
        Some(path) => casebook_config::load_and_validate_path(path),
        None => casebook_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            casebook_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("casebook={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => {
            init_tracing(&config.service.log_level);
            serve::run_serve(config).await
        }
        Some(Commands::BootstrapAdmin { user_name, email }) => {
            init_tracing(&config.service.log_level);
            match bootstrap::get_admin_password() {
                Ok(password) => {
                    bootstrap::run_bootstrap_admin(config, &user_name, email.as_deref(), password)
                        .await
                }
                Err(e) => Err(e),
            }
        }
        Some(Commands::CheckConfig) => {
            println!(
                "casebook: config ok (service.name={}, server={}:{})",
                config.service.name, config.server.host, config.server.port
            );
            Ok(())
        }
        None => {
            println!("casebook: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

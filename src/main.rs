//! Unified henu-rs CLI.
//!
//! This binary provides a unified interface to all henu components:
//! - `henu-rs server` - Run the download and application API
//! - `henu-rs admin` - Manage download accounts (SQL backend)
//! - `henu-rs applications` - Review team applications (SQL backend)
//!
//! `server` and `admin` can also be run as standalone binaries.

mod applications;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// henu-rs unified CLI.
#[derive(Parser)]
#[command(
    name = "henu-rs",
    version,
    about = "Download entitlement and community services for HENU OS",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    #[command(name = "server", alias = "serve")]
    Server(Box<henu_server::ServerArgs>),

    /// Manage download accounts (SQL backend).
    #[command(name = "admin")]
    Admin(henu_entitlement::AdminArgs),

    /// Review team applications (SQL backend).
    #[command(name = "applications", alias = "apps")]
    Applications(applications::ApplicationsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Server(args) => henu_server::cli::run(*args).await,
        Commands::Admin(args) => henu_entitlement::cli::run(args).await,
        Commands::Applications(args) => applications::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

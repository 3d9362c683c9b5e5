//! Libris - library backend from the command line
//!
//! Main entry point for the Libris CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Style;
use libris_config::Environment;

mod commands;
mod ui;

use commands::{admin, auth, books, borrows};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Libris - browse, borrow and manage the library from the terminal
#[derive(Parser)]
#[command(name = "libris")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Backend environment: dev or prod (default: $LIBRIS_ENV, then client.yaml, then dev)
    #[arg(long, global = true)]
    pub env: Option<Environment>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in, log out, show the current session
    Auth(auth::AuthArgs),

    /// Browse and add books
    Books(books::BooksArgs),

    /// Borrow and return books
    Borrows(borrows::BorrowsArgs),

    /// Administrative console
    Admin(admin::AdminArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "libris=debug,libris_client=debug,libris_config=debug,info"
    } else {
        "libris=info,libris_client=error,warn"
    };

    let file_appender = tracing_appender::rolling::daily(libris_config::log_dir(), "libris.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "libris=trace,libris_client=trace,libris_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        env: cli.env,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Books(args) => books::run(args, &ctx).await,
        Commands::Borrows(args) => borrows::run(args, &ctx).await,
        Commands::Admin(args) => admin::run(args, &ctx).await,
    };

    if let Err(e) = result {
        // The client has already shown its own failures through the UI hooks.
        if !ui::already_reported(&e) {
            let red = Style::new().red();
            eprintln!("{} {:#}", red.apply_to("Error:"), e);
        }
        drop(_guard);
        std::process::exit(1);
    }

    Ok(())
}

//! Tally CLI - Personal finance tracker with receipt scanning
//!
//! Usage:
//!   tally init                          Initialize database
//!   tally serve --port 5000             Start web server
//!   tally users add -u NAME -e EMAIL    Create an account
//!   tally receipt scan FILE             OCR a receipt and guess its fields

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Serve {
            port,
            host,
            uploads_dir,
            static_dir,
            client_url,
            insecure_cookies,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                commands::ServeOptions {
                    uploads_dir,
                    static_dir,
                    client_url,
                    insecure_cookies,
                },
            )
            .await
        }
        Commands::Users { action } => match action {
            None | Some(UsersAction::List) => commands::cmd_users_list(&cli.db),
            Some(UsersAction::Add {
                username,
                email,
                password,
            }) => commands::cmd_users_add(&cli.db, &username, &email, &password),
        },
        Commands::Transactions { email, from, to } => {
            commands::cmd_transactions(&cli.db, &email, from.as_deref(), to.as_deref())
        }
        Commands::Stats { email } => commands::cmd_stats(&cli.db, &email),
        Commands::Categories { category_type } => {
            commands::cmd_categories(&cli.db, category_type.as_deref())
        }
        Commands::Receipt { action } => match action {
            ReceiptAction::Scan { file, json } => commands::cmd_receipt_scan(&file, json).await,
            ReceiptAction::Interpret { file, json } => {
                commands::cmd_receipt_interpret(&file, json)
            }
            ReceiptAction::Statement { file, json } => {
                commands::cmd_receipt_statement(&file, json).await
            }
        },
    }
}

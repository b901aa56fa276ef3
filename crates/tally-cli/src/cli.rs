//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track income, expenses and receipts
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal finance tracker with receipt scanning", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed default categories
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory for uploaded receipts
        #[arg(long, default_value = "uploads")]
        uploads_dir: PathBuf,

        /// Directory with the built front-end to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Front-end origin allowed by CORS (falls back to CLIENT_URL)
        #[arg(long)]
        client_url: Option<String>,

        /// Send session cookies without the Secure flag (plain HTTP development)
        #[arg(long)]
        insecure_cookies: bool,
    },

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// List a user's transactions
    Transactions {
        /// Email of the user
        #[arg(short, long)]
        email: String,

        /// Start date (YYYY-MM-DD), used together with --to
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), used together with --from
        #[arg(long)]
        to: Option<String>,
    },

    /// Show category and monthly totals for a user
    Stats {
        /// Email of the user
        #[arg(short, long)]
        email: String,
    },

    /// List categories
    Categories {
        /// Only categories of this type (income or expense)
        #[arg(short = 't', long = "type")]
        category_type: Option<String>,
    },

    /// Receipt and statement tools
    Receipt {
        #[command(subcommand)]
        action: ReceiptAction,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users
    List,

    /// Create a user
    Add {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
pub enum ReceiptAction {
    /// Extract text from an image or PDF receipt and interpret it
    Scan {
        /// Receipt file (png, jpg, pdf, ...)
        file: PathBuf,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Interpret receipt text from a plain-text file ("-" for stdin)
    Interpret {
        file: PathBuf,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Find candidate transactions in a bank statement (PDF, image or text)
    Statement {
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

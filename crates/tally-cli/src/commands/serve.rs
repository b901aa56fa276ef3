//! Server command implementation

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::open_db;

const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";

/// Options for `tally serve` beyond host and port
#[derive(Debug, Default)]
pub struct ServeOptions {
    pub uploads_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub client_url: Option<String>,
    pub insecure_cookies: bool,
}

/// CORS origin: the flag, else CLIENT_URL, else the dev front-end
pub fn resolve_client_url(flag: Option<&str>, env: Option<&str>) -> String {
    flag.or(env)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CLIENT_URL)
        .trim_end_matches('/')
        .to_string()
}

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16, options: ServeOptions) -> Result<()> {
    let client_url = resolve_client_url(
        options.client_url.as_deref(),
        std::env::var("CLIENT_URL").ok().as_deref(),
    );
    let session_secret = std::env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty());

    println!("🚀 Starting Tally web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Uploads: {}", options.uploads_dir.display());
    println!("   Client origin: {}", client_url);
    if let Some(dir) = &options.static_dir {
        println!("   Static files: {}", dir.display());
    }
    if session_secret.is_none() {
        println!("   ⚠️  SESSION_SECRET not set - sessions use a development key");
    }
    if options.insecure_cookies {
        println!("   ⚠️  Cookies sent without Secure flag (--insecure-cookies)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let config = tally_server::ServerConfig {
        allowed_origins: vec![client_url],
        session_secret,
        secure_cookies: !options.insecure_cookies,
        uploads_dir: options.uploads_dir,
        ..Default::default()
    };

    let static_dir = options
        .static_dir
        .as_deref()
        .map(|p| p.to_str().context("Static directory path must be valid UTF-8"))
        .transpose()?;

    tally_server::serve_with_config(db, host, port, static_dir, config).await
}

//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::{load_engine, open_db};

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting Hearth web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}/api", host, port);

    // Comma-separated API keys
    let api_keys = hearth_server::parse_api_keys(
        &std::env::var(hearth_server::API_KEYS_ENV).unwrap_or_default(),
    );

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        anyhow::bail!(
            "No API keys configured. Set {} or use --no-auth for local development",
            hearth_server::API_KEYS_ENV
        );
    } else {
        println!(
            "   🔑 API keys: {} configured ({})",
            api_keys.len(),
            hearth_server::API_KEYS_ENV
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;
    let engine = load_engine()?;

    let config = hearth_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
    };

    hearth_server::serve_with_config(db, engine, host, port, config).await?;

    Ok(())
}

//! Lists every secret in a Key Vault, one `name = value` line per secret.
//!
//! Requires `AZURE_KEYVAULT_URL`, `AZURE_CLIENT_ID` and
//! `AZURE_CLIENT_SECRET`. In debug builds the process prints its pid and
//! waits for Enter before any network call, so a trace listener can be
//! attached first.

use anyhow::{Context, Result};
use keyvault_secret_listing::{AppConfig, ClientCredentialProvider, KeyVaultClient, Tracer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env()?;

    pause_for_trace_listener()?;

    let tracer = Tracer::new();
    let provider =
        ClientCredentialProvider::new(&config.client_id, &config.client_secret, tracer.clone());
    let client = KeyVaultClient::new(
        &config.vault_url,
        config.authority(),
        Arc::new(provider),
        tracer,
    )?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    client
        .write_secret_listing(&mut out)
        .await
        .with_context(|| format!("Failed to list secrets from {}", config.vault_url))?;

    Ok(())
}

/// Startup hook for attaching an external trace listener. Compiled to a
/// no-op in release builds.
#[cfg(debug_assertions)]
fn pause_for_trace_listener() -> Result<()> {
    use std::io::{BufRead, Write};

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(
        out,
        "Attach trace listener to process {} and press Enter to continue...",
        std::process::id()
    )?;
    out.flush()?;

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(())
}

#[cfg(not(debug_assertions))]
fn pause_for_trace_listener() -> Result<()> {
    Ok(())
}

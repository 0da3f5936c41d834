//! Traced enumeration of Azure Key Vault secrets.
//!
//! This crate wraps the Key Vault REST API for one workflow: authenticate
//! with a service principal and walk every secret in a vault, page by
//! page. Authentication is pluggable through [`TokenProvider`] and every
//! outbound call is surrounded by structured enter/exit trace events, so
//! authentication problems can be diagnosed from an attached log listener.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use keyvault_secret_listing::{AppConfig, ClientCredentialProvider, KeyVaultClient, Tracer};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let tracer = Tracer::new();
//! let provider = ClientCredentialProvider::new(&config.client_id, &config.client_secret, tracer.clone());
//! let client = KeyVaultClient::new(&config.vault_url, config.authority(), Arc::new(provider), tracer)?;
//!
//! let mut stdout = std::io::stdout();
//! client.write_secret_listing(&mut stdout).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod secret;
pub mod trace;

pub use auth::{ClientCredentialProvider, TokenProvider};
pub use client::KeyVaultClient;
pub use config::AppConfig;
pub use error::KeyVaultError;
pub use secret::{SecretBundle, SecretItem, SecretsPage};
pub use trace::{Invocation, Tracer};

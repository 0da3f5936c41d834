//! Environment-driven configuration.
//!
//! The three vault/credential values are required and checked before any
//! network activity. The authority pieces are optional with public-cloud
//! defaults, since most service principals authenticate against
//! `login.microsoftonline.com`.

use crate::KeyVaultError;

const ENV_VAULT_URL: &str = "AZURE_KEYVAULT_URL";
const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
const ENV_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";

const DEFAULT_TENANT: &str = "common";
const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URI of the target vault, e.g. `https://example.vault.azure.net`.
    pub vault_url: String,
    /// Service principal identifier.
    pub client_id: String,
    /// Service principal secret.
    pub client_secret: String,
    /// AAD tenant the principal lives in.
    pub tenant_id: String,
    /// Identity service host, overridable for sovereign clouds.
    pub authority_host: String,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    /// Fails with the first missing required variable.
    pub fn from_env() -> Result<Self, KeyVaultError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(get: F) -> Result<Self, KeyVaultError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            vault_url: required(&get, ENV_VAULT_URL)?,
            client_id: required(&get, ENV_CLIENT_ID)?,
            client_secret: required(&get, ENV_CLIENT_SECRET)?,
            tenant_id: get(ENV_TENANT_ID).unwrap_or_else(|| DEFAULT_TENANT.to_owned()),
            authority_host: get(ENV_AUTHORITY_HOST)
                .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_owned()),
        })
    }

    /// The OAuth2 authority URL the credential provider authenticates against.
    pub fn authority(&self) -> String {
        format!(
            "{}/{}",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

fn required<F>(get: &F, name: &'static str) -> Result<String, KeyVaultError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(KeyVaultError::MissingConfig(name)),
    }
}

use crate::KeyVaultClient;
use crate::KeyVaultError;
use chrono::serde::{ts_seconds, ts_seconds_option};
use chrono::{DateTime, Utc};
use getset::Getters;
use serde::Deserialize;
use std::io::Write;
use url::Url;

const API_VERSION: &str = "7.0";

/// Lightweight reference to a secret, as returned by listing.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct SecretItem {
    id: String,
    name: String,
}

#[derive(Deserialize, Debug)]
struct SecretItemRaw {
    id: String,
}

#[derive(Deserialize, Debug)]
struct ListSecretsResponse {
    value: Vec<SecretItemRaw>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

/// One page of secret references plus the opaque continuation link.
/// A `None` link signals the end of the sequence.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct SecretsPage {
    items: Vec<SecretItem>,
    next_link: Option<String>,
}

/// Full secret record, fetched per item.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct SecretBundle {
    id: String,
    value: String,
    enabled: bool,
    expires: Option<DateTime<Utc>>,
    time_created: DateTime<Utc>,
    time_updated: DateTime<Utc>,
}

#[derive(Deserialize, Debug)]
struct GetSecretResponse {
    value: String,
    id: String,
    attributes: GetSecretResponseAttributes,
}

#[derive(Deserialize, Debug)]
struct GetSecretResponseAttributes {
    enabled: bool,
    #[serde(default, rename = "exp", with = "ts_seconds_option")]
    expires: Option<DateTime<Utc>>,
    #[serde(with = "ts_seconds")]
    created: DateTime<Utc>,
    #[serde(with = "ts_seconds")]
    updated: DateTime<Utc>,
}

impl KeyVaultClient {
    /// Fetches the first page of secret references from the vault.
    pub async fn list_secrets(&self) -> Result<SecretsPage, KeyVaultError> {
        let uri = Url::parse_with_params(
            &format!("{}/secrets", self.vault_url.as_str().trim_end_matches('/')),
            &[("api-version", API_VERSION)],
        )?;
        self.fetch_page(uri.as_str()).await
    }

    /// Fetches the page identified by a continuation link from a previous
    /// page. The link is issued by the service and followed verbatim.
    pub async fn list_secrets_next(&self, next_link: &str) -> Result<SecretsPage, KeyVaultError> {
        self.fetch_page(next_link).await
    }

    async fn fetch_page(&self, uri: &str) -> Result<SecretsPage, KeyVaultError> {
        let resp_body = self.get_authed(uri).await?;
        let response = serde_json::from_str::<ListSecretsResponse>(&resp_body)?;

        Ok(SecretsPage {
            items: response
                .value
                .into_iter()
                .map(|s| SecretItem {
                    name: s.id.rsplit('/').next().unwrap_or_default().to_owned(),
                    id: s.id,
                })
                .collect(),
            next_link: response.next_link,
        })
    }

    /// Fetches the current value of the secret referenced by `id` (the
    /// identifier URI returned in a listing page).
    pub async fn get_secret_by_id(&self, id: &str) -> Result<SecretBundle, KeyVaultError> {
        let uri = Url::parse_with_params(id, &[("api-version", API_VERSION)])?;
        let resp_body = self.get_authed(uri.as_str()).await?;
        let response = serde_json::from_str::<GetSecretResponse>(&resp_body)?;
        Ok(SecretBundle {
            id: response.id,
            value: response.value,
            enabled: response.attributes.enabled,
            expires: response.attributes.expires,
            time_created: response.attributes.created,
            time_updated: response.attributes.updated,
        })
    }

    /// Walks every listing page in service order, fetches each referenced
    /// secret and writes one `name = value` line per secret, in page order
    /// then in-page order. Fetches are strictly sequential; the first
    /// failure aborts the walk. Returns the number of lines written.
    pub async fn write_secret_listing<W: Write>(&self, out: &mut W) -> Result<usize, KeyVaultError> {
        let mut written = 0;
        let mut page = self.list_secrets().await?;
        loop {
            for item in page.items() {
                let bundle = self.get_secret_by_id(item.id()).await?;
                writeln!(out, "{} = {}", item.name(), bundle.value())?;
                written += 1;
            }
            match page.next_link().clone() {
                Some(link) => page = self.list_secrets_next(&link).await?,
                None => break,
            }
        }
        Ok(written)
    }
}

//! Bearer-token acquisition for Key Vault calls.
//!
//! The client never authenticates by itself; it is handed a
//! [`TokenProvider`] at construction time. The production implementation
//! performs a client-credentials grant against Azure Active Directory and
//! deliberately skips token caching so every authentication attempt is
//! independently traceable.

use crate::{KeyVaultError, Tracer};
use anyhow::Context;
use async_trait::async_trait;
use azure_sdk_auth_aad::authorize_non_interactive;
use oauth2::{AccessToken, ClientId, ClientSecret};
use std::sync::Arc;
use url::Url;

/// Source of bearer tokens for outbound vault calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token authorizing calls to `resource`, issued by the
    /// identity service at `authority`.
    async fn get_token(
        &self,
        authority: &str,
        resource: &str,
        scope: Option<&str>,
    ) -> Result<AccessToken, KeyVaultError>;
}

/// Client-credentials grant with a fixed service principal.
pub struct ClientCredentialProvider {
    client_id: ClientId,
    client_secret: ClientSecret,
    http: Arc<reqwest::Client>,
    tracer: Tracer,
}

impl ClientCredentialProvider {
    pub fn new(client_id: &str, client_secret: &str, tracer: Tracer) -> Self {
        Self {
            client_id: ClientId::new(client_id.to_owned()),
            client_secret: ClientSecret::new(client_secret.to_owned()),
            http: Arc::new(reqwest::Client::new()),
            tracer,
        }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialProvider {
    async fn get_token(
        &self,
        authority: &str,
        resource: &str,
        scope: Option<&str>,
    ) -> Result<AccessToken, KeyVaultError> {
        let invocation = self.tracer.enter(
            "Authenticate",
            &[
                ("authority", authority),
                ("resource", resource),
                ("scope", scope.unwrap_or("")),
            ],
        );

        let tenant = tenant_from_authority(authority)?;
        self.tracer
            .information(&format!("Authenticating client: {}", self.client_id.as_str()));

        let login = authorize_non_interactive(
            Arc::clone(&self.http),
            &self.client_id,
            &self.client_secret,
            resource,
            &tenant,
        )
        .await
        .with_context(|| "Failed to authenticate to Azure Active Directory")
        .map_err(KeyVaultError::Authorization)?;

        let token = login.access_token().clone();
        self.tracer.exit(&invocation, &redact_token(token.secret()));
        Ok(token)
    }
}

/// The tenant is the last path segment of the authority URL, e.g.
/// `https://login.microsoftonline.com/{tenant}`.
fn tenant_from_authority(authority: &str) -> Result<String, KeyVaultError> {
    let url = Url::parse(authority)?;
    url.path_segments()
        .and_then(|segments| {
            segments
                .filter(|segment| !segment.is_empty())
                .last()
                .map(ToOwned::to_owned)
        })
        .ok_or_else(|| {
            KeyVaultError::InvalidConfig(format!("authority {} carries no tenant segment", authority))
        })
}

/// Keeps at most the first eight characters of a token for log output.
/// Tokens that short are redacted entirely rather than echoed back.
fn redact_token(token: &str) -> String {
    match token.get(..8) {
        Some(prefix) if token.len() > 8 => format!("{}...", prefix),
        _ => "...".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_is_last_authority_segment() {
        let tenant =
            tenant_from_authority("https://login.microsoftonline.com/contoso-tenant").unwrap();
        assert_eq!(tenant, "contoso-tenant");
    }

    #[test]
    fn tenant_survives_trailing_slash() {
        let tenant = tenant_from_authority("https://login.microsoftonline.com/contoso/").unwrap();
        assert_eq!(tenant, "contoso");
    }

    #[test]
    fn authority_without_tenant_is_rejected() {
        let result = tenant_from_authority("https://login.microsoftonline.com");
        assert!(matches!(result, Err(KeyVaultError::InvalidConfig(_))));
    }

    #[test]
    fn long_tokens_keep_an_eight_char_prefix() {
        assert_eq!(redact_token("eyJ0eXAiOiJKV1QifQ"), "eyJ0eXAi...");
    }

    #[test]
    fn short_tokens_are_fully_redacted() {
        assert_eq!(redact_token("abc"), "...");
        assert_eq!(redact_token("exactly8"), "...");
        assert_eq!(redact_token(""), "...");
    }
}

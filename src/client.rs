use crate::auth::TokenProvider;
use crate::{KeyVaultError, Tracer};
use std::sync::Arc;
use url::Url;

/// Resource identifier the bearer token must be scoped to.
pub(crate) const VAULT_RESOURCE: &str = "https://vault.azure.net";

/// Client for Key Vault operations - listing secrets, fetching a secret's
/// value, etc. Authentication is delegated to the injected
/// [`TokenProvider`]; a fresh token is requested for every call.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use keyvault_secret_listing::{ClientCredentialProvider, KeyVaultClient, Tracer};
///
/// let tracer = Tracer::new();
/// let provider = ClientCredentialProvider::new("{client_id}", "{client_secret}", tracer.clone());
/// let client = KeyVaultClient::new(
///     "https://test-keyvault.vault.azure.net",
///     "https://login.microsoftonline.com/{tenant_id}",
///     Arc::new(provider),
///     tracer,
/// ).unwrap();
/// ```
pub struct KeyVaultClient {
    pub(crate) vault_url: Url,
    pub(crate) authority: String,
    pub(crate) token_provider: Arc<dyn TokenProvider>,
    pub(crate) tracer: Tracer,
    http: reqwest::Client,
}

impl KeyVaultClient {
    /// Creates a new `KeyVaultClient` against the vault at `vault_url`.
    pub fn new(
        vault_url: &str,
        authority: impl Into<String>,
        token_provider: Arc<dyn TokenProvider>,
        tracer: Tracer,
    ) -> Result<Self, KeyVaultError> {
        Ok(Self {
            vault_url: Url::parse(vault_url)?,
            authority: authority.into(),
            token_provider,
            tracer,
            http: reqwest::Client::new(),
        })
    }

    /// Single choke point for outbound calls: re-authenticates, attaches
    /// the bearer header, and traces the round trip.
    pub(crate) async fn get_authed(&self, uri: &str) -> Result<String, KeyVaultError> {
        let token = self
            .token_provider
            .get_token(&self.authority, VAULT_RESOURCE, None)
            .await?;

        let invocation = self
            .tracer
            .enter("SendRequest", &[("method", "GET"), ("uri", uri)]);

        let resp = self
            .http
            .get(uri)
            .header("Authorization", format!("Bearer {}", token.secret()))
            .send()
            .await?;

        let status = resp.status();
        self.tracer.exit(&invocation, status.as_str());

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(KeyVaultError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockito::{mock, Matcher};
    use oauth2::AccessToken;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hands out a fixed token and counts invocations. Shared with the
    /// listing tests in `secret.rs`.
    pub(crate) struct StaticTokenProvider {
        token: String,
        calls: AtomicUsize,
    }

    impl StaticTokenProvider {
        pub(crate) fn new(token: &str) -> Self {
            Self {
                token: token.to_owned(),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenProvider for StaticTokenProvider {
        async fn get_token(
            &self,
            _authority: &str,
            _resource: &str,
            _scope: Option<&str>,
        ) -> Result<AccessToken, KeyVaultError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new(self.token.clone()))
        }
    }

    pub(crate) fn client_for(base: &str, provider: Arc<dyn TokenProvider>) -> KeyVaultClient {
        KeyVaultClient::new(
            base,
            "https://login.microsoftonline.com/test-tenant",
            provider,
            Tracer::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn attaches_bearer_header_from_provider() {
        let base = format!("{}/authed", mockito::server_url());
        let _m = mock("GET", "/authed/ping")
            .match_header("authorization", "Bearer test-token-value")
            .with_body("pong")
            .create();

        let provider = Arc::new(StaticTokenProvider::new("test-token-value"));
        let client = client_for(&base, provider.clone());

        let body = client.get_authed(&format!("{}/ping", base)).await.unwrap();
        assert_eq!(body, "pong");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn reauthenticates_on_every_call() {
        let base = format!("{}/fresh", mockito::server_url());
        let _m = mock("GET", "/fresh/ping")
            .match_query(Matcher::Any)
            .with_body("pong")
            .expect(3)
            .create();

        let provider = Arc::new(StaticTokenProvider::new("test-token-value"));
        let client = client_for(&base, provider.clone());

        for _ in 0..3 {
            client.get_authed(&format!("{}/ping", base)).await.unwrap();
        }
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn non_success_status_becomes_service_error() {
        let base = format!("{}/denied", mockito::server_url());
        let _m = mock("GET", "/denied/ping")
            .with_status(403)
            .with_body("Forbidden")
            .create();

        let provider = Arc::new(StaticTokenProvider::new("test-token-value"));
        let client = client_for(&base, provider);

        let err = client
            .get_authed(&format!("{}/ping", base))
            .await
            .unwrap_err();
        match err {
            KeyVaultError::Service { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Forbidden");
            }
            other => panic!("expected Service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failing_provider_short_circuits_before_http() {
        struct FailingProvider;

        #[async_trait]
        impl TokenProvider for FailingProvider {
            async fn get_token(
                &self,
                _authority: &str,
                _resource: &str,
                _scope: Option<&str>,
            ) -> Result<AccessToken, KeyVaultError> {
                Err(KeyVaultError::Authorization(anyhow::anyhow!(
                    "exchange rejected"
                )))
            }
        }

        let base = format!("{}/never", mockito::server_url());
        let m = mock("GET", "/never/ping").expect(0).create();

        let client = client_for(&base, Arc::new(FailingProvider));
        let err = client
            .get_authed(&format!("{}/ping", base))
            .await
            .unwrap_err();
        assert!(matches!(err, KeyVaultError::Authorization(_)));
        m.assert();
    }
}

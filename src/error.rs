//! Error types for configuration, authorization and Key Vault calls.
//!
//! Nothing here is recoverable: every variant is expected to bubble up to
//! the binary entry point and terminate the process.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyVaultError {
    /// A required environment variable is absent or empty.
    #[error("{0} environment variable not defined")]
    MissingConfig(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Token exchange against the identity service failed.
    #[error("authorization failed: {0}")]
    Authorization(#[source] anyhow::Error),

    /// The vault answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("output write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_names_the_variable() {
        let err = KeyVaultError::MissingConfig("AZURE_KEYVAULT_URL");
        assert_eq!(
            err.to_string(),
            "AZURE_KEYVAULT_URL environment variable not defined"
        );
    }

    #[test]
    fn service_error_carries_status_and_body() {
        let err = KeyVaultError::Service {
            status: 403,
            message: "Forbidden".to_owned(),
        };
        assert_eq!(err.to_string(), "service returned 403: Forbidden");
    }
}

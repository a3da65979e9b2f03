//! Errors raised by collaborator clients.

use thiserror::Error;

/// Result alias for collaborator calls.
pub type IntegrationResult<T> = Result<T, IntegrationError>;

/// Failures of the club's external services.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// Building the shared HTTP client failed.
    #[cfg(feature = "http-integrations")]
    #[error("failed to build collaborator HTTP client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The request never reached the collaborator.
    #[cfg(feature = "http-integrations")]
    #[error("failed to send request to `{url}`")]
    RequestSend {
        /// Endpoint called.
        url: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The collaborator answered with a non-success status.
    #[error("`{url}` answered with status {status}")]
    RequestStatus {
        /// Endpoint called.
        url: String,
        /// HTTP status received.
        status: u16,
    },
    /// The response body did not match the expected contract.
    #[cfg(feature = "http-integrations")]
    #[error("failed to decode response from `{url}`")]
    DecodeResponse {
        /// Endpoint called.
        url: String,
        /// Decoding error.
        #[source]
        source: reqwest::Error,
    },
    /// No endpoint is configured for this collaborator.
    #[error("{0} service is not configured")]
    NotConfigured(&'static str),
}

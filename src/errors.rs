/*!
 * Error types for the chatwatch application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The provider answered, but with nothing usable
    #[error("Provider returned an empty translation")]
    EmptyResponse,

    /// Primary output that does not carry the success marker
    #[error("Response is missing the success marker")]
    MissingMarker,

    /// Provider has no endpoint or key configured
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by a single websocket session
#[derive(Error, Debug)]
pub enum StreamError {
    /// Transport level websocket failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The stream URL could not be used
    #[error("Invalid stream URL: {0}")]
    Url(String),

    /// A header value could not be built from the credentials
    #[error("Invalid header value: {0}")]
    Header(String),

    /// Handshake-time failure
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// The handshake did not finish within the connect timeout
    #[error("Connection timed out after {0} ms")]
    Timeout(u64),
}

/// Errors raised while listing teams and channels over the REST API
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Base URL or credentials missing
    #[error("Discovery not configured: {0}")]
    NotConfigured(String),

    /// Transport failure
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Non-success HTTP status from the server
    #[error("Server responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },

    /// Body was not the expected JSON
    #[error("Failed to parse server response: {0}")]
    ParseError(String),
}

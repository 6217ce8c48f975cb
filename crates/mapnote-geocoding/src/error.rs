//! Geocoding error types.

use thiserror::Error;

/// Errors from a geocoding provider.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// No access token configured
    #[error("geocoding not configured")]
    NotConfigured,

    /// Request could not be built or sent
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Provider message or body excerpt.
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Invalid provider response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Base URL or query could not be turned into a request URL
    #[error("Invalid request URL: {0}")]
    Url(String),
}

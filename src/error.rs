//! Error types for catalog retrieval.

use thiserror::Error;

/// Why a remote catalog could not be used.
///
/// None of these reach the document: the catalog service logs them and falls
/// back to the cache or the bundled catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No catalog URL is configured.
    #[error("remote catalog disabled: no catalog url configured")]
    Disabled,

    /// Transport failure, including timeouts.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("request failed: status {0}")]
    Status(u16),

    /// The body was not a catalog document.
    #[error("malformed catalog document: {0}")]
    Malformed(String),
}

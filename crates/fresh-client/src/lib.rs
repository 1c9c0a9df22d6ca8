//! Reconciliation client for Freshservice-style asset management APIs.
//!
//! This crate converts a declared [`Asset`] into create/read/update/delete calls
//! against the remote `/assets` endpoints, decodes responses back into the
//! canonical resource, resolves asset type names through the bounded
//! `/asset_types` listing, and classifies documented HTTP error statuses into
//! typed [`ApiError`] values. Everything is blocking and stateless between calls.

pub mod asset;
pub mod asset_type;
pub mod client;
pub mod codec;
pub mod config;
pub mod http;
pub mod model;
pub mod status;

#[cfg(test)]
mod testing;

pub use client::FreshClient;
pub use config::ClientConfig;
pub use http::{HttpTransport, Method, ResponseBody};
pub use model::{Asset, AssetType, AssetUpdate};
pub use status::{ApiError, StatusClass};

use thiserror::Error;

/// Password sent alongside the API key in the Basic auth header. The API
/// ignores it but requires one to be present.
pub const BASIC_AUTH_PASSWORD: &str = "X";

/// Page size for the asset type listing. Large enough to cover a whole
/// catalog in a single call.
pub const ASSET_TYPE_PAGE_SIZE: u32 = 600;

#[derive(Debug, Error)]
pub enum FreshError {
    #[error("client config error: {0}")]
    Config(String),
    #[error("HTTP transport error: {0}")]
    Transport(#[from] ureq::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode request body: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid asset: {0}")]
    InvalidAsset(String),
    #[error("asset type {0} not found")]
    AssetTypeNotFound(String),
}

impl FreshError {
    /// The HTTP status behind a classified error, if any.
    pub fn status(&self) -> Option<StatusClass> {
        match self {
            Self::Api(e) => Some(e.class),
            _ => None,
        }
    }

    /// True for a remote 404 and for an asset type lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AssetTypeNotFound(_))
            || self.status() == Some(StatusClass::ResourceNotFound)
    }

    pub fn is_retryable(&self) -> bool {
        self.status().is_some_and(StatusClass::is_retryable)
    }
}

/// The operations a hosting shell may call.
///
/// [`FreshClient`] is the HTTP implementation; shells should depend on this
/// trait so they can be exercised against an in-memory backend.
pub trait AssetBackend: Send + Sync {
    /// Create the asset remotely and return the server's version of it.
    fn create(&self, desired: &Asset) -> Result<Asset, FreshError>;

    /// Fetch an asset by display id.
    fn read(&self, display_id: i64) -> Result<Asset, FreshError>;

    /// Replace the projected fields of an existing asset.
    fn update(&self, desired: &Asset) -> Result<Asset, FreshError>;

    /// Remove an asset. Deleting an absent asset is an error.
    fn delete(&self, display_id: i64) -> Result<(), FreshError>;

    /// Resolve an asset type by exact name.
    fn lookup_asset_type(&self, name: &str) -> Result<AssetType, FreshError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_remote_404_and_lookup_miss() {
        let remote = FreshError::Api(ApiError::new(StatusClass::ResourceNotFound, "GET /x"));
        assert!(remote.is_not_found());
        assert!(FreshError::AssetTypeNotFound("Cloud".to_owned()).is_not_found());

        let denied = FreshError::Api(ApiError::new(StatusClass::AccessDenied, "GET /x"));
        assert!(!denied.is_not_found());
        assert!(!FreshError::InvalidAsset("name".to_owned()).is_not_found());
    }

    #[test]
    fn retryable_only_for_classified_statuses() {
        let limited = FreshError::Api(ApiError::new(StatusClass::RateLimitExceeded, "GET /x"));
        assert!(limited.is_retryable());
        assert!(!FreshError::Config("missing".to_owned()).is_retryable());
    }

    #[test]
    fn lookup_miss_message_carries_name() {
        let err = FreshError::AssetTypeNotFound("VMware VCenter VM".to_owned());
        assert_eq!(err.to_string(), "asset type VMware VCenter VM not found");
    }
}

use crate::{Asset, AssetBackend, AssetType, ClientConfig, FreshError, HttpTransport};

/// Blocking client for the asset API.
///
/// Holds only immutable configuration and the HTTP agent, so a single value
/// can be shared freely between threads. Nothing is cached between calls.
pub struct FreshClient {
    pub(crate) transport: HttpTransport,
}

impl FreshClient {
    /// A [`ClientConfig`] can only exist once validated, so this cannot fail.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            transport: HttpTransport::new(config),
        }
    }

    /// Validate the endpoint and key, then build a client.
    pub fn connect(endpoint: &str, api_key: &str) -> Result<Self, FreshError> {
        Ok(Self::new(&ClientConfig::new(endpoint, api_key)?))
    }

    /// Build a client from `FRESH_ADDRESS` and `FRESH_API_KEY`.
    pub fn from_env() -> Result<Self, FreshError> {
        Ok(Self::new(&ClientConfig::from_env()?))
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }
}

impl AssetBackend for FreshClient {
    fn create(&self, desired: &Asset) -> Result<Asset, FreshError> {
        self.create_asset(desired)
    }

    fn read(&self, display_id: i64) -> Result<Asset, FreshError> {
        self.get_asset(display_id)
    }

    fn update(&self, desired: &Asset) -> Result<Asset, FreshError> {
        self.update_asset(desired)
    }

    fn delete(&self, display_id: i64) -> Result<(), FreshError> {
        self.delete_asset(display_id)
    }

    fn lookup_asset_type(&self, name: &str) -> Result<AssetType, FreshError> {
        self.lookup_by_name(name)
    }
}

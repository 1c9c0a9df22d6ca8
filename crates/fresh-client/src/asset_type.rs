use crate::{codec, AssetType, FreshClient, FreshError, Method, ASSET_TYPE_PAGE_SIZE};

/// First entry whose name equals `name` exactly (case-sensitive), in listing order.
pub fn find_by_name<'a>(asset_types: &'a [AssetType], name: &str) -> Option<&'a AssetType> {
    asset_types.iter().find(|t| t.name == name)
}

impl FreshClient {
    /// `GET /asset_types/?per_page=600`. A single bounded page; there is no
    /// pagination loop.
    pub fn list_asset_types(&self) -> Result<Vec<AssetType>, FreshError> {
        let path = format!("/asset_types/?per_page={ASSET_TYPE_PAGE_SIZE}");
        let response = self.transport.send(Method::Get, &path, None)?;
        codec::decode_asset_type_listing(response.as_bytes())
    }

    /// Resolve an asset type by exact name.
    ///
    /// The API has no filter by name, so this lists the catalog and scans it.
    pub fn lookup_by_name(&self, name: &str) -> Result<AssetType, FreshError> {
        let asset_types = self.list_asset_types()?;
        tracing::debug!("scanning {} asset types for '{name}'", asset_types.len());
        find_by_name(&asset_types, name)
            .cloned()
            .ok_or_else(|| FreshError::AssetTypeNotFound(name.to_owned()))
    }

    /// `GET /asset_types/{id}`.
    pub fn get_asset_type(&self, id: i64) -> Result<AssetType, FreshError> {
        let response = self
            .transport
            .send(Method::Get, &format!("/asset_types/{id}"), None)?;
        codec::decode_asset_type(response.as_bytes())
    }
}

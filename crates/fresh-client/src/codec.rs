//! Conversions between [`Asset`]/[`AssetType`] and their JSON envelopes.

use crate::model::{AssetEnvelope, AssetTypeEnvelope, AssetTypeListing};
use crate::{Asset, AssetType, AssetUpdate, FreshError};

/// Encode the full asset for `POST /assets`.
pub fn encode_for_create(asset: &Asset) -> Result<Vec<u8>, FreshError> {
    serde_json::to_vec(&AssetEnvelope { asset }).map_err(FreshError::Serialization)
}

/// Encode the update projection for `PUT /assets/{display_id}`.
pub fn encode_for_update(asset: &Asset) -> Result<Vec<u8>, FreshError> {
    let projection = AssetUpdate::from(asset);
    serde_json::to_vec(&AssetEnvelope { asset: projection }).map_err(FreshError::Serialization)
}

pub fn decode_asset(body: &[u8]) -> Result<Asset, FreshError> {
    let envelope: AssetEnvelope<Asset> =
        serde_json::from_slice(body).map_err(FreshError::Decode)?;
    Ok(envelope.asset)
}

pub fn decode_asset_type(body: &[u8]) -> Result<AssetType, FreshError> {
    let envelope: AssetTypeEnvelope = serde_json::from_slice(body).map_err(FreshError::Decode)?;
    Ok(envelope.asset_type)
}

/// Decode an asset type listing, preserving server order.
pub fn decode_asset_type_listing(body: &[u8]) -> Result<Vec<AssetType>, FreshError> {
    let listing: AssetTypeListing = serde_json::from_slice(body).map_err(FreshError::Decode)?;
    Ok(listing.asset_types)
}

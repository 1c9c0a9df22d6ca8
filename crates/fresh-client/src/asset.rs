//! Create/read/update/delete of a single asset, addressed by display id.
//!
//! Each operation is one request/response. The asset is either absent or
//! observed remotely; `create` moves it to observed and `delete` back to absent.

use crate::{codec, Asset, FreshClient, FreshError, Method};

/// Checks the fields the API requires on every write.
pub fn validate(asset: &Asset) -> Result<(), FreshError> {
    if asset.name.trim().is_empty() {
        return Err(FreshError::InvalidAsset("name must not be empty".to_owned()));
    }
    if asset.asset_type_id == 0 {
        return Err(FreshError::InvalidAsset(
            "asset_type_id is required".to_owned(),
        ));
    }
    Ok(())
}

fn asset_path(display_id: i64) -> String {
    format!("/assets/{display_id}")
}

impl FreshClient {
    /// `POST /assets`. Returns the server's version, carrying the assigned
    /// `id` and `display_id`.
    pub fn create_asset(&self, desired: &Asset) -> Result<Asset, FreshError> {
        validate(desired)?;
        let body = codec::encode_for_create(desired)?;
        let response = self.transport.send(Method::Post, "/assets", Some(&body))?;
        let created = codec::decode_asset(response.as_bytes())?;
        tracing::info!(
            "created asset '{}' with display id {}",
            created.name,
            created.display_id
        );
        Ok(created)
    }

    /// `GET /assets/{display_id}`. A missing record is a classified 404,
    /// never an empty asset.
    pub fn get_asset(&self, display_id: i64) -> Result<Asset, FreshError> {
        let response = self
            .transport
            .send(Method::Get, &asset_path(display_id), None)?;
        codec::decode_asset(response.as_bytes())
    }

    /// `PUT /assets/{display_id}` with the update projection.
    ///
    /// This is a full replace of the projected fields: an empty optional field
    /// in `desired` is simply not sent. Server-owned fields in the result may
    /// lag; re-read if a fully current record is needed.
    pub fn update_asset(&self, desired: &Asset) -> Result<Asset, FreshError> {
        if desired.display_id == 0 {
            return Err(FreshError::InvalidAsset(
                "display_id is required for update".to_owned(),
            ));
        }
        validate(desired)?;
        let body = codec::encode_for_update(desired)?;
        let response =
            self.transport
                .send(Method::Put, &asset_path(desired.display_id), Some(&body))?;
        let updated = codec::decode_asset(response.as_bytes())?;
        tracing::info!("updated asset {}", desired.display_id);
        Ok(updated)
    }

    /// `DELETE /assets/{display_id}`. Any response body is discarded.
    /// Deleting an already-absent asset returns the remote 404.
    pub fn delete_asset(&self, display_id: i64) -> Result<(), FreshError> {
        self.transport
            .send(Method::Delete, &asset_path(display_id), None)?;
        tracing::info!("deleted asset {display_id}");
        Ok(())
    }
}

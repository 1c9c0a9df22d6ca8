//! Canonical resource types and their wire envelopes.
//!
//! Decoding is lenient in the same way for every field: a missing key and an
//! explicit `null` both become the zero value. A zero value is therefore not
//! proof that the server omitted the field.

use serde::{Deserialize, Deserializer, Serialize};

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &i64) -> bool {
    *v == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(v: &bool) -> bool {
    !*v
}

/// An asset record as the remote service stores it.
///
/// `display_id` is assigned by the server on create and addresses the asset
/// in every later call. `name` and `asset_type_id` are mandatory on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub display_id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub asset_type_id: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub asset_tag: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub created_at: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub assigned_on: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub author_type: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub agent_id: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub department_id: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub group_id: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub location_id: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub user_id: i64,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub end_of_life: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub impact: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub usage_type: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_false")]
    pub discovery_enabled: bool,
}

impl Asset {
    pub fn new(name: impl Into<String>, asset_type_id: i64) -> Self {
        Self {
            name: name.into(),
            asset_type_id,
            ..Self::default()
        }
    }

    /// The write-side view of this asset, without server-owned fields.
    pub fn to_update(&self) -> AssetUpdate {
        AssetUpdate::from(self)
    }
}

/// Fields of an [`Asset`] the API accepts on `PUT /assets/{display_id}`.
///
/// Server-owned fields (`id`, `display_id`, timestamps, `author_type`,
/// `agent_id`) have no counterpart here, so they can never reach an update body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetUpdate {
    pub name: String,
    pub asset_type_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub asset_tag: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub assigned_on: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub department_id: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub group_id: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub location_id: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub user_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub end_of_life: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub impact: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub usage_type: String,
    #[serde(skip_serializing_if = "is_false")]
    pub discovery_enabled: bool,
}

impl From<&Asset> for AssetUpdate {
    fn from(asset: &Asset) -> Self {
        Self {
            name: asset.name.clone(),
            asset_type_id: asset.asset_type_id,
            description: asset.description.clone(),
            asset_tag: asset.asset_tag.clone(),
            assigned_on: asset.assigned_on.clone(),
            department_id: asset.department_id,
            group_id: asset.group_id,
            location_id: asset.location_id,
            user_id: asset.user_id,
            end_of_life: asset.end_of_life.clone(),
            impact: asset.impact.clone(),
            usage_type: asset.usage_type.clone(),
            discovery_enabled: asset.discovery_enabled,
        }
    }
}

/// A read-only asset category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetType {
    #[serde(default, deserialize_with = "nullable")]
    pub id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub parent_asset_type_id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub visible: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(default, deserialize_with = "nullable")]
    pub updated_at: String,
}

/// `{"asset": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct AssetEnvelope<T> {
    pub asset: T,
}

/// `{"asset_type": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct AssetTypeEnvelope {
    pub asset_type: AssetType,
}

/// `{"asset_types": [...]}`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AssetTypeListing {
    #[serde(default, deserialize_with = "nullable")]
    pub asset_types: Vec<AssetType>,
}

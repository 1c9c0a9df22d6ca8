use super::{json_pretty, print_asset, with_spinner, EXIT_SUCCESS};
use clap::Args;
use fresh_client::{Asset, AssetBackend};

/// Optional asset fields shared by `create` and `update`.
#[derive(Debug, Default, Clone, Args)]
pub struct AssetFields {
    /// Free-text description.
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub asset_tag: Option<String>,
    /// Impact level (low, medium, high).
    #[arg(long)]
    pub impact: Option<String>,
    /// Usage type (permanent, loaner).
    #[arg(long)]
    pub usage_type: Option<String>,
    /// End-of-life date.
    #[arg(long)]
    pub end_of_life: Option<String>,
    #[arg(long)]
    pub assigned_on: Option<String>,
    #[arg(long)]
    pub department_id: Option<i64>,
    #[arg(long)]
    pub group_id: Option<i64>,
    #[arg(long)]
    pub location_id: Option<i64>,
    #[arg(long)]
    pub user_id: Option<i64>,
}

impl AssetFields {
    /// Overwrite the fields that were given on the command line.
    pub fn apply_to(&self, asset: &mut Asset) {
        let strings = [
            (&self.description, &mut asset.description),
            (&self.asset_tag, &mut asset.asset_tag),
            (&self.impact, &mut asset.impact),
            (&self.usage_type, &mut asset.usage_type),
            (&self.end_of_life, &mut asset.end_of_life),
            (&self.assigned_on, &mut asset.assigned_on),
        ];
        for (flag, field) in strings {
            if let Some(v) = flag {
                field.clone_from(v);
            }
        }
        let ids = [
            (self.department_id, &mut asset.department_id),
            (self.group_id, &mut asset.group_id),
            (self.location_id, &mut asset.location_id),
            (self.user_id, &mut asset.user_id),
        ];
        for (flag, field) in ids {
            if let Some(v) = flag {
                *field = v;
            }
        }
    }
}

/// How the asset type was given: by id or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetTypeRef {
    Id(i64),
    Name(String),
}

impl AssetTypeRef {
    pub fn from_flags(id: Option<i64>, name: Option<String>) -> Option<Self> {
        match (id, name) {
            (Some(id), _) => Some(Self::Id(id)),
            (None, Some(name)) => Some(Self::Name(name)),
            (None, None) => None,
        }
    }

    pub fn resolve(&self, backend: &dyn AssetBackend) -> Result<i64, String> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Name(name) => backend
                .lookup_asset_type(name)
                .map(|t| t.id)
                .map_err(|e| e.to_string()),
        }
    }
}

fn emit(asset: &Asset, json: bool) -> Result<(), String> {
    if json {
        println!("{}", json_pretty(asset)?);
    } else {
        print_asset(asset);
    }
    Ok(())
}

pub fn create(
    backend: &dyn AssetBackend,
    name: &str,
    asset_type: &AssetTypeRef,
    fields: &AssetFields,
    json: bool,
) -> Result<u8, String> {
    let asset_type_id = asset_type.resolve(backend)?;
    let mut desired = Asset::new(name, asset_type_id);
    fields.apply_to(&mut desired);

    let created = with_spinner(json, "creating asset", "asset created", || {
        backend.create(&desired)
    })?;
    emit(&created, json)?;
    Ok(EXIT_SUCCESS)
}

pub fn get(backend: &dyn AssetBackend, display_id: i64, json: bool) -> Result<u8, String> {
    let asset = with_spinner(json, "reading asset", "asset read", || {
        backend.read(display_id)
    })?;
    emit(&asset, json)?;
    Ok(EXIT_SUCCESS)
}

/// Read the current record, overlay the given flags, send the full replace.
pub fn update(
    backend: &dyn AssetBackend,
    display_id: i64,
    name: Option<&str>,
    asset_type: Option<&AssetTypeRef>,
    fields: &AssetFields,
    json: bool,
) -> Result<u8, String> {
    let mut desired = with_spinner(json, "reading asset", "asset read", || {
        backend.read(display_id)
    })?;
    if let Some(name) = name {
        name.clone_into(&mut desired.name);
    }
    if let Some(asset_type) = asset_type {
        desired.asset_type_id = asset_type.resolve(backend)?;
    }
    fields.apply_to(&mut desired);

    let updated = with_spinner(json, "updating asset", "asset updated", || {
        backend.update(&desired)
    })?;
    emit(&updated, json)?;
    Ok(EXIT_SUCCESS)
}

/// Delete an asset. With `missing_ok`, a remote not-found counts as success.
pub fn delete(
    backend: &dyn AssetBackend,
    display_id: i64,
    missing_ok: bool,
    json: bool,
) -> Result<u8, String> {
    let deleted = match backend.delete(display_id) {
        Ok(()) => true,
        Err(e) if missing_ok && e.is_not_found() => {
            tracing::info!("asset {display_id} already absent");
            false
        }
        Err(e) => return Err(e.to_string()),
    };

    if json {
        let payload = serde_json::json!({
            "display_id": display_id,
            "deleted": deleted,
        });
        println!("{}", json_pretty(&payload)?);
    } else if deleted {
        println!("deleted asset {display_id}");
    } else {
        println!("asset {display_id} already absent");
    }
    Ok(EXIT_SUCCESS)
}

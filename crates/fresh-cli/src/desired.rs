//! Desired-state files: one asset declared in TOML.
//!
//! ```toml
//! [asset]
//! name = "web-01"
//! asset_type = "Hardware"     # or: asset_type_id = 3
//! display_id = 100            # omit to create
//! description = "frontend"
//! ```

use fresh_client::{Asset, AssetBackend, FreshError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesiredStateError {
    #[error("desired state file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("desired state is not valid TOML: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("desired state error: asset.name must not be empty")]
    EmptyName,
    #[error("desired state error: set exactly one of asset.asset_type and asset.asset_type_id")]
    AssetType,
    /// Asset type resolution failed remotely; reported as the remote error.
    #[error(transparent)]
    Resolve(#[from] FreshError),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DesiredState {
    pub asset: DesiredAsset,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DesiredAsset {
    pub name: String,
    #[serde(default)]
    pub display_id: Option<i64>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub asset_type_id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub asset_tag: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub usage_type: String,
    #[serde(default)]
    pub end_of_life: String,
    #[serde(default)]
    pub assigned_on: String,
    #[serde(default)]
    pub department_id: i64,
    #[serde(default)]
    pub group_id: i64,
    #[serde(default)]
    pub location_id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub discovery_enabled: bool,
}

impl DesiredState {
    /// Turn the declaration into an [`Asset`], resolving a named asset type
    /// through the backend.
    pub fn to_asset(&self, backend: &dyn AssetBackend) -> Result<Asset, DesiredStateError> {
        let d = &self.asset;
        if d.name.trim().is_empty() {
            return Err(DesiredStateError::EmptyName);
        }
        let asset_type_id = match (&d.asset_type, d.asset_type_id) {
            (Some(name), None) => backend.lookup_asset_type(name)?.id,
            (None, Some(id)) => id,
            _ => return Err(DesiredStateError::AssetType),
        };
        Ok(Asset {
            display_id: d.display_id.unwrap_or_default(),
            name: d.name.clone(),
            asset_type_id,
            description: d.description.clone(),
            asset_tag: d.asset_tag.clone(),
            impact: d.impact.clone(),
            usage_type: d.usage_type.clone(),
            end_of_life: d.end_of_life.clone(),
            assigned_on: d.assigned_on.clone(),
            department_id: d.department_id,
            group_id: d.group_id,
            location_id: d.location_id,
            user_id: d.user_id,
            discovery_enabled: d.discovery_enabled,
            ..Asset::default()
        })
    }
}

pub fn parse_desired_str(input: &str) -> Result<DesiredState, DesiredStateError> {
    Ok(toml::from_str(input)?)
}

pub fn parse_desired_file(path: impl AsRef<Path>) -> Result<DesiredState, DesiredStateError> {
    let content = fs::read_to_string(path)?;
    parse_desired_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::MemoryBackend;

    #[test]
    fn parses_full_declaration() {
        let input = r#"
[asset]
name = "web-01"
display_id = 100
asset_type_id = 3
description = "frontend"
asset_tag = "TAG-100"
impact = "high"
usage_type = "permanent"
department_id = 4
discovery_enabled = true
"#;
        let desired = parse_desired_str(input).expect("should parse");
        assert_eq!(desired.asset.name, "web-01");
        assert_eq!(desired.asset.display_id, Some(100));
        assert_eq!(desired.asset.department_id, 4);

        let asset = desired.to_asset(&MemoryBackend::default()).unwrap();
        assert_eq!(asset.display_id, 100);
        assert_eq!(asset.asset_type_id, 3);
        assert_eq!(asset.impact, "high");
        assert!(asset.discovery_enabled);
        assert_eq!(asset.created_at, "");
    }

    #[test]
    fn resolves_asset_type_name() {
        let input = r#"
[asset]
name = "vm-7"
asset_type = "Cloud"
"#;
        let backend = MemoryBackend::with_types(&[(1, "Services"), (2, "Cloud")]);
        let asset = parse_desired_str(input).unwrap().to_asset(&backend).unwrap();
        assert_eq!(asset.asset_type_id, 2);
        assert_eq!(asset.display_id, 0);
    }

    #[test]
    fn unknown_asset_type_name() {
        let input = r#"
[asset]
name = "vm-7"
asset_type = "cloud"
"#;
        let backend = MemoryBackend::with_types(&[(2, "Cloud")]);
        let err = parse_desired_str(input)
            .unwrap()
            .to_asset(&backend)
            .unwrap_err();
        assert_eq!(err.to_string(), "asset type cloud not found");
        assert!(matches!(
            err,
            DesiredStateError::Resolve(FreshError::AssetTypeNotFound(_))
        ));
    }

    #[test]
    fn rejects_both_or_neither_asset_type() {
        let both = r#"
[asset]
name = "x"
asset_type = "Cloud"
asset_type_id = 2
"#;
        let neither = r#"
[asset]
name = "x"
"#;
        let backend = MemoryBackend::with_types(&[(2, "Cloud")]);
        for input in [both, neither] {
            let err = parse_desired_str(input)
                .unwrap()
                .to_asset(&backend)
                .unwrap_err();
            assert!(matches!(err, DesiredStateError::AssetType));
        }
    }

    #[test]
    fn rejects_empty_name() {
        let input = r#"
[asset]
name = ""
asset_type_id = 1
"#;
        let err = parse_desired_str(input)
            .unwrap()
            .to_asset(&MemoryBackend::default())
            .unwrap_err();
        assert!(matches!(err, DesiredStateError::EmptyName));
    }

    #[test]
    fn rejects_unknown_fields() {
        let input = r#"
[asset]
name = "x"
asset_type_id = 1
created_at = "2024-01-01"
"#;
        assert!(matches!(
            parse_desired_str(input),
            Err(DesiredStateError::ParseToml(_))
        ));
    }

    #[test]
    fn rejects_missing_asset_table() {
        assert!(parse_desired_str("name = \"x\"\n").is_err());
    }
}

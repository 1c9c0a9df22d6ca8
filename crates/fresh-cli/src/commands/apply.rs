use super::{json_pretty, print_asset, with_spinner, EXIT_SUCCESS};
use crate::desired::parse_desired_file;
use fresh_client::{Asset, AssetBackend};
use std::fmt;
use std::path::Path;

/// What reconciling a desired asset against the remote record requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    NoChange,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::NoChange => "no-change",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare the writable projections only; server-owned fields never count
/// as drift.
pub fn plan(current: Option<&Asset>, desired: &Asset) -> Action {
    match current {
        None => Action::Create,
        Some(current) if current.to_update() == desired.to_update() => Action::NoChange,
        Some(_) => Action::Update,
    }
}

pub fn run(backend: &dyn AssetBackend, file: &Path, dry_run: bool, json: bool) -> Result<u8, String> {
    let desired = parse_desired_file(file)
        .and_then(|d| d.to_asset(backend))
        .map_err(|e| e.to_string())?;

    let current = if desired.display_id == 0 {
        None
    } else {
        Some(with_spinner(json, "reading asset", "asset read", || {
            backend.read(desired.display_id)
        })?)
    };

    let action = plan(current.as_ref(), &desired);
    tracing::info!("apply {}: {action}", file.display());

    let observed = match (action, dry_run) {
        (Action::Create, false) => with_spinner(json, "creating asset", "asset created", || {
            backend.create(&desired)
        })?,
        (Action::Update, false) => with_spinner(json, "updating asset", "asset updated", || {
            backend.update(&desired)
        })?,
        (Action::NoChange, _) => current.unwrap_or(desired),
        (_, true) => desired,
    };

    if json {
        let payload = serde_json::json!({
            "action": action.as_str(),
            "dry_run": dry_run,
            "asset": observed,
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        if dry_run {
            println!("would {action}");
        } else if action == Action::NoChange {
            println!("asset {} is up to date", observed.display_id);
        }
        print_asset(&observed);
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::MemoryBackend;
    use crate::commands::{exit_code_for, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_NOT_FOUND};
    use fresh_client::FreshClient;
    use std::io::Write;

    fn desired_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn backend() -> MemoryBackend {
        MemoryBackend::with_types(&[(3, "Hardware")])
    }

    #[test]
    fn plan_ignores_server_owned_fields() {
        let current = Asset {
            id: 1007,
            display_id: 7,
            created_at: "2024-01-01T00:00:00Z".to_owned(),
            author_type: "User".to_owned(),
            ..Asset::new("db", 3)
        };
        let desired = Asset {
            display_id: 7,
            ..Asset::new("db", 3)
        };
        assert_eq!(plan(Some(&current), &desired), Action::NoChange);
        assert_eq!(plan(None, &desired), Action::Create);

        let renamed = Asset::new("db-2", 3);
        assert_eq!(plan(Some(&current), &renamed), Action::Update);
    }

    #[test]
    fn creates_without_display_id() {
        let backend = backend();
        let file = desired_file(
            r#"
[asset]
name = "laptop-1"
asset_type = "Hardware"
"#,
        );
        run(&backend, file.path(), false, true).unwrap();
        assert_eq!(backend.writes(), vec!["create 1"]);
        assert_eq!(backend.read(1).unwrap().asset_type_id, 3);
    }

    #[test]
    fn updates_when_drifted_and_skips_when_equal() {
        let backend = backend();
        backend.seed(Asset {
            display_id: 5,
            id: 1005,
            ..Asset::new("laptop-5", 3)
        });
        let file = desired_file(
            r#"
[asset]
name = "laptop-5"
display_id = 5
asset_type_id = 3
impact = "low"
"#,
        );
        run(&backend, file.path(), false, true).unwrap();
        assert_eq!(backend.writes(), vec!["update 5"]);
        assert_eq!(backend.read(5).unwrap().impact, "low");

        run(&backend, file.path(), false, true).unwrap();
        assert_eq!(backend.writes().len(), 1);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let backend = backend();
        let file = desired_file(
            r#"
[asset]
name = "laptop-1"
asset_type_id = 3
"#,
        );
        run(&backend, file.path(), true, true).unwrap();
        assert!(backend.writes().is_empty());
    }

    #[test]
    fn missing_remote_asset_surfaces_not_found() {
        let backend = backend();
        let file = desired_file(
            r#"
[asset]
name = "ghost"
display_id = 42
asset_type_id = 3
"#,
        );
        let err = run(&backend, file.path(), false, true).unwrap_err();
        assert!(err.starts_with("HTTP 404"), "{err}");
        assert!(backend.writes().is_empty());
    }

    #[test]
    fn unreadable_file_is_a_desired_state_error() {
        let err = run(
            &backend(),
            Path::new("/nonexistent/asset.toml"),
            false,
            true,
        )
        .unwrap_err();
        assert!(err.starts_with("desired state file unreadable"), "{err}");
    }

    #[test]
    fn unknown_asset_type_name_exits_not_found() {
        let file = desired_file(
            r#"
[asset]
name = "vm-1"
asset_type = "Mainframe"
"#,
        );
        let backend = backend();
        let err = run(&backend, file.path(), false, true).unwrap_err();
        assert_eq!(err, "asset type Mainframe not found");
        assert_eq!(exit_code_for(&err), EXIT_NOT_FOUND);
    }

    #[test]
    fn unreachable_endpoint_during_type_lookup_is_a_failure() {
        let file = desired_file(
            r#"
[asset]
name = "vm-1"
asset_type = "Cloud"
"#,
        );
        let client = FreshClient::connect("http://127.0.0.1:1", "k").unwrap();
        let err = run(&client, file.path(), false, true).unwrap_err();
        assert!(err.starts_with("HTTP transport error"), "{err}");
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
    }

    #[test]
    fn malformed_file_exits_config_error() {
        let file = desired_file("[asset]\nname = \"x\"\nasset_type_id = \"three\"\n");
        let err = run(&backend(), file.path(), false, true).unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_CONFIG_ERROR, "{err}");
    }
}

pub mod apply;
pub mod asset;
pub mod asset_type;

use fresh_client::config::{ENV_API_KEY, ENV_ENDPOINT};
use fresh_client::{Asset, ClientConfig, FreshError};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_NOT_FOUND: u8 = 3;

/// Connection settings as given on the command line.
#[derive(Debug, Default, Clone)]
pub struct ConnectionOptions {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub config: Option<PathBuf>,
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("valid template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(ProgressStyle::with_template("{msg}").expect("valid template"));
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Run `op` under a spinner in human mode, silently in JSON mode.
pub fn with_spinner<T>(
    json: bool,
    msg: &str,
    done: &str,
    op: impl FnOnce() -> Result<T, FreshError>,
) -> Result<T, String> {
    if json {
        return op().map_err(|e| e.to_string());
    }
    let pb = spinner(msg);
    match op() {
        Ok(v) => {
            spin_ok(&pb, done);
            Ok(v)
        }
        Err(e) => {
            spin_fail(&pb, &format!("{msg} failed"));
            Err(e.to_string())
        }
    }
}

/// Merge config sources: file, then environment, then flags.
///
/// A `--config` path must exist; the default path is optional.
pub fn resolve_config_with(
    opts: &ConnectionOptions,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, String> {
    let file = match &opts.config {
        Some(path) => Some(ClientConfig::load(path).map_err(|e| e.to_string())?),
        None => fresh_client::config::default_config_path()
            .ok()
            .filter(|p| p.exists())
            .map(|p| ClientConfig::load(&p))
            .transpose()
            .map_err(|e| e.to_string())?,
    };

    let endpoint = opts
        .endpoint
        .clone()
        .or_else(|| env(ENV_ENDPOINT))
        .or_else(|| file.as_ref().map(|c| c.endpoint().to_owned()))
        .unwrap_or_default();
    let api_key = opts
        .api_key
        .clone()
        .or_else(|| env(ENV_API_KEY))
        .or_else(|| file.as_ref().map(|c| c.api_key().to_owned()))
        .unwrap_or_default();

    let config = ClientConfig::new(&endpoint, &api_key).map_err(|e| e.to_string())?;
    Ok(match file.and_then(|c| c.timeout_secs()) {
        Some(secs) => config.with_timeout(secs),
        None => config,
    })
}

pub fn resolve_config(opts: &ConnectionOptions) -> Result<ClientConfig, String> {
    resolve_config_with(opts, |key| std::env::var(key).ok())
}

pub fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("client config error:") || msg.starts_with("desired state") {
        EXIT_CONFIG_ERROR
    } else if msg.starts_with("HTTP 404 ")
        || (msg.starts_with("asset type ") && msg.ends_with(" not found"))
    {
        EXIT_NOT_FOUND
    } else {
        EXIT_FAILURE
    }
}

pub fn print_asset(asset: &Asset) {
    println!("display_id:    {}", asset.display_id);
    println!("id:            {}", asset.id);
    println!("name:          {}", asset.name);
    println!("asset_type_id: {}", asset.asset_type_id);
    let optional = [
        ("description", asset.description.as_str()),
        ("asset_tag", asset.asset_tag.as_str()),
        ("impact", asset.impact.as_str()),
        ("usage_type", asset.usage_type.as_str()),
        ("end_of_life", asset.end_of_life.as_str()),
        ("assigned_on", asset.assigned_on.as_str()),
        ("created_at", asset.created_at.as_str()),
        ("updated_at", asset.updated_at.as_str()),
    ];
    for (label, value) in optional {
        if !value.is_empty() {
            println!("{label:<15}{value}");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use fresh_client::{Asset, AssetBackend, AssetType, ApiError, FreshError, StatusClass};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// In-memory [`AssetBackend`] that counts writes.
    #[derive(Default)]
    pub struct MemoryBackend {
        pub assets: Mutex<BTreeMap<i64, Asset>>,
        pub asset_types: Vec<AssetType>,
        pub writes: Mutex<Vec<String>>,
    }

    impl MemoryBackend {
        pub fn with_types(names: &[(i64, &str)]) -> Self {
            Self {
                asset_types: names
                    .iter()
                    .map(|(id, name)| AssetType {
                        id: *id,
                        name: (*name).to_owned(),
                        ..AssetType::default()
                    })
                    .collect(),
                ..Self::default()
            }
        }

        pub fn seed(&self, asset: Asset) {
            self.assets.lock().unwrap().insert(asset.display_id, asset);
        }

        pub fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }

        fn not_found(display_id: i64) -> FreshError {
            ApiError::new(StatusClass::ResourceNotFound, format!("memory {display_id}")).into()
        }
    }

    impl AssetBackend for MemoryBackend {
        fn create(&self, desired: &Asset) -> Result<Asset, FreshError> {
            let mut assets = self.assets.lock().unwrap();
            let display_id = assets.keys().max().copied().unwrap_or(0) + 1;
            let created = Asset {
                display_id,
                id: display_id + 1000,
                ..desired.clone()
            };
            assets.insert(display_id, created.clone());
            self.writes.lock().unwrap().push(format!("create {display_id}"));
            Ok(created)
        }

        fn read(&self, display_id: i64) -> Result<Asset, FreshError> {
            self.assets
                .lock()
                .unwrap()
                .get(&display_id)
                .cloned()
                .ok_or_else(|| Self::not_found(display_id))
        }

        fn update(&self, desired: &Asset) -> Result<Asset, FreshError> {
            let mut assets = self.assets.lock().unwrap();
            let current = assets
                .get_mut(&desired.display_id)
                .ok_or_else(|| Self::not_found(desired.display_id))?;
            *current = Asset {
                id: current.id,
                display_id: current.display_id,
                ..desired.clone()
            };
            self.writes
                .lock()
                .unwrap()
                .push(format!("update {}", desired.display_id));
            Ok(current.clone())
        }

        fn delete(&self, display_id: i64) -> Result<(), FreshError> {
            self.assets
                .lock()
                .unwrap()
                .remove(&display_id)
                .map(|_| ())
                .ok_or_else(|| Self::not_found(display_id))?;
            self.writes.lock().unwrap().push(format!("delete {display_id}"));
            Ok(())
        }

        fn lookup_asset_type(&self, name: &str) -> Result<AssetType, FreshError> {
            self.asset_types
                .iter()
                .find(|t| t.name == name)
                .cloned()
                .ok_or_else(|| FreshError::AssetTypeNotFound(name.to_owned()))
        }
    }
}

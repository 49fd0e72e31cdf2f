//! Server options read from the client's `initializationOptions`.

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerOptions {
    /// Index YAML files under the workspace root after initialize.
    pub scan_workspace: bool,
    /// Ignore document writes older than the cached version.
    pub reject_stale_versions: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            scan_workspace: true,
            reject_stale_versions: false,
        }
    }
}

impl ServerOptions {
    /// Options from raw `initializationOptions`. Missing or malformed
    /// options fall back to the defaults.
    pub fn from_init_options(value: Option<&serde_json::Value>) -> Self {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Self::default();
        };
        match serde_json::from_value(value.clone()) {
            Ok(options) => options,
            Err(err) => {
                warn!(%err, "ignoring malformed initializationOptions");
                Self::default()
            }
        }
    }
}

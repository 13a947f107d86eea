// Persisted workflow instance
//
// The state file holds the flow continuation plus the demo data:
// { "state": ["start:deploy/ready"], "data": { ... } }

use std::io::ErrorKind;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stepflow::State;

use crate::demo::DemoData;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateDocument {
    pub state: State,
    pub data: DemoData,
}

impl StateDocument {
    /// Load from `path`; a missing file is a new instance
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Invalid state file {}", path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read state file {}", path.display()))
            }
        }
    }

    /// Write to `path` through a temporary sibling so readers never see a partial file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        let tmp = temp_path(path);

        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("Failed to replace state file {}", path.display()))?;
        Ok(())
    }
}

/// Sibling of `path` with `.tmp` appended to the whole file name
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

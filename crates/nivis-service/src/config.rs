use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Identity a deployment assigns to its snowflake generator.
///
/// Both ids are fixed for the lifetime of a generator: changing the file
/// behind a [`ConfigStore`] affects generators constructed afterwards,
/// never live ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Data-center (partition) id, encoded into every snowflake id.
    pub data_center_id: u64,
    /// Service (shard) id, encoded into every snowflake id.
    pub service_id: u64,
}

/// Faults while reading or decoding a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The contents are not valid JSON, or a key is missing or carries the
    /// wrong type.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ServiceConfig {
    /// Decodes a config from JSON text.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed JSON, a missing key, or a value
    /// of the wrong type.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a config from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

/// A shared, updatable snapshot of the service configuration.
///
/// Cloning the store is cheap; every clone reads and writes the same
/// snapshot.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<ServiceConfig>>,
}

impl ConfigStore {
    /// Wraps an initial snapshot.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Returns the current snapshot.
    pub fn get(&self) -> ServiceConfig {
        *self.inner.read()
    }

    /// Replaces the snapshot.
    pub fn update(&self, config: ServiceConfig) {
        *self.inner.write() = config;
    }

    /// Re-reads `path` and replaces the snapshot on success.
    ///
    /// # Errors
    /// Forwards the read or parse fault; the snapshot keeps its previous
    /// value in that case.
    pub fn reload_from(&self, path: &Path) -> Result<(), ConfigError> {
        let config = ServiceConfig::from_path(path)?;
        self.update(config);
        Ok(())
    }
}

/// Periodically re-reads `path` into `store` until `shutdown` fires.
///
/// A failed read or parse keeps the previous snapshot and logs the fault;
/// the task never dies over a bad file.
pub async fn watch(
    store: ConfigStore,
    path: PathBuf,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!("Config watch started on {}", path.display());

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("Config watch stopped");
                return;
            }
            _ = ticker.tick() => {
                if let Err(err) = store.reload_from(&path) {
                    warn!("Config reload from {} failed, keeping previous snapshot: {err}", path.display());
                }
            }
        }
    }
}

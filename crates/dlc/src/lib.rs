//! Best-effort DLC enrichment.
//!
//! Discovers the DLC ids associated with a title from the store
//! metadata endpoint, resolves each id to a display name through a
//! bounded worker pool, and persists the mapping as `configs.app.ini`.
//! Individual lookup failures are dropped, never fatal.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::Path;

use futures_util::StreamExt;
use gsegen_progress::ProgressSink;
use serde::Deserialize;

/// Store metadata API base.
pub const DEFAULT_STORE_BASE: &str = "https://store.steampowered.com/api";

/// Fixed number of concurrent name lookups.
const POOL_SIZE: usize = 10;

/// File the DLC mapping is persisted under.
pub const APP_CONFIG_FILE: &str = "configs.app.ini";

/// Errors from DLC discovery.
#[derive(Debug, thiserror::Error)]
pub enum DlcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    data: Option<AppData>,
}

#[derive(Debug, Deserialize)]
struct AppData {
    name: Option<String>,
    #[serde(default)]
    dlc: Vec<u32>,
}

/// Resolves a title's DLC ids to display names.
pub struct DlcEnricher {
    client: reqwest::Client,
    store_base: String,
}

impl DlcEnricher {
    /// Creates an enricher over a pre-configured client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            store_base: DEFAULT_STORE_BASE.to_string(),
        }
    }

    /// Overrides the store API base URL (tests).
    pub fn with_store_base(mut self, base: impl Into<String>) -> Self {
        self.store_base = base.into();
        self
    }

    /// Queries the details of one app id.
    async fn app_details(&self, app_id: u32) -> Result<Option<AppData>, DlcError> {
        let url = format!("{}/appdetails?appids={}", self.store_base, app_id);
        let body = self.client.get(&url).send().await?.bytes().await?;
        let mut response: HashMap<String, Envelope> = serde_json::from_slice(&body)?;

        let Some(envelope) = response.remove(&app_id.to_string()) else {
            return Ok(None);
        };
        if !envelope.success {
            return Ok(None);
        }
        Ok(envelope.data)
    }

    /// Returns the DLC ids associated with `app_id`; empty when the
    /// title has none or the endpoint reports no data.
    pub async fn discover(&self, app_id: u32) -> Result<Vec<u32>, DlcError> {
        Ok(self
            .app_details(app_id)
            .await?
            .map(|data| data.dlc)
            .unwrap_or_default())
    }

    /// Resolves each id to its display name through the worker pool.
    ///
    /// Ids whose lookup fails or reports non-success are silently
    /// dropped; partial success is acceptable.
    pub async fn resolve_names(&self, ids: &[u32]) -> BTreeMap<u32, String> {
        let resolved: Vec<Option<(u32, String)>> =
            futures_util::stream::iter(ids.iter().copied().map(|id| async move {
                match self.app_details(id).await {
                    Ok(Some(AppData {
                        name: Some(name), ..
                    })) => Some((id, name)),
                    Ok(_) => {
                        tracing::debug!(dlc = id, "lookup reported no name");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(dlc = id, error = %e, "DLC lookup failed");
                        None
                    }
                }
            }))
            .buffer_unordered(POOL_SIZE)
            .collect()
            .await;

        resolved.into_iter().flatten().collect()
    }

    /// Full enrichment: discover, resolve, persist when non-empty.
    ///
    /// Returns the number of persisted entries.
    pub async fn enrich(
        &self,
        app_id: u32,
        settings_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<usize, DlcError> {
        let ids = self.discover(app_id).await?;
        if ids.is_empty() {
            sink.line("No DLC found.");
            return Ok(0);
        }

        let names = self.resolve_names(&ids).await;
        if write_app_config(settings_dir, &names)? {
            sink.line(&format!("Found {} DLC entries.", names.len()));
        }
        Ok(names.len())
    }
}

/// Writes `configs.app.ini` from the resolved mapping.
///
/// Nothing is written for an empty mapping; returns whether the file
/// was created.
pub fn write_app_config(
    settings_dir: &Path,
    dlc: &BTreeMap<u32, String>,
) -> std::io::Result<bool> {
    if dlc.is_empty() {
        return Ok(false);
    }

    let mut file = std::fs::File::create(settings_dir.join(APP_CONFIG_FILE))?;
    writeln!(file, "[app::dlcs]")?;
    writeln!(file, "unlock_all=0")?;
    for (id, name) in dlc {
        writeln!(file, "{id}={name}")?;
    }
    Ok(true)
}

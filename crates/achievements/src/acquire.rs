//! Source selection, fallback and JSON persistence.

use std::path::Path;

use gsegen_progress::ProgressSink;

use crate::download::IconDownloader;
use crate::error::FetchError;
use crate::parse::{parse_steamcommunity, parse_steamdb};
use crate::types::Achievement;

/// Base URL for the Steam Community achievements pages.
pub const COMMUNITY_BASE: &str = "https://steamcommunity.com";

/// Base URL for the SteamDB stats pages.
pub const STEAMDB_BASE: &str = "https://steamdb.info";

/// An achievement data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    SteamCommunity,
    SteamDb,
}

impl Source {
    /// Returns the alternate provider.
    pub fn other(self) -> Self {
        match self {
            Source::SteamCommunity => Source::SteamDb,
            Source::SteamDb => Source::SteamCommunity,
        }
    }

    /// Filename the result of this provider is persisted under.
    pub fn output_file(self) -> &'static str {
        match self {
            Source::SteamCommunity => "achievements.json",
            Source::SteamDb => "achievementsDB.json",
        }
    }
}

/// Drives one fetch-fallback-persist-download run.
///
/// The preferred source is tried first; an error or an empty result
/// falls back to the alternate source. A fallback failure propagates.
pub struct Acquisition {
    client: reqwest::Client,
    downloader: IconDownloader,
    community_base: String,
    steamdb_base: String,
}

impl Acquisition {
    /// Creates an orchestrator over a pre-configured client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            downloader: IconDownloader::new(client.clone()),
            client,
            community_base: COMMUNITY_BASE.to_string(),
            steamdb_base: STEAMDB_BASE.to_string(),
        }
    }

    /// Overrides the community page base URL (tests, mirrors).
    pub fn with_community_base(mut self, base: impl Into<String>) -> Self {
        self.community_base = base.into();
        self
    }

    /// Overrides the SteamDB page base URL (tests, mirrors).
    pub fn with_steamdb_base(mut self, base: impl Into<String>) -> Self {
        self.steamdb_base = base.into();
        self
    }

    /// Overrides the icon CDN base URL (tests, mirrors).
    pub fn with_cdn_base(mut self, base: impl Into<String>) -> Self {
        self.downloader = IconDownloader::new(self.client.clone()).with_cdn_base(base);
        self
    }

    /// Fetches and parses one source's page for `app_id`.
    pub async fn fetch(&self, app_id: u32, source: Source) -> Result<Vec<Achievement>, FetchError> {
        let url = match source {
            Source::SteamCommunity => {
                format!("{}/stats/{}/achievements/", self.community_base, app_id)
            }
            Source::SteamDb => format!("{}/app/{}/stats/", self.steamdb_base, app_id),
        };
        tracing::debug!(%url, ?source, "fetching achievements page");
        let html = self.client.get(&url).send().await?.text().await?;

        let parsed = match source {
            Source::SteamCommunity => parse_steamcommunity(&html)?,
            Source::SteamDb => parse_steamdb(&html)?,
        };
        Ok(parsed)
    }

    /// Runs the full acquisition: fetch with fallback, persist the JSON
    /// array into `out_dir`, then download icons.
    ///
    /// Returns the final achievement sequence, which may be empty when
    /// both sources yield nothing.
    pub async fn run(
        &self,
        app_id: u32,
        preferred: Source,
        out_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Achievement>, FetchError> {
        let (achievements, source) = match self.fetch(app_id, preferred).await {
            Ok(list) if !list.is_empty() => (list, preferred),
            Ok(_) => {
                sink.line("No achievements found.");
                (self.fetch(app_id, preferred.other()).await?, preferred.other())
            }
            Err(e) => {
                tracing::warn!(source = ?preferred, error = %e, "preferred source failed");
                sink.line(&format!("Achievements fetch failed: {e}"));
                (self.fetch(app_id, preferred.other()).await?, preferred.other())
            }
        };

        let path = out_dir.join(source.output_file());
        let file = std::fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, &achievements)?;
        sink.line(&format!(
            "Saved {} achievements to {}",
            achievements.len(),
            source.output_file()
        ));

        self.downloader
            .download(app_id, &achievements, out_dir, sink)
            .await?;
        Ok(achievements)
    }
}

//! At-most-once download and extraction of the emulator release.

use std::path::{Path, PathBuf};

use gsegen_progress::ProgressSink;

use crate::error::ProvisionError;
use crate::tools::ArchiveExtractor;

/// Latest Windows release archive of the Goldberg emulator fork.
pub const GOLDBERG_URL: &str =
    "https://github.com/Detanup01/gbe_fork/releases/latest/download/emu-win-release.7z";

/// Cached archive filename.
pub const ARCHIVE_NAME: &str = "emu-win-release.7z";

/// Local cache of the extracted emulator release.
///
/// The archive is downloaded at most once per cache lifetime: an
/// already-cached archive skips the download, and an already-populated
/// cache skips both download and extraction.
pub struct EmulatorCache<'a> {
    dir: PathBuf,
    url: String,
    extractor: &'a dyn ArchiveExtractor,
}

impl<'a> EmulatorCache<'a> {
    /// Creates a cache rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>, extractor: &'a dyn ArchiveExtractor) -> Self {
        Self {
            dir: dir.into(),
            url: GOLDBERG_URL.to_string(),
            extractor,
        }
    }

    /// Overrides the release archive URL (tests, mirrors).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// The cache root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensures the cache holds an extracted release, downloading and
    /// extracting as needed. Returns the extracted root.
    ///
    /// The archive is deleted after a successful extraction; extraction
    /// failure is fatal to the run.
    pub async fn ensure(
        &self,
        client: &reqwest::Client,
        sink: &dyn ProgressSink,
    ) -> Result<&Path, ProvisionError> {
        if self.is_populated() {
            tracing::debug!(dir = %self.dir.display(), "emulator cache already populated");
            return Ok(&self.dir);
        }

        std::fs::create_dir_all(&self.dir)?;
        let archive = self.dir.join(ARCHIVE_NAME);

        if !archive.is_file() {
            sink.line("Downloading Goldberg emulator...");
            let resp = client.get(&self.url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(ProvisionError::Download {
                    status: status.as_u16(),
                });
            }
            let bytes = resp.bytes().await?;
            tokio::fs::write(&archive, &bytes).await?;
            sink.line("Download completed successfully.");
        }

        self.extractor.extract(&archive, &self.dir)?;
        std::fs::remove_file(&archive)?;
        sink.line("Extraction completed.");
        Ok(&self.dir)
    }

    /// True when the cache holds anything besides a leftover archive.
    fn is_populated(&self) -> bool {
        std::fs::read_dir(&self.dir)
            .map(|mut entries| {
                entries.any(|e| e.is_ok_and(|e| e.file_name() != ARCHIVE_NAME))
            })
            .unwrap_or(false)
    }
}

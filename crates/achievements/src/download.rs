//! Deduplicated, bounded-concurrency icon downloads.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use gsegen_progress::ProgressSink;

use crate::error::FetchError;
use crate::parse::basename;
use crate::types::Achievement;

/// Fixed number of concurrent download workers.
pub const POOL_SIZE: usize = 10;

/// CDN serving achievement icons, keyed by app id and basename.
pub const DEFAULT_CDN_BASE: &str =
    "https://cdn.fastly.steamstatic.com/steamcommunity/public/images/apps";

/// Outcome counts for one download batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

/// Downloads each referenced icon exactly once into `images/`.
///
/// Basenames are deduplicated across the whole achievement set before
/// any worker starts; a failed item is logged and counted, never fatal
/// to the batch.
pub struct IconDownloader {
    client: reqwest::Client,
    cdn_base: String,
}

impl IconDownloader {
    /// Creates a downloader over a pre-configured client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            cdn_base: DEFAULT_CDN_BASE.to_string(),
        }
    }

    /// Overrides the CDN base URL (mirrors, tests).
    pub fn with_cdn_base(mut self, base: impl Into<String>) -> Self {
        self.cdn_base = base.into();
        self
    }

    /// Fetches every unique icon of `achievements` into
    /// `target_dir/images/`, reporting `[completed/total]` lines
    /// through `sink`.
    pub async fn download(
        &self,
        app_id: u32,
        achievements: &[Achievement],
        target_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadReport, FetchError> {
        let names = unique_basenames(achievements);
        let total = names.len();
        if total == 0 {
            sink.line("No icons to download.");
            return Ok(DownloadReport {
                completed: 0,
                failed: 0,
                total: 0,
            });
        }

        let images_dir = target_dir.join("images");
        std::fs::create_dir_all(&images_dir)?;

        // Workers share nothing mutable except this counter.
        let completed = Arc::new(Mutex::new(0usize));

        let results: Vec<bool> = futures_util::stream::iter(names.into_iter().map(|name| {
            let client = self.client.clone();
            let url = format!("{}/{}/{}", self.cdn_base, app_id, name);
            let dest = images_dir.join(&name);
            let completed = Arc::clone(&completed);
            async move {
                match fetch_icon(&client, &url, &dest).await {
                    Ok(()) => {
                        let done = {
                            let mut count = completed.lock().unwrap();
                            *count += 1;
                            *count
                        };
                        sink.line(&format!("[{done}/{total}] {name}"));
                        true
                    }
                    Err(e) => {
                        tracing::warn!(icon = %name, error = %e, "icon download failed");
                        false
                    }
                }
            }
        }))
        .buffer_unordered(POOL_SIZE)
        .collect()
        .await;

        let completed = results.iter().filter(|ok| **ok).count();
        let report = DownloadReport {
            completed,
            failed: total - completed,
            total,
        };
        sink.line(&format!(
            "Icon download complete ({}/{})",
            report.completed, report.total
        ));
        Ok(report)
    }
}

/// Collects the unique icon basenames across all records.
///
/// Basenames come from untrusted HTML; anything that is not a plain
/// filename (dot segments, drive prefixes) is dropped so a crafted
/// page cannot write outside `images/`.
fn unique_basenames(achievements: &[Achievement]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for achievement in achievements {
        for reference in [&achievement.icon, &achievement.icongray] {
            let name = basename(reference);
            if name.is_empty() || name == "." || name == ".." || name.contains(':') {
                continue;
            }
            if seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// One worker: fetch, require HTTP 200, write the raw body.
async fn fetch_icon(client: &reqwest::Client, url: &str, dest: &Path) -> Result<(), FetchError> {
    let resp = client.get(url).send().await?;
    if resp.status() != reqwest::StatusCode::OK {
        return Err(FetchError::Status(resp.status().as_u16()));
    }
    let bytes = resp.bytes().await?;
    tokio::fs::write(dest, &bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsegen_progress::MemorySink;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn ach(name: &str, icon: &str, icongray: &str) -> Achievement {
        Achievement {
            description: String::new(),
            display_name: name.into(),
            hidden: false,
            icon: icon.into(),
            icongray: icongray.into(),
            name: name.into(),
        }
    }

    /// Serves every request with 200 and the path as body, counting
    /// hits per path. 404s paths containing "missing".
    async fn mock_cdn() -> (String, Arc<Mutex<HashMap<String, usize>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::default();

        let hits_srv = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let hits = Arc::clone(&hits_srv);
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
                    let path = request
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("/")
                        .to_string();
                    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

                    let resp = if path.contains("missing") {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                            .to_string()
                    } else {
                        format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            path.len(),
                            path
                        )
                    };
                    let _ = stream.write_all(resp.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        (url, hits)
    }

    #[test]
    fn dedup_is_by_basename_and_skips_empty() {
        let achievements = vec![
            ach("a", "images/shared.jpg", "images/shared.jpg"),
            ach("b", "images/shared.jpg", "images/other.jpg"),
            ach("c", "images/", "images/"),
        ];
        let names = unique_basenames(&achievements);
        assert_eq!(names, ["shared.jpg", "other.jpg"]);
    }

    #[test]
    fn dedup_rejects_path_escapes() {
        let achievements = vec![
            ach("a", r"images\..\evil.dll", "images/.."),
            ach("b", "images/.", "C:boot.jpg"),
            ach("c", "images/fine.jpg", "images/fine.jpg"),
        ];
        let names = unique_basenames(&achievements);
        assert_eq!(names, ["evil.dll", "fine.jpg"]);
    }

    #[tokio::test]
    async fn shared_basename_downloads_once() {
        let (url, hits) = mock_cdn().await;
        let tmp = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();

        let achievements = vec![
            ach("a", "images/shared.jpg", "images/lock.jpg"),
            ach("b", "images/shared.jpg", "images/shared.jpg"),
        ];
        let downloader =
            IconDownloader::new(reqwest::Client::new()).with_cdn_base(url);
        let report = downloader
            .download(480, &achievements, tmp.path(), &sink)
            .await
            .unwrap();

        assert_eq!(report.completed, 2);
        assert_eq!(report.failed, 0);
        let hits = hits.lock().unwrap();
        assert_eq!(hits.get("/480/shared.jpg"), Some(&1));
        assert_eq!(hits.get("/480/lock.jpg"), Some(&1));
        assert!(tmp.path().join("images/shared.jpg").exists());
        assert!(tmp.path().join("images/lock.jpg").exists());
    }

    #[tokio::test]
    async fn per_item_failure_does_not_abort_batch() {
        let (url, _hits) = mock_cdn().await;
        let tmp = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();

        let achievements = vec![
            ach("a", "images/good.jpg", "images/good.jpg"),
            ach("b", "images/missing.jpg", "images/missing.jpg"),
        ];
        let downloader =
            IconDownloader::new(reqwest::Client::new()).with_cdn_base(url);
        let report = downloader
            .download(480, &achievements, tmp.path(), &sink)
            .await
            .unwrap();

        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 1);
        assert!(tmp.path().join("images/good.jpg").exists());
        assert!(!tmp.path().join("images/missing.jpg").exists());

        // Final completion line is emitted regardless of failures.
        let lines = sink.lines();
        assert_eq!(lines.last().unwrap(), "Icon download complete (1/2)");
    }

    #[tokio::test]
    async fn empty_set_emits_nothing_to_download() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = MemorySink::new();
        let downloader = IconDownloader::new(reqwest::Client::new());
        let report = downloader.download(480, &[], tmp.path(), &sink).await.unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(sink.lines(), ["No icons to download."]);
    }
}

pub mod ytdlp;

pub use ytdlp::{check_ytdlp, YtDlp};

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Outcome of a full-audio download attempt.
///
/// Failures carry a short reason tag that ends up in the summary as
/// `download-failed:<reason>`; the full diagnostics live in the per-video
/// log file, never on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    Ok(PathBuf),
    Failed(String),
}

/// Resolves a video id to an audio source via the external downloader.
///
/// Both operations are per-job and independent: a resolved URL is only valid
/// for the clip-extraction pass of that one video (remote URLs expire), and
/// nothing is cached across jobs.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Resolve a remote streamable audio URL without fetching anything.
    /// `None` means the tool failed or printed no URL; the job is then
    /// recorded as `no-url`, never aborted.
    async fn resolve_url(&self, video_id: &str) -> Option<String>;

    /// Download and transcode the full audio to `raw_dir/<video_id>.wav`,
    /// writing all subprocess output to a log file under `logs_dir`.
    async fn download_wav(&self, video_id: &str, raw_dir: &Path, logs_dir: &Path)
        -> DownloadResult;

    fn name(&self) -> &'static str;
}

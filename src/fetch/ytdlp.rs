use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{Config, CookieSource};
use crate::error::{Result, VoxclipError};
use crate::fetch::{AudioFetcher, DownloadResult};

/// Check that yt-dlp is installed and accessible.
pub fn check_ytdlp() -> Result<()> {
    let output = std::process::Command::new("yt-dlp")
        .arg("--version")
        .output()
        .map_err(|e| {
            VoxclipError::Fetch(format!(
                "yt-dlp not found. Install it with: pip install -U yt-dlp. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(VoxclipError::Fetch("yt-dlp check failed".to_string()));
    }

    debug!("yt-dlp is available");
    Ok(())
}

/// The yt-dlp backed fetcher.
pub struct YtDlp {
    audio_format: String,
    sample_rate: u32,
    cookies: CookieSource,
    force_ipv4: bool,
    http_chunk_size: Option<String>,
}

impl YtDlp {
    pub fn new(config: &Config) -> Self {
        Self {
            audio_format: config.audio_format.clone(),
            sample_rate: config.sample_rate,
            cookies: config.cookies.clone(),
            force_ipv4: config.force_ipv4,
            http_chunk_size: config.http_chunk_size.clone(),
        }
    }

    fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={video_id}")
    }
}

#[async_trait]
impl AudioFetcher for YtDlp {
    async fn resolve_url(&self, video_id: &str) -> Option<String> {
        let output = tokio::process::Command::new("yt-dlp")
            .arg("-f")
            .arg(&self.audio_format)
            .arg("-g")
            .arg(Self::watch_url(video_id))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            debug!("yt-dlp -g failed for {}", video_id);
            return None;
        }

        // yt-dlp may print one URL per stream; the audio URL is last.
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .map(String::from)
    }

    async fn download_wav(
        &self,
        video_id: &str,
        raw_dir: &Path,
        logs_dir: &Path,
    ) -> DownloadResult {
        if std::fs::create_dir_all(raw_dir).is_err() || std::fs::create_dir_all(logs_dir).is_err()
        {
            return DownloadResult::Failed("mkdir-error".to_string());
        }

        let out_template = raw_dir.join("%(id)s.%(ext)s");
        let postprocessor_args = format!("ffmpeg:-ar {} -ac 1", self.sample_rate);

        let mut cmd = tokio::process::Command::new("yt-dlp");
        cmd.args(["--ignore-config", "-v", "-f"])
            .arg(&self.audio_format);
        if self.force_ipv4 {
            cmd.arg("--force-ipv4");
        }
        cmd.args(["--extract-audio", "--audio-format", "wav"])
            .arg("--postprocessor-args")
            .arg(&postprocessor_args)
            .args(["--retries", "20", "--fragment-retries", "20"])
            .args(["--sleep-requests", "1", "--sleep-interval", "1"])
            .args(["--max-sleep-interval", "5"])
            .args(["--no-playlist", "--geo-bypass"])
            .arg("-o")
            .arg(&out_template)
            .arg(Self::watch_url(video_id));

        if let Some(size) = &self.http_chunk_size {
            cmd.arg("--http-chunk-size").arg(size);
        }
        match &self.cookies {
            CookieSource::Browser => {
                cmd.args(["--cookies-from-browser", "chrome:profile=Default"]);
            }
            CookieSource::File(path) if path.exists() => {
                cmd.arg("--cookies").arg(path);
            }
            _ => {}
        }

        // All downloader output goes to the per-video log for postmortems.
        let log_path = logs_dir.join(format!("{video_id}.yt-dlp.log"));
        let status = match open_log(&log_path) {
            Ok((out_log, err_log)) => {
                cmd.stdin(Stdio::null())
                    .stdout(out_log)
                    .stderr(err_log)
                    .status()
                    .await
            }
            Err(e) => Err(e),
        };

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to run yt-dlp for {}: {}", video_id, e);
                let err_path = logs_dir.join(format!("{video_id}.fetch.err.txt"));
                let _ = std::fs::write(&err_path, e.to_string());
                return DownloadResult::Failed("spawn-error".to_string());
            }
        };

        let wav = raw_dir.join(format!("{video_id}.wav"));
        if status.success() && wav.exists() {
            DownloadResult::Ok(wav)
        } else {
            DownloadResult::Failed("failed".to_string())
        }
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

fn open_log(path: &Path) -> std::io::Result<(Stdio, Stdio)> {
    let file = std::fs::File::create(path)?;
    let clone = file.try_clone()?;
    Ok((Stdio::from(file), Stdio::from(clone)))
}

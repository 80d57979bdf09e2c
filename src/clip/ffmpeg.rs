use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tracing::debug;

use crate::clip::{ClipCutter, ClipSource};
use crate::error::{Result, VoxclipError};
use crate::meta::Interval;

/// Check that ffmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map_err(|e| {
            VoxclipError::ClipExtraction(format!(
                "ffmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(VoxclipError::ClipExtraction(
            "ffmpeg check failed".to_string(),
        ));
    }

    debug!("ffmpeg is available");
    Ok(())
}

/// The ffmpeg backed trim+resample cutter.
pub struct Ffmpeg {
    sample_rate: u32,
}

impl Ffmpeg {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

#[async_trait]
impl ClipCutter for Ffmpeg {
    async fn cut(&self, source: &ClipSource, interval: Interval, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut cmd = tokio::process::Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error", "-y"])
            .arg("-ss")
            .arg(format!("{:.3}", interval.start));

        // Remote streams seek to an absolute end time; local files use a
        // duration. Equivalent for well-formed intervals.
        match source {
            ClipSource::Remote(url) => {
                cmd.arg("-to")
                    .arg(format!("{:.3}", interval.end))
                    .arg("-i")
                    .arg(url);
            }
            ClipSource::Local(path) => {
                cmd.arg("-t")
                    .arg(format!("{:.3}", interval.duration()))
                    .arg("-i")
                    .arg(path);
            }
        }

        let status = cmd
            .args(["-ac", "1", "-ar"])
            .arg(self.sample_rate.to_string())
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| VoxclipError::ClipExtraction(format!("Failed to run ffmpeg: {e}")))?;

        if !status.success() {
            return Err(VoxclipError::ClipExtraction(format!(
                "ffmpeg exited with {} cutting {:.3}-{:.3} to {}",
                status,
                interval.start,
                interval.end,
                dest.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffmpeg_available() -> bool {
        std::process::Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_check_ffmpeg() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: ffmpeg not available");
            return;
        }
        assert!(check_ffmpeg().is_ok());
    }

    #[tokio::test]
    async fn test_cut_missing_input_fails() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: ffmpeg not available");
            return;
        }

        let tmp = tempfile::tempdir().unwrap();
        let cutter = Ffmpeg::new(16_000);
        let source = ClipSource::Local(tmp.path().join("missing.wav"));
        let result = cutter
            .cut(
                &source,
                Interval {
                    start: 0.0,
                    end: 1.0,
                },
                &tmp.path().join("out.wav"),
            )
            .await;
        assert!(result.is_err());
    }
}

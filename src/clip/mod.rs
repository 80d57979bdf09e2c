pub mod ffmpeg;

pub use ffmpeg::{check_ffmpeg, Ffmpeg};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::meta::{label_files, parse_interval, Interval};

/// Where the audio to cut from lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipSource {
    /// A streamable URL, valid only for the current job.
    Remote(String),
    /// A fully downloaded wav on disk.
    Local(PathBuf),
}

/// Cuts one interval out of an audio source into a mono resampled wav.
#[async_trait]
pub trait ClipCutter: Send + Sync {
    async fn cut(&self, source: &ClipSource, interval: Interval, dest: &Path) -> Result<()>;
}

/// Deterministic output path for one utterance clip.
///
/// Keyed by speaker, video directory name and label stem, so re-runs map to
/// the same paths and no two jobs can collide.
pub fn clip_dest(save_dir: &Path, speaker: &str, video_dir: &Path, label: &Path) -> PathBuf {
    let video_name = video_dir.file_name().unwrap_or_default();
    let stem = label.file_stem().unwrap_or_default().to_string_lossy();
    // Append rather than set_extension: stems may contain dots and must
    // survive intact, or distinct labels would collide on one path.
    save_dir
        .join(speaker)
        .join(video_name)
        .join(format!("{stem}.wav"))
}

/// Cut every labeled utterance of one video out of `source`.
///
/// Unparsable labels and intervals with `end <= start` are skipped without
/// invoking the cutter. A failed cut is written to a per-utterance error
/// file under `logs_dir` and never stops the remaining intervals. Returns
/// the number of clips actually produced.
pub async fn extract_clips(
    cutter: &dyn ClipCutter,
    source: &ClipSource,
    speaker: &str,
    video_dir: &Path,
    save_dir: &Path,
    logs_dir: &Path,
) -> usize {
    let video_name = video_dir
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let mut ok = 0;

    for label in label_files(video_dir) {
        // Labels occasionally carry stray non-UTF-8 bytes; decode lossily
        // so the timestamps around them still parse.
        let raw = match std::fs::read(&label) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => continue,
        };
        let interval = match parse_interval(&raw) {
            Some(interval) if interval.is_valid() => interval,
            _ => {
                debug!("Skipping label without a usable interval: {}", label.display());
                continue;
            }
        };

        let dest = clip_dest(save_dir, speaker, video_dir, &label);
        match cutter.cut(source, interval, &dest).await {
            Ok(()) => ok += 1,
            Err(e) => {
                let stem = label.file_stem().unwrap_or_default().to_string_lossy();
                let err_path = logs_dir.join(format!("{video_name}.{stem}.err.txt"));
                let _ = std::fs::write(&err_path, e.to_string());
            }
        }
    }

    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingCutter {
        calls: AtomicUsize,
    }

    impl RecordingCutter {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ClipCutter for RecordingCutter {
        async fn cut(
            &self,
            _source: &ClipSource,
            _interval: Interval,
            dest: &Path,
        ) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(dest, b"RIFF")?;
            Ok(())
        }
    }

    #[test]
    fn test_clip_dest_mapping() {
        let dest = clip_dest(
            Path::new("/out"),
            "spk1",
            Path::new("/meta/spk1/vid_dQw4w9WgXcQ"),
            Path::new("/meta/spk1/vid_dQw4w9WgXcQ/utt_003.txt"),
        );
        assert_eq!(
            dest,
            PathBuf::from("/out/spk1/vid_dQw4w9WgXcQ/utt_003.wav")
        );
    }

    #[test]
    fn test_clip_dest_deterministic() {
        let a = clip_dest(Path::new("/out"), "s", Path::new("v_aaaaaaaaaaa"), Path::new("u.txt"));
        let b = clip_dest(Path::new("/out"), "s", Path::new("v_aaaaaaaaaaa"), Path::new("u.txt"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_clip_dest_keeps_dotted_stems() {
        let a = clip_dest(
            Path::new("/out"),
            "spk1",
            Path::new("vid_dQw4w9WgXcQ"),
            Path::new("utt.001.txt"),
        );
        let b = clip_dest(
            Path::new("/out"),
            "spk1",
            Path::new("vid_dQw4w9WgXcQ"),
            Path::new("utt.002.txt"),
        );
        assert_eq!(a, PathBuf::from("/out/spk1/vid_dQw4w9WgXcQ/utt.001.wav"));
        assert_eq!(b, PathBuf::from("/out/spk1/vid_dQw4w9WgXcQ/utt.002.wav"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_extract_clips_dotted_stems_get_distinct_clips() {
        let tmp = tempfile::tempdir().unwrap();
        let video_dir = tmp.path().join("vid_dQw4w9WgXcQ");
        fs::create_dir_all(&video_dir).unwrap();
        fs::write(video_dir.join("utt.001.txt"), "0.0 1.0").unwrap();
        fs::write(video_dir.join("utt.002.txt"), "2.0 3.0").unwrap();

        let out = tmp.path().join("out");
        let cutter = RecordingCutter::new();
        let n = extract_clips(
            &cutter,
            &ClipSource::Remote("https://cdn.example/audio".to_string()),
            "spk1",
            &video_dir,
            &out,
            &tmp.path().join("logs"),
        )
        .await;

        assert_eq!(n, 2);
        assert_eq!(cutter.calls.load(Ordering::SeqCst), 2);
        let clip_dir = out.join("spk1").join("vid_dQw4w9WgXcQ");
        assert!(clip_dir.join("utt.001.wav").exists());
        assert!(clip_dir.join("utt.002.wav").exists());
    }

    #[tokio::test]
    async fn test_extract_clips_tolerates_invalid_utf8_label() {
        let tmp = tempfile::tempdir().unwrap();
        let video_dir = tmp.path().join("vid_dQw4w9WgXcQ");
        fs::create_dir_all(&video_dir).unwrap();
        fs::write(video_dir.join("utt_000.txt"), b"0.5 2.0 \xff\xfe".as_slice()).unwrap();

        let cutter = RecordingCutter::new();
        let n = extract_clips(
            &cutter,
            &ClipSource::Remote("https://cdn.example/audio".to_string()),
            "spk1",
            &video_dir,
            &tmp.path().join("out"),
            &tmp.path().join("logs"),
        )
        .await;

        // The stray bytes are decoded lossily; the timestamps still parse.
        assert_eq!(n, 1);
        assert_eq!(cutter.calls.load(Ordering::SeqCst), 1);
    }
}

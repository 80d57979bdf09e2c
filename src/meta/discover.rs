use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::error::Result;

/// The unit of work: one video's full set of utterance labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub speaker: String,
    pub video_dir: PathBuf,
    pub video_id: String,
}

fn video_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9_-]{11}").expect("invalid video id regex"))
}

/// Scan a directory name for an embedded 11-character video identifier.
///
/// Metadata directories usually embed the id between separators
/// (`speaker_dQw4w9WgXcQ_clip`), so delimiter-bounded tokens are preferred;
/// a raw 11-character window scan is the fallback for ids that themselves
/// contain `_` or `-`.
pub fn extract_video_id(name: &str) -> Option<String> {
    let token = name
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .find(|part| part.len() == 11);
    if let Some(token) = token {
        return Some(token.to_string());
    }
    video_id_re().find(name).map(|m| m.as_str().to_string())
}

/// Label files for one video, in sorted order.
pub fn label_files(video_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(video_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

/// Walk the metadata tree and produce one job per qualifying video.
///
/// Layout is speaker/video/labels: every first-level subdirectory is a
/// speaker, every second-level subdirectory a video. A video qualifies if it
/// holds at least one `*.txt` label file and its directory name embeds an
/// 11-character identifier; directories without one are skipped silently.
/// Order follows directory traversal and is not stable across platforms.
pub fn discover_jobs(meta_dir: &Path) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();

    for speaker_entry in std::fs::read_dir(meta_dir)? {
        let speaker_dir = speaker_entry?.path();
        if !speaker_dir.is_dir() {
            continue;
        }
        let speaker = match speaker_dir.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => continue,
        };

        for video_entry in std::fs::read_dir(&speaker_dir)? {
            let video_dir = video_entry?.path();
            if !video_dir.is_dir() || label_files(&video_dir).is_empty() {
                continue;
            }
            let dir_name = video_dir.file_name().unwrap_or_default().to_string_lossy();
            match extract_video_id(&dir_name) {
                Some(video_id) => jobs.push(Job {
                    speaker: speaker.clone(),
                    video_dir: video_dir.clone(),
                    video_id,
                }),
                None => debug!("No video id in directory name, skipping: {}", dir_name),
            }
        }
    }

    info!("Prepared {} videos for processing", jobs.len());
    Ok(jobs)
}

/// Total label files across all jobs, for the utterance progress bar.
pub fn count_labels(jobs: &[Job]) -> usize {
    jobs.iter().map(|j| label_files(&j.video_dir).len()).sum()
}

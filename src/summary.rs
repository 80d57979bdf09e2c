use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::pipeline::JobOutcome;

const SUMMARY_FILE: &str = "_summary.csv";
const HEADER: &str = "speaker,video_id,clips_ok,status";

/// Write the per-job ledger to `<out_dir>/_summary.csv`, one row per
/// outcome. Any summary from a prior run is overwritten.
pub fn write_summary(outcomes: &[JobOutcome], out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(SUMMARY_FILE);

    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "{HEADER}")?;
    for outcome in outcomes {
        writeln!(
            file,
            "{},{},{},{}",
            escape(&outcome.speaker),
            escape(&outcome.video_id),
            outcome.clips_ok,
            escape(&outcome.status.to_string())
        )?;
    }
    file.flush()?;

    info!("Summary written: {}", path.display());
    Ok(path)
}

/// Quote a field only when it needs it.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::JobStatus;

    fn outcome(speaker: &str, video_id: &str, clips_ok: usize, status: JobStatus) -> JobOutcome {
        JobOutcome {
            speaker: speaker.to_string(),
            video_id: video_id.to_string(),
            clips_ok,
            status,
        }
    }

    #[test]
    fn test_write_summary() {
        let tmp = tempfile::tempdir().unwrap();
        let outcomes = vec![
            outcome("spk1", "dQw4w9WgXcQ", 12, JobStatus::Ok),
            outcome("spk2", "aaaaaaaaaaa", 0, JobStatus::NoUrl),
            outcome(
                "spk3",
                "bbbbbbbbbbb",
                0,
                JobStatus::DownloadFailed("failed".to_string()),
            ),
        ];

        let path = write_summary(&outcomes, tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join("_summary.csv"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "speaker,video_id,clips_ok,status");
        assert_eq!(lines[1], "spk1,dQw4w9WgXcQ,12,ok");
        assert_eq!(lines[2], "spk2,aaaaaaaaaaa,0,no-url");
        assert_eq!(lines[3], "spk3,bbbbbbbbbbb,0,download-failed:failed");
    }

    #[test]
    fn test_write_summary_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        write_summary(
            &[outcome("a", "ccccccccccc", 1, JobStatus::Ok)],
            tmp.path(),
        )
        .unwrap();
        let path = write_summary(&[], tmp.path()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn test_escape_quoting() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}

use crate::clip::{extract_clips, ClipCutter, ClipSource};
use crate::config::Strategy;
use crate::fetch::{AudioFetcher, DownloadResult};
use crate::meta::{count_labels, Job};
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Terminal status of one job, serialized into the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Ok,
    NoUrl,
    NoValidTimestamps,
    DownloadFailed(String),
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Ok => write!(f, "ok"),
            JobStatus::NoUrl => write!(f, "no-url"),
            JobStatus::NoValidTimestamps => write!(f, "no-valid-ts"),
            JobStatus::DownloadFailed(reason) => write!(f, "download-failed:{reason}"),
        }
    }
}

/// Result of processing a single video job. Produced exactly once per job,
/// in completion order.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub speaker: String,
    pub video_id: String,
    pub clips_ok: usize,
    pub status: JobStatus,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub videos_done: usize,
    pub clips_done: usize,
}

/// Run-wide progress: two counters behind one mutex, mirrored onto two
/// progress bars. Updated once per completed job, success or failure alike.
pub struct Progress {
    counters: Mutex<Counters>,
    videos_bar: Option<ProgressBar>,
    clips_bar: Option<ProgressBar>,
    _multi: Option<MultiProgress>,
}

impl Progress {
    pub fn new(total_videos: u64, total_clips: u64, show: bool) -> Self {
        if !show {
            return Self {
                counters: Mutex::new(Counters::default()),
                videos_bar: None,
                clips_bar: None,
                _multi: None,
            };
        }

        let multi = MultiProgress::new();
        let style = ProgressStyle::default_bar()
            .template("{msg:10} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let videos_bar = multi.add(ProgressBar::new(total_videos));
        videos_bar.set_style(style.clone());
        videos_bar.set_message("Videos");

        let clips_bar = multi.add(ProgressBar::new(total_clips));
        clips_bar.set_style(style);
        clips_bar.set_message("Clips");

        Self {
            counters: Mutex::new(Counters::default()),
            videos_bar: Some(videos_bar),
            clips_bar: Some(clips_bar),
            _multi: Some(multi),
        }
    }

    /// Record one finished job and its clip count. The lock is held only
    /// for the increments.
    pub fn job_done(&self, clips: usize) {
        {
            let mut counters = self.counters.lock().expect("progress mutex poisoned");
            counters.videos_done += 1;
            counters.clips_done += clips;
        }
        if let Some(bar) = &self.videos_bar {
            bar.inc(1);
        }
        if let Some(bar) = &self.clips_bar {
            bar.inc(clips as u64);
        }
    }

    pub fn counters(&self) -> Counters {
        *self.counters.lock().expect("progress mutex poisoned")
    }

    fn finish(&self) {
        if let Some(bar) = &self.videos_bar {
            bar.finish();
        }
        if let Some(bar) = &self.clips_bar {
            bar.finish();
        }
    }
}

/// Dispatches video jobs to a bounded pool of concurrent workers.
///
/// Jobs are fully independent: workers share nothing but the progress
/// counters and write to disjoint output prefixes. Per-job failures become
/// failed outcomes; nothing aborts the batch once dispatch has begun.
pub struct JobOrchestrator {
    fetcher: Arc<dyn AudioFetcher>,
    cutter: Arc<dyn ClipCutter>,
    strategy: Strategy,
    save_dir: PathBuf,
    logs_root: PathBuf,
    raw_root: PathBuf,
    keep_raw: bool,
    workers: usize,
    show_progress: bool,
}

impl JobOrchestrator {
    pub fn new(
        fetcher: Arc<dyn AudioFetcher>,
        cutter: Arc<dyn ClipCutter>,
        strategy: Strategy,
        save_dir: PathBuf,
        tmp_dir: PathBuf,
        workers: usize,
    ) -> Self {
        let logs_root = save_dir.join("_logs");
        let raw_root = tmp_dir.join("raw_full");
        Self {
            fetcher,
            cutter,
            strategy,
            save_dir,
            logs_root,
            raw_root,
            keep_raw: false,
            workers,
            show_progress: true,
        }
    }

    /// Keep full downloaded wavs after cutting (download strategy only).
    pub fn with_keep_raw(mut self, keep: bool) -> Self {
        self.keep_raw = keep;
        self
    }

    /// Enable or disable progress bar display.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Process all jobs and return one outcome per job, in completion order.
    pub async fn run(&self, jobs: Vec<Job>) -> crate::error::Result<Vec<JobOutcome>> {
        let total_jobs = jobs.len();
        let total_labels = count_labels(&jobs);

        std::fs::create_dir_all(&self.save_dir)?;
        std::fs::create_dir_all(&self.logs_root)?;
        if self.strategy == Strategy::Download {
            // A fresh raw area each run; stale partial downloads are useless.
            let _ = std::fs::remove_dir_all(&self.raw_root);
            std::fs::create_dir_all(&self.raw_root)?;
        }

        info!(
            "Processing {} videos ({} labels) with {} workers using {} ({})",
            total_jobs,
            total_labels,
            self.workers,
            self.fetcher.name(),
            self.strategy
        );

        let progress = Progress::new(total_jobs as u64, total_labels as u64, self.show_progress);
        let semaphore = Arc::new(Semaphore::new(self.workers));

        let mut futures = FuturesUnordered::new();
        for job in jobs {
            let sem = semaphore.clone();
            let progress = &progress;
            futures.push(async move {
                let _permit = sem.acquire().await.expect("Semaphore closed");
                debug!("Starting job for video {}", job.video_id);
                self.resolve_and_extract(job, progress).await
            });
        }

        let mut outcomes: Vec<JobOutcome> = Vec::with_capacity(total_jobs);
        while let Some(outcome) = futures.next().await {
            outcomes.push(outcome);
        }

        progress.finish();

        if self.strategy == Strategy::Download && !self.keep_raw {
            let _ = std::fs::remove_dir_all(&self.raw_root);
        }

        let ok = outcomes
            .iter()
            .filter(|o| o.status == JobStatus::Ok)
            .count();
        info!(
            "Run complete: {} ok, {} failed, {} clips",
            ok,
            outcomes.len() - ok,
            progress.counters().clips_done
        );

        Ok(outcomes)
    }

    /// The single strategy-dispatching entry point for one job.
    async fn resolve_and_extract(&self, job: Job, progress: &Progress) -> JobOutcome {
        let vlogs = self.logs_root.join(&job.video_id);
        let _ = std::fs::create_dir_all(&vlogs);

        match self.strategy {
            Strategy::DirectCut => {
                let Some(url) = self.fetcher.resolve_url(&job.video_id).await else {
                    progress.job_done(0);
                    return JobOutcome {
                        speaker: job.speaker,
                        video_id: job.video_id,
                        clips_ok: 0,
                        status: JobStatus::NoUrl,
                    };
                };

                let source = ClipSource::Remote(url);
                let clips_ok = extract_clips(
                    self.cutter.as_ref(),
                    &source,
                    &job.speaker,
                    &job.video_dir,
                    &self.save_dir,
                    &vlogs,
                )
                .await;
                progress.job_done(clips_ok);

                let status = if clips_ok > 0 {
                    JobStatus::Ok
                } else {
                    JobStatus::NoValidTimestamps
                };
                JobOutcome {
                    speaker: job.speaker,
                    video_id: job.video_id,
                    clips_ok,
                    status,
                }
            }
            Strategy::Download => {
                let raw = match self
                    .fetcher
                    .download_wav(&job.video_id, &self.raw_root, &vlogs)
                    .await
                {
                    DownloadResult::Ok(raw) => raw,
                    DownloadResult::Failed(reason) => {
                        progress.job_done(0);
                        return JobOutcome {
                            speaker: job.speaker,
                            video_id: job.video_id,
                            clips_ok: 0,
                            status: JobStatus::DownloadFailed(reason),
                        };
                    }
                };

                let source = ClipSource::Local(raw.clone());
                let clips_ok = extract_clips(
                    self.cutter.as_ref(),
                    &source,
                    &job.speaker,
                    &job.video_dir,
                    &self.save_dir,
                    &vlogs,
                )
                .await;

                if !self.keep_raw {
                    let _ = std::fs::remove_file(&raw);
                }
                progress.job_done(clips_ok);

                JobOutcome {
                    speaker: job.speaker,
                    video_id: job.video_id,
                    clips_ok,
                    status: JobStatus::Ok,
                }
            }
        }
    }
}

/// Print a console summary of the run.
pub fn print_summary(outcomes: &[JobOutcome], save_dir: &std::path::Path) {
    let ok = outcomes
        .iter()
        .filter(|o| o.status == JobStatus::Ok)
        .count();
    let clips: usize = outcomes.iter().map(|o| o.clips_ok).sum();
    let failed = outcomes.len() - ok;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                    Dataset Extraction Complete                 ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Videos:   {} ok, {} failed", ok, failed);
    println!("  Clips:    {}", clips);
    println!("  Output:   {}", save_dir.display());
    println!("  Logs:     {}", save_dir.join("_logs").display());
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

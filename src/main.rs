use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use voxclip::clip::{check_ffmpeg, Ffmpeg};
use voxclip::config::{Config, CookieSource, Strategy};
use voxclip::fetch::{check_ytdlp, YtDlp};
use voxclip::meta::{discover_jobs, resolve_meta_dir};
use voxclip::{print_summary, write_summary, JobOrchestrator};

#[derive(Parser)]
#[command(name = "voxclip")]
#[command(version, about = "Extract labeled utterance clips from remote videos")]
#[command(
    long_about = "Walk a speaker/video metadata tree, resolve each video to an audio source \
via yt-dlp and cut labeled utterance clips with ffmpeg into a structured output tree."
)]
struct Cli {
    /// Metadata source: a directory of speaker subdirectories or a .tar.gz archive
    meta_src: PathBuf,

    /// Output directory for clips, logs and the summary
    #[arg(short, long)]
    output: PathBuf,

    /// Temp directory for archive extraction and raw downloads (defaults to <output>/_tmp)
    #[arg(long)]
    tmp_dir: Option<PathBuf>,

    /// Strategy: direct-cut (stream and seek remotely) or download (fetch full audio first)
    #[arg(short, long)]
    strategy: Option<String>,

    /// Target sample rate for output clips
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Number of concurrent per-video workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Keep full downloaded wavs after cutting (download strategy only)
    #[arg(long)]
    keep_raw: bool,

    /// Pass browser cookies to the downloader
    #[arg(long, conflicts_with = "cookies")]
    cookies_from_browser: bool,

    /// Netscape-format cookie file for the downloader
    #[arg(long)]
    cookies: Option<PathBuf>,

    /// Force IPv4 for downloads
    #[arg(long)]
    force_ipv4: bool,

    /// Chunked-download size passed to the downloader (e.g. 10M)
    #[arg(long)]
    http_chunk_size: Option<String>,

    /// Audio format selector for the downloader
    #[arg(long)]
    audio_format: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(strategy) = &cli.strategy {
        let strategy: Strategy = strategy.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        config.strategy = strategy;
    }
    if let Some(sample_rate) = cli.sample_rate {
        config.sample_rate = sample_rate;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if cli.keep_raw {
        config.keep_raw = true;
    }
    if cli.cookies_from_browser {
        config.cookies = CookieSource::Browser;
    } else if let Some(path) = &cli.cookies {
        config.cookies = CookieSource::File(path.clone());
    }
    if cli.force_ipv4 {
        config.force_ipv4 = true;
    }
    if let Some(size) = &cli.http_chunk_size {
        config.http_chunk_size = Some(size.clone());
    }
    if let Some(selector) = &cli.audio_format {
        config.audio_format = selector.clone();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load and validate configuration
    let mut config = Config::load().context("Failed to load configuration")?;
    apply_cli_overrides(&mut config, &cli)?;
    config.validate().context("Configuration validation failed")?;

    // External tools are required before any job runs
    check_ffmpeg().context("ffmpeg check failed")?;
    check_ytdlp().context("yt-dlp check failed")?;

    let tmp_dir = cli
        .tmp_dir
        .clone()
        .unwrap_or_else(|| cli.output.join("_tmp"));
    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory {}", cli.output.display()))?;
    std::fs::create_dir_all(&tmp_dir)
        .with_context(|| format!("Failed to create temp directory {}", tmp_dir.display()))?;

    let meta_dir = resolve_meta_dir(&cli.meta_src, &tmp_dir)
        .context("Failed to resolve metadata source")?;

    info!("Metadata: {}", meta_dir.display());
    info!("Output:   {}", cli.output.display());
    info!("Strategy: {}", config.strategy);
    info!("Workers:  {}", config.workers);

    let jobs = discover_jobs(&meta_dir).context("Failed to discover jobs")?;

    let fetcher = Arc::new(YtDlp::new(&config));
    let cutter = Arc::new(Ffmpeg::new(config.sample_rate));
    let orchestrator = JobOrchestrator::new(
        fetcher,
        cutter,
        config.strategy,
        cli.output.clone(),
        tmp_dir,
        config.workers,
    )
    .with_keep_raw(config.keep_raw);

    let outcomes = orchestrator
        .run(jobs)
        .await
        .context("Job orchestration failed")?;

    print_summary(&outcomes, &cli.output);
    let summary_path = write_summary(&outcomes, &cli.output).context("Failed to write summary")?;
    info!("Summary: {}", summary_path.display());

    Ok(())
}

use crate::error::{Result, VoxclipError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How audio is obtained before clips are cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Resolve a streamable URL and seek into it remotely.
    #[default]
    DirectCut,
    /// Download and transcode the full audio locally, then cut.
    Download,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::DirectCut => write!(f, "direct-cut"),
            Strategy::Download => write!(f, "download"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct-cut" | "direct" => Ok(Strategy::DirectCut),
            "download" => Ok(Strategy::Download),
            _ => Err(format!(
                "Unknown strategy: {}. Use 'direct-cut' or 'download'",
                s
            )),
        }
    }
}

/// Where yt-dlp gets its cookies from, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieSource {
    #[default]
    None,
    /// `--cookies-from-browser chrome:profile=Default`
    Browser,
    /// `--cookies <file>` with a Netscape-format cookie jar.
    File(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target sample rate for every output clip.
    pub sample_rate: u32,
    /// Number of concurrent per-video workers.
    pub workers: usize,
    pub strategy: Strategy,
    /// Keep the full downloaded wav after cutting (download strategy only).
    pub keep_raw: bool,
    pub cookies: CookieSource,
    pub force_ipv4: bool,
    /// Passed through to yt-dlp as `--http-chunk-size`.
    pub http_chunk_size: Option<String>,
    /// yt-dlp format selector, e.g. "bestaudio".
    pub audio_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            workers: 10,
            strategy: Strategy::default(),
            keep_raw: false,
            cookies: CookieSource::default(),
            force_ipv4: false,
            http_chunk_size: None,
            audio_format: "bestaudio".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(workers) = std::env::var("VOXCLIP_WORKERS") {
            if let Ok(w) = workers.parse() {
                config.workers = w;
            }
        }
        if let Ok(sr) = std::env::var("VOXCLIP_SAMPLE_RATE") {
            if let Ok(sr) = sr.parse() {
                config.sample_rate = sr;
            }
        }
        if let Ok(strategy) = std::env::var("VOXCLIP_STRATEGY") {
            if let Ok(s) = strategy.parse() {
                config.strategy = s;
            }
        }
        if let Ok(selector) = std::env::var("VOXCLIP_AUDIO_FORMAT") {
            config.audio_format = selector;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(VoxclipError::Config(
                "Worker count must be greater than 0".to_string(),
            ));
        }

        if self.sample_rate == 0 {
            return Err(VoxclipError::Config(
                "Sample rate must be greater than 0".to_string(),
            ));
        }

        if let CookieSource::File(path) = &self.cookies {
            if !path.exists() {
                return Err(VoxclipError::Config(format!(
                    "Cookie file not found: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("voxclip").join("config.toml"))
    }
}

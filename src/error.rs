use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxclipError {
    #[error("Metadata source error: {0}")]
    MetaSource(String),

    #[error("Clip extraction failed: {0}")]
    ClipExtraction(String),

    #[error("Downloader error: {0}")]
    Fetch(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VoxclipError>;

pub mod clip;
pub mod config;
pub mod error;
pub mod fetch;
pub mod meta;
pub mod pipeline;
pub mod summary;

pub use config::{Config, CookieSource, Strategy};
pub use error::{Result, VoxclipError};
pub use pipeline::{print_summary, JobOrchestrator, JobOutcome, JobStatus};
pub use summary::write_summary;

pub mod discover;
pub mod source;
pub mod timestamp;

pub use discover::{count_labels, discover_jobs, extract_video_id, label_files, Job};
pub use source::resolve_meta_dir;
pub use timestamp::{parse_interval, Interval};

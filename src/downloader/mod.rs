// src/downloader/mod.rs

mod job;
mod download_log;
mod sequencer;
mod status;
mod supervisor;

pub use job::{JobRunner, OutputOrder};
pub use download_log::DownloadLog;
pub use sequencer::{JobBatch, run_batch};
pub use status::{ActiveJobRegistry, StatusCoordinator};
pub use supervisor::Supervisor;

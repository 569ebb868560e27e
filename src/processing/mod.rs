//! Background ingestion job processing

mod job_queue;
mod worker;

pub use job_queue::{FileQueue, JobStatus};
pub use worker::{IngestJob, IngestWorker};

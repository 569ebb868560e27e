//! Background queue for ingestion jobs
//!
//! Jobs run on a bounded pool with a minimum spacing between dispatches, so a
//! burst of uploads cannot saturate the partition service or the vision
//! endpoint. A failed job is recorded and logged; it never stops the queue.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tracing::info;
use uuid::Uuid;

use crate::config::QueueConfig;

use super::worker::{log_job_failure, IngestJob, IngestWorker};

/// Lifecycle of a queued job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed(String),
}

struct QueuedJob {
    id: Uuid,
    job: IngestJob,
}

/// Handle to the background ingestion queue
pub struct FileQueue {
    sender: mpsc::UnboundedSender<QueuedJob>,
    statuses: Arc<DashMap<Uuid, JobStatus>>,
}

impl FileQueue {
    /// Start the queue's dispatcher task
    pub fn start(config: QueueConfig, worker: Arc<IngestWorker>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let statuses: Arc<DashMap<Uuid, JobStatus>> = Arc::new(DashMap::new());

        tokio::spawn(dispatch_loop(config, worker, receiver, statuses.clone()));

        Self { sender, statuses }
    }

    /// Enqueue a job, returning its id. The call never blocks.
    pub fn submit(&self, job: IngestJob) -> Uuid {
        let id = Uuid::new_v4();
        self.statuses.insert(id, JobStatus::Queued);
        // Receiver lives as long as the dispatcher task; a send failure means
        // the process is shutting down, and the status map reflects that.
        if self.sender.send(QueuedJob { id, job }).is_err() {
            self.statuses
                .insert(id, JobStatus::Failed("queue is shut down".to_string()));
        }
        id
    }

    /// Current status of a submitted job
    pub fn status(&self, id: Uuid) -> Option<JobStatus> {
        self.statuses.get(&id).map(|s| s.clone())
    }

    /// Number of jobs not yet finished
    pub fn pending(&self) -> usize {
        self.statuses
            .iter()
            .filter(|entry| matches!(entry.value(), JobStatus::Queued | JobStatus::Running))
            .count()
    }
}

async fn dispatch_loop(
    config: QueueConfig,
    worker: Arc<IngestWorker>,
    mut receiver: mpsc::UnboundedReceiver<QueuedJob>,
    statuses: Arc<DashMap<Uuid, JobStatus>>,
) {
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let spacing = Duration::from_millis(config.dispatch_interval_ms);

    while let Some(queued) = receiver.recv().await {
        let permit = semaphore.clone().acquire_owned().await.unwrap();
        let worker = worker.clone();
        let statuses = statuses.clone();

        tokio::spawn(async move {
            let _permit = permit;
            statuses.insert(queued.id, JobStatus::Running);
            info!(job_id = %queued.id, related_id = %queued.job.related_id, "dispatching ingestion job");

            match worker.process(queued.job).await {
                Ok(()) => {
                    statuses.insert(queued.id, JobStatus::Completed);
                }
                Err(e) => {
                    log_job_failure(queued.id, &e);
                    statuses.insert(queued.id, JobStatus::Failed(e.to_string()));
                }
            }
        });

        // Minimum spacing between dispatches, independent of job duration
        tokio::time::sleep(spacing).await;
    }
}

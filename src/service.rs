//! Ingestion service facade
//!
//! Wires the pipeline together and exposes the upload entry point: create a
//! placeholder collection, enqueue the background job, and acknowledge
//! immediately. Extraction, chunking, and the training commit all happen
//! after the caller has its collection id.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::IngestConfig;
use crate::describe::ElementDescriber;
use crate::error::Result;
use crate::extract::{PdfExtractor, RawTextExtractor};
use crate::markdown::MarkdownImageRewriter;
use crate::partition::PartitionClient;
use crate::processing::{FileQueue, IngestJob, IngestWorker, JobStatus};
use crate::providers::{
    dataset_store::CollectionPlaceholder, BlobStoreProvider, DatasetStoreProvider, FormatParser,
    ImageStoreProvider, TrainingDispatchProvider, VisionProvider,
};
use crate::types::{DatasetContext, TrainingMode};

/// One local file upload
#[derive(Debug, Clone)]
pub struct UploadParams {
    pub team_id: String,
    pub dataset: DatasetContext,
    /// Original filename; its extension drives extraction dispatch
    pub filename: String,
    /// Spooled upload on local disk
    pub file_path: PathBuf,
    pub training_mode: TrainingMode,
    /// Target chunk size; falls back to the configured default
    pub chunk_size: Option<usize>,
    pub chunk_splitter: Option<String>,
    pub qa_prompt: Option<String>,
    /// Structured Q/A import (affects tabular extraction)
    pub qa_import: bool,
}

/// Immediate acknowledgment of an accepted upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Placeholder collection id; its content fields fill in once the
    /// background job commits
    pub collection_id: String,
    /// Background job id for status polling
    pub job_id: Uuid,
    /// Correlation id shared by the job and its side-uploaded images
    pub related_id: String,
}

/// The assembled ingestion pipeline
pub struct IngestService {
    dataset_store: Arc<dyn DatasetStoreProvider>,
    queue: FileQueue,
    default_chunk_size: usize,
}

impl IngestService {
    /// Assemble the pipeline from configuration and providers
    pub fn new(
        config: IngestConfig,
        vision: Arc<dyn VisionProvider>,
        image_store: Arc<dyn ImageStoreProvider>,
        blob_store: Arc<dyn BlobStoreProvider>,
        dataset_store: Arc<dyn DatasetStoreProvider>,
        training: Arc<dyn TrainingDispatchProvider>,
        parser: Arc<dyn FormatParser>,
    ) -> Result<Self> {
        let rewriter = Arc::new(MarkdownImageRewriter::new(image_store));
        let describer = Arc::new(ElementDescriber::new(
            vision,
            rewriter.clone(),
            config.queue.describe_concurrency,
        ));
        let partition = Arc::new(PartitionClient::new(config.partition.clone())?);
        let pdf = Arc::new(PdfExtractor::new(
            partition,
            describer,
            config.vision.model.clone(),
        ));
        let extractor = Arc::new(RawTextExtractor::new(pdf, parser, rewriter));

        let worker = Arc::new(IngestWorker::new(
            extractor,
            blob_store,
            dataset_store.clone(),
            training,
        ));
        let queue = FileQueue::start(config.queue.clone(), worker);

        Ok(Self {
            dataset_store,
            queue,
            default_chunk_size: config.chunking.chunk_size,
        })
    }

    /// Accept a local file upload.
    ///
    /// Returns as soon as the placeholder collection exists and the job is
    /// queued. The placeholder's hash, length and file id stay empty until
    /// the job commits.
    pub async fn ingest_local_file(&self, params: UploadParams) -> Result<UploadReceipt> {
        let related_id = Uuid::new_v4().simple().to_string();
        let extension = file_extension(&params.filename);
        let chunk_size = params.chunk_size.unwrap_or(self.default_chunk_size);

        let placeholder = CollectionPlaceholder {
            team_id: params.team_id.clone(),
            dataset_id: params.dataset.dataset_id.clone(),
            name: params.filename.clone(),
            training_mode: params.training_mode,
            chunk_size,
            chunk_splitter: params.chunk_splitter.clone(),
            qa_prompt: params.qa_prompt.clone(),
            related_id: related_id.clone(),
        };
        let collection_id = self.dataset_store.create_collection(&placeholder).await?;

        let job_id = self.queue.submit(IngestJob {
            team_id: params.team_id,
            dataset: params.dataset,
            collection_id: collection_id.clone(),
            filename: params.filename,
            extension,
            file_path: params.file_path,
            related_id: related_id.clone(),
            training_mode: params.training_mode,
            chunk_size,
            chunk_splitter: params.chunk_splitter,
            qa_import: params.qa_import,
        });

        info!(%collection_id, %job_id, %related_id, "upload accepted");
        Ok(UploadReceipt {
            collection_id,
            job_id,
            related_id,
        })
    }

    /// Status of a previously accepted upload's background job
    pub fn job_status(&self, job_id: Uuid) -> Option<JobStatus> {
        self.queue.status(job_id)
    }

    /// Number of jobs still queued or running
    pub fn pending_jobs(&self) -> usize {
        self.queue.pending()
    }
}

/// Lowercased extension of a filename, empty when it has none
fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

//! Ingestion worker: one upload from temp file to committed training items
//!
//! The worker owns the full job body: read the spooled file, extract raw
//! text, move the original into blob storage, split into chunks, check the
//! team quota, and commit everything in one transaction before waking the
//! training consumer. Any failure leaves the placeholder collection in its
//! empty state; the temp file is removed on both arms.

use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::chunking::TextChunker;
use crate::error::Result;
use crate::extract::{detect_encoding, RawTextExtractor};
use crate::providers::{BlobStoreProvider, DatasetStoreProvider, TrainingDispatchProvider};
use crate::types::{
    CollectionUpdate, DatasetContext, ExtractionRequest, IngestionCommit, TrainingMode,
    TrainingQueueItem, TrainingUsage, RELATED_ID_KEY,
};

/// One queued ingestion job
#[derive(Debug, Clone)]
pub struct IngestJob {
    pub team_id: String,
    pub dataset: DatasetContext,
    /// Placeholder collection created at submission time
    pub collection_id: String,
    /// Original filename, used as the collection/bill name
    pub filename: String,
    /// Declared file extension
    pub extension: String,
    /// Spooled upload on local disk; removed when the job finishes
    pub file_path: PathBuf,
    /// Correlation id tying side-uploaded images to this job
    pub related_id: String,
    pub training_mode: TrainingMode,
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Custom chunk delimiter; disables overlap when set
    pub chunk_splitter: Option<String>,
    /// Structured Q/A import (affects tabular extraction)
    pub qa_import: bool,
}

/// Executes ingestion jobs against the injected providers
pub struct IngestWorker {
    extractor: Arc<RawTextExtractor>,
    blob_store: Arc<dyn BlobStoreProvider>,
    dataset_store: Arc<dyn DatasetStoreProvider>,
    training: Arc<dyn TrainingDispatchProvider>,
}

impl IngestWorker {
    pub fn new(
        extractor: Arc<RawTextExtractor>,
        blob_store: Arc<dyn BlobStoreProvider>,
        dataset_store: Arc<dyn DatasetStoreProvider>,
        training: Arc<dyn TrainingDispatchProvider>,
    ) -> Self {
        Self {
            extractor,
            blob_store,
            dataset_store,
            training,
        }
    }

    /// Run one job, cleaning up the temp file on failure.
    ///
    /// Failures are returned for status tracking but never propagate further:
    /// the queue logs them and moves on.
    pub async fn process(&self, job: IngestJob) -> Result<()> {
        let result = self.run(&job).await;
        if result.is_err() {
            self.remove_temp_file(&job).await;
        }
        result
    }

    async fn run(&self, job: &IngestJob) -> Result<()> {
        info!(
            related_id = %job.related_id,
            collection_id = %job.collection_id,
            filename = %job.filename,
            "starting ingestion job"
        );

        let data = tokio::fs::read(&job.file_path).await?;
        let encoding = detect_encoding(&data);

        let mut request = ExtractionRequest::new(
            job.team_id.clone(),
            Bytes::from(data.clone()),
            job.extension.clone(),
        )
        .with_related_id(job.related_id.clone());
        request.encoding = encoding.to_string();
        request.dataset = Some(job.dataset.clone());
        request.qa_import = job.qa_import;

        let extracted = self.extractor.extract(&request).await?;

        let content_type = mime_guess::from_path(&job.filename)
            .first_or_octet_stream()
            .to_string();
        let mut blob_metadata = HashMap::new();
        blob_metadata.insert(RELATED_ID_KEY.to_string(), job.related_id.clone());
        let file_id = self
            .blob_store
            .upload(&data, &job.filename, &content_type, &blob_metadata)
            .await?;

        self.remove_temp_file(job).await;

        let chunker = TextChunker::new(job.chunk_size, job.training_mode.overlap_ratio());
        let delimiters: Vec<String> = job.chunk_splitter.iter().cloned().collect();
        let chunks = chunker.split(&extracted.raw_text, &delimiters);

        let predicted = job.training_mode.predicted_items(chunks.len());
        self.dataset_store
            .check_dataset_limit(&job.team_id, predicted)
            .await?;

        let raw_text_length = extracted.raw_text.chars().count();
        let hash_raw_text = hex::encode(Sha256::digest(extracted.raw_text.as_bytes()));

        let items: Vec<TrainingQueueItem> = chunks
            .into_iter()
            .map(|chunk| TrainingQueueItem {
                team_id: job.team_id.clone(),
                dataset_id: job.dataset.dataset_id.clone(),
                collection_id: job.collection_id.clone(),
                text: chunk.text,
                chunk_index: chunk.chunk_index,
                training_mode: job.training_mode,
                bill_id: None,
            })
            .collect();
        let item_count = items.len();

        let commit = IngestionCommit {
            collection: CollectionUpdate {
                collection_id: job.collection_id.clone(),
                hash_raw_text,
                raw_text_length,
                file_id,
            },
            usage: TrainingUsage {
                team_id: job.team_id.clone(),
                app_name: job.filename.clone(),
                vector_model: job.dataset.vector_model.clone(),
                agent_model: job.dataset.agent_model.clone(),
            },
            items,
            team_id: job.team_id.clone(),
            related_id: job.related_id.clone(),
        };
        let bill_id = self.dataset_store.commit_ingestion(commit).await?;

        self.training.wake().await;

        info!(
            related_id = %job.related_id,
            collection_id = %job.collection_id,
            %bill_id,
            items = item_count,
            "ingestion job committed"
        );
        Ok(())
    }

    async fn remove_temp_file(&self, job: &IngestJob) {
        match tokio::fs::remove_file(&job.file_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(
                    related_id = %job.related_id,
                    path = %job.file_path.display(),
                    error = %e,
                    "failed to remove temp file"
                );
            }
        }
    }
}

/// Log a failed job; jobs never fail the queue itself
pub(super) fn log_job_failure(job_id: uuid::Uuid, error: &crate::error::Error) {
    error!(%job_id, %error, "ingestion job failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use parking_lot::Mutex;
    use std::io::Write;

    use crate::config::PartitionConfig;
    use crate::describe::ElementDescriber;
    use crate::error::Error;
    use crate::markdown::MarkdownImageRewriter;
    use crate::partition::PartitionClient;
    use crate::providers::{ImageStoreProvider, PlainTextParser, VisionProvider};
    use crate::extract::PdfExtractor;

    struct NullVision;

    #[async_trait]
    impl VisionProvider for NullVision {
        async fn describe_image(&self, _: &str, _: &str, _: &str) -> Result<String> {
            Ok(String::new())
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    struct NullImageStore;

    #[async_trait]
    impl ImageStoreProvider for NullImageStore {
        async fn upload_image(&self, _: &str, _: &str, _: &str, _: DateTime<Utc>) -> Result<String> {
            Ok("https://img.example/1".to_string())
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    #[derive(Default)]
    struct MockBlobStore {
        uploads: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl BlobStoreProvider for MockBlobStore {
        async fn upload(
            &self,
            data: &[u8],
            filename: &str,
            _content_type: &str,
            _metadata: &HashMap<String, String>,
        ) -> Result<String> {
            self.uploads.lock().push((filename.to_string(), data.len()));
            Ok("file-123".to_string())
        }

        async fn read_by_id(&self, _file_id: &str) -> Result<crate::providers::StoredBlob> {
            Err(Error::BlobStore("not implemented".to_string()))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[derive(Default)]
    struct MockDatasetStore {
        remaining: Option<usize>,
        commits: Mutex<Vec<IngestionCommit>>,
    }

    #[async_trait]
    impl DatasetStoreProvider for MockDatasetStore {
        async fn create_collection(
            &self,
            _placeholder: &crate::providers::dataset_store::CollectionPlaceholder,
        ) -> Result<String> {
            Ok("col-1".to_string())
        }

        async fn check_dataset_limit(&self, _team_id: &str, insert_len: usize) -> Result<()> {
            match self.remaining {
                Some(remaining) if insert_len > remaining => Err(Error::QuotaExceeded {
                    needed: insert_len,
                    remaining,
                }),
                _ => Ok(()),
            }
        }

        async fn commit_ingestion(&self, commit: IngestionCommit) -> Result<String> {
            self.commits.lock().push(commit);
            Ok("bill-1".to_string())
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[derive(Default)]
    struct MockTraining {
        wakes: Mutex<usize>,
    }

    #[async_trait]
    impl TrainingDispatchProvider for MockTraining {
        async fn wake(&self) {
            *self.wakes.lock() += 1;
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    struct Fixture {
        worker: IngestWorker,
        blob_store: Arc<MockBlobStore>,
        dataset_store: Arc<MockDatasetStore>,
        training: Arc<MockTraining>,
    }

    fn fixture(remaining_quota: Option<usize>) -> Fixture {
        let rewriter = Arc::new(MarkdownImageRewriter::new(Arc::new(NullImageStore)));
        let describer = Arc::new(ElementDescriber::new(Arc::new(NullVision), rewriter.clone(), 3));
        let partition = Arc::new(PartitionClient::new(PartitionConfig::default()).unwrap());
        let pdf = Arc::new(PdfExtractor::new(partition, describer, "vision-model"));
        let extractor = Arc::new(RawTextExtractor::new(pdf, Arc::new(PlainTextParser), rewriter));

        let blob_store = Arc::new(MockBlobStore::default());
        let dataset_store = Arc::new(MockDatasetStore {
            remaining: remaining_quota,
            commits: Mutex::new(Vec::new()),
        });
        let training = Arc::new(MockTraining::default());

        Fixture {
            worker: IngestWorker::new(
                extractor,
                blob_store.clone(),
                dataset_store.clone(),
                training.clone(),
            ),
            blob_store,
            dataset_store,
            training,
        }
    }

    fn spool(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    fn job(path: PathBuf) -> IngestJob {
        IngestJob {
            team_id: "team-1".to_string(),
            dataset: DatasetContext {
                dataset_id: "ds-1".to_string(),
                agent_model: None,
                vector_model: Some("embed-1".to_string()),
            },
            collection_id: "col-1".to_string(),
            filename: "upload.txt".to_string(),
            extension: "txt".to_string(),
            file_path: path,
            related_id: "rel-1".to_string(),
            training_mode: TrainingMode::Chunk,
            chunk_size: 512,
            chunk_splitter: None,
            qa_import: false,
        }
    }

    #[tokio::test]
    async fn successful_job_commits_and_wakes_training() {
        let fixture = fixture(None);
        let content = "A first sentence of body text. A second sentence of body text.";
        let (_dir, path) = spool(content);

        fixture.worker.process(job(path.clone())).await.unwrap();

        assert_eq!(fixture.blob_store.uploads.lock().len(), 1);
        assert!(!path.exists(), "temp file should be removed");

        let commits = fixture.dataset_store.commits.lock();
        assert_eq!(commits.len(), 1);
        let commit = &commits[0];
        assert_eq!(commit.collection.file_id, "file-123");
        assert_eq!(commit.collection.raw_text_length, content.chars().count());
        assert_eq!(
            commit.collection.hash_raw_text,
            hex::encode(Sha256::digest(content.as_bytes()))
        );
        assert_eq!(commit.related_id, "rel-1");
        assert!(!commit.items.is_empty());
        assert_eq!(commit.usage.app_name, "upload.txt");

        assert_eq!(*fixture.training.wakes.lock(), 1);
    }

    #[tokio::test]
    async fn quota_failure_aborts_before_any_write() {
        let fixture = fixture(Some(0));
        let (_dir, path) = spool("Some body text to chunk.");

        let err = fixture.worker.process(job(path.clone())).await.unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { .. }));

        assert!(fixture.dataset_store.commits.lock().is_empty());
        assert_eq!(*fixture.training.wakes.lock(), 0);
        assert!(!path.exists(), "temp file removed on the failure arm too");
    }

    #[tokio::test]
    async fn missing_temp_file_fails_cleanly() {
        let fixture = fixture(None);
        let err = fixture
            .worker
            .process(job(PathBuf::from("/nonexistent/upload.txt")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(fixture.blob_store.uploads.lock().is_empty());
    }

    #[tokio::test]
    async fn custom_splitter_disables_overlap() {
        let fixture = fixture(None);
        let (_dir, path) = spool("part one###part two###part three");
        let mut job = job(path);
        job.chunk_splitter = Some("###".to_string());

        fixture.worker.process(job).await.unwrap();

        let commits = fixture.dataset_store.commits.lock();
        let texts: Vec<&str> = commits[0].items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["part one", "part two", "part three"]);
    }
}

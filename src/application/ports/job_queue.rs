use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug)]
pub enum JobQueueError {
    QueueClosed,
}

impl std::fmt::Display for JobQueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobQueueError::QueueClosed => write!(f, "Job queue is closed"),
        }
    }
}

impl std::error::Error for JobQueueError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentJob {
    /// Chunk, embed and store a document, then analyse it if financial.
    Process(Uuid),
    /// Re-run transaction extraction over already stored chunks.
    AnalyzeFinancial(Uuid),
}

impl DocumentJob {
    pub fn document_id(&self) -> Uuid {
        match self {
            DocumentJob::Process(id) | DocumentJob::AnalyzeFinancial(id) => *id,
        }
    }
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: DocumentJob) -> Result<(), JobQueueError>;

    /// Jobs sent but not yet picked up by a worker.
    async fn size(&self) -> usize;
}

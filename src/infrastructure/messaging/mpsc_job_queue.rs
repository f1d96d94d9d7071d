use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use crate::application::ports::{DocumentJob, JobQueue, JobQueueError};

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueStats {
    pub total_enqueued: u64,
    pub total_dequeued: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

impl QueueStats {
    pub fn pending(&self) -> usize {
        self.total_enqueued.saturating_sub(self.total_dequeued) as usize
    }
}

/// Sending half of the in-process document job queue.
pub struct MpscJobQueue {
    sender: mpsc::UnboundedSender<DocumentJob>,
    stats: Arc<Mutex<QueueStats>>,
}

impl MpscJobQueue {
    /// Builds the queue and the receiver shared by the background workers.
    pub fn create_pair() -> (Self, MpscJobQueueReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let stats = Arc::new(Mutex::new(QueueStats::default()));

        let queue = Self {
            sender,
            stats: stats.clone(),
        };
        let worker_side = MpscJobQueueReceiver {
            receiver: Mutex::new(receiver),
            stats,
        };

        (queue, worker_side)
    }

    pub async fn stats(&self) -> QueueStats {
        self.stats.lock().await.clone()
    }
}

#[async_trait]
impl JobQueue for MpscJobQueue {
    async fn enqueue(&self, job: DocumentJob) -> Result<(), JobQueueError> {
        self.sender
            .send(job)
            .map_err(|_| JobQueueError::QueueClosed)?;

        let mut stats = self.stats.lock().await;
        stats.total_enqueued += 1;
        stats.last_activity = Some(Utc::now());
        Ok(())
    }

    async fn size(&self) -> usize {
        self.stats.lock().await.pending()
    }
}

/// Receiving half. Workers take turns holding the lock while waiting.
pub struct MpscJobQueueReceiver {
    receiver: Mutex<mpsc::UnboundedReceiver<DocumentJob>>,
    stats: Arc<Mutex<QueueStats>>,
}

impl MpscJobQueueReceiver {
    /// Next job, or `None` once every sender is gone.
    pub async fn recv(&self) -> Option<DocumentJob> {
        let job = {
            let mut receiver = self.receiver.lock().await;
            receiver.recv().await
        };

        if job.is_some() {
            let mut stats = self.stats.lock().await;
            stats.total_dequeued += 1;
            stats.last_activity = Some(Utc::now());
        }
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_enqueue_and_receive_in_order() {
        let (queue, receiver) = MpscJobQueue::create_pair();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        queue.enqueue(DocumentJob::Process(first)).await.unwrap();
        queue
            .enqueue(DocumentJob::AnalyzeFinancial(second))
            .await
            .unwrap();
        assert_eq!(queue.size().await, 2);

        assert_eq!(receiver.recv().await, Some(DocumentJob::Process(first)));
        assert_eq!(queue.size().await, 1);
        assert_eq!(
            receiver.recv().await,
            Some(DocumentJob::AnalyzeFinancial(second))
        );

        let stats = queue.stats().await;
        assert_eq!(stats.total_enqueued, 2);
        assert_eq!(stats.total_dequeued, 2);
        assert!(stats.last_activity.is_some());
    }

    #[tokio::test]
    async fn test_closed_when_receiver_dropped() {
        let (queue, receiver) = MpscJobQueue::create_pair();
        drop(receiver);

        let result = queue.enqueue(DocumentJob::Process(Uuid::new_v4())).await;
        assert!(matches!(result, Err(JobQueueError::QueueClosed)));
    }

    #[tokio::test]
    async fn test_receiver_ends_when_queue_dropped() {
        let (queue, receiver) = MpscJobQueue::create_pair();
        drop(queue);
        assert!(receiver.recv().await.is_none());
    }
}

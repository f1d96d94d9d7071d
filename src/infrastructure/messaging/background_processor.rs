use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::DocumentJob;
use crate::application::services::{DocumentProcessorService, FinancialAnalyzer};
use crate::domain::entities::Document;
use crate::domain::repositories::DocumentRepository;
use crate::domain::value_objects::DocumentStatus;
use crate::infrastructure::messaging::MpscJobQueueReceiver;

pub struct BackgroundProcessor {
    job_receiver: Arc<MpscJobQueueReceiver>,
    document_repository: Arc<dyn DocumentRepository>,
    document_processor: Arc<DocumentProcessorService>,
    financial_analyzer: Arc<FinancialAnalyzer>,
    worker_count: usize,
}

impl BackgroundProcessor {
    pub fn new(
        job_receiver: Arc<MpscJobQueueReceiver>,
        document_repository: Arc<dyn DocumentRepository>,
        document_processor: Arc<DocumentProcessorService>,
        financial_analyzer: Arc<FinancialAnalyzer>,
    ) -> Self {
        Self {
            job_receiver,
            document_repository,
            document_processor,
            financial_analyzer,
            worker_count: 3,
        }
    }

    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }

    /// Runs the workers until the queue's sending side is dropped.
    pub async fn start(self: Arc<Self>) {
        tracing::info!(
            "Starting background processor with {} workers",
            self.worker_count
        );

        let mut handles = Vec::new();
        for worker_id in 0..self.worker_count {
            let processor = self.clone();
            handles.push(tokio::spawn(async move {
                processor.worker_loop(worker_id).await;
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} panicked: {}", i, e);
            }
        }

        tracing::info!("Background processor stopped");
    }

    async fn worker_loop(&self, worker_id: usize) {
        tracing::debug!("Worker {} started", worker_id);

        while let Some(job) = self.job_receiver.recv().await {
            tracing::info!("Worker {} picked {:?}", worker_id, job);
            match job {
                DocumentJob::Process(id) => self.process_document(id).await,
                DocumentJob::AnalyzeFinancial(id) => self.analyze_document(id).await,
            }
        }

        tracing::debug!("Worker {} stopped", worker_id);
    }

    async fn process_document(&self, document_id: Uuid) {
        let start_time = std::time::Instant::now();

        match self.document_processor.process(document_id).await {
            Ok(outcome) => {
                tracing::info!(
                    "Document {} processed into {} chunks in {:.2}s",
                    document_id,
                    outcome.chunk_count,
                    start_time.elapsed().as_secs_f64()
                );
                if outcome.document.is_financial() && outcome.chunk_count > 0 {
                    self.run_analysis(&outcome.document).await;
                }
            }
            Err(e) => tracing::error!("Document {} failed: {}", document_id, e),
        }
    }

    async fn analyze_document(&self, document_id: Uuid) {
        let document = match self.document_repository.find_by_id(document_id).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::warn!("Document {} vanished before analysis", document_id);
                return;
            }
            Err(e) => {
                tracing::error!("Failed to load document {}: {}", document_id, e);
                return;
            }
        };

        if document.status() != DocumentStatus::Processed {
            tracing::warn!(
                "Skipping analysis of document {} in status {}",
                document_id,
                document.status()
            );
            return;
        }
        self.run_analysis(&document).await;
    }

    async fn run_analysis(&self, document: &Document) {
        if let Err(e) = self.financial_analyzer.analyze_document(document).await {
            tracing::error!(
                "Transaction extraction failed for document {}: {}",
                document.id(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{JobQueue, TextChunker};
    use crate::application::services::document_processor::test_support::FakeDocuments;
    use crate::application::services::rag_service::test_support::FakeChatModel;
    use crate::application::services::search_service::test_support::{FakeChunks, FakeEmbeddings};
    use crate::application::use_cases::test_support::{FakeProcessos, FakeTransacoes, processo};
    use crate::infrastructure::external_services::SentenceChunker;
    use crate::infrastructure::messaging::MpscJobQueue;

    const REPLY: &str = r#"{"transacoes":[{"descricao":"Mensalidade escolar","valor":-1200.50,"data":"05/03/2024","categoria":"educacao","pagador":"Ana","beneficiario":"Escola","confianca":0.9}]}"#;

    struct Pipeline {
        queue: MpscJobQueue,
        processor: Arc<BackgroundProcessor>,
        documents: Arc<FakeDocuments>,
        transacoes: Arc<FakeTransacoes>,
    }

    fn pipeline(documents: Vec<Document>) -> Pipeline {
        let (queue, receiver) = MpscJobQueue::create_pair();
        let documents = Arc::new(FakeDocuments::with(documents));
        let chunks = Arc::new(FakeChunks::default());
        let transacoes = Arc::new(FakeTransacoes::default());
        let chunker: Arc<dyn TextChunker> = Arc::new(SentenceChunker::new(50, 5));

        let document_processor = Arc::new(DocumentProcessorService::new(
            documents.clone(),
            chunks.clone(),
            Arc::new(FakeEmbeddings { dimension: 4, fail: false }),
            chunker,
        ));
        let analyzer = Arc::new(FinancialAnalyzer::new(
            Arc::new(FakeChatModel::replying(REPLY)),
            "gpt-5-mini".to_string(),
            chunks,
            transacoes.clone(),
            Arc::new(FakeProcessos::with(vec![processo()])),
        ));

        let processor = Arc::new(
            BackgroundProcessor::new(
                Arc::new(receiver),
                documents.clone(),
                document_processor,
                analyzer,
            )
            .with_worker_count(2),
        );

        Pipeline {
            queue,
            processor,
            documents,
            transacoes,
        }
    }

    fn document(kind: &str) -> Document {
        Document::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            kind.to_string(),
            "Extrato marco".to_string(),
            None,
            None,
            None,
            "05/03 PIX ESCOLA -1.200,50. 06/03 FARMACIA -80,00.".to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_financial_document_is_processed_and_analyzed() {
        let doc = document("extrato_bancario");
        let id = doc.id();
        let p = pipeline(vec![doc]);

        p.queue.enqueue(DocumentJob::Process(id)).await.unwrap();
        drop(p.queue);
        p.processor.clone().start().await;

        assert_eq!(p.documents.get(id).unwrap().status(), DocumentStatus::Processed);
        let stored = p.transacoes.transacoes.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount_cents, Some(-120_050));
        assert_eq!(stored[0].source_document_ids, vec![id]);
    }

    #[tokio::test]
    async fn test_plain_document_is_not_analyzed() {
        let doc = document("whatsapp");
        let id = doc.id();
        let p = pipeline(vec![doc]);

        p.queue.enqueue(DocumentJob::Process(id)).await.unwrap();
        drop(p.queue);
        p.processor.clone().start().await;

        assert_eq!(p.documents.get(id).unwrap().status(), DocumentStatus::Processed);
        assert!(p.transacoes.transacoes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analysis_job_skips_unprocessed_document() {
        let doc = document("comprovante");
        let id = doc.id();
        let p = pipeline(vec![doc]);

        p.queue
            .enqueue(DocumentJob::AnalyzeFinancial(id))
            .await
            .unwrap();
        p.queue
            .enqueue(DocumentJob::Process(Uuid::new_v4()))
            .await
            .unwrap();
        drop(p.queue);
        p.processor.clone().start().await;

        assert!(p.transacoes.transacoes.lock().unwrap().is_empty());
        assert_eq!(p.documents.get(id).unwrap().status(), DocumentStatus::Uploaded);
    }
}

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::application::ports::{DocumentJob, JobQueue, JobQueueError};
use crate::domain::entities::{Conversation, Message, Processo, Transacao, TransacaoSummary};
use crate::domain::repositories::{
    ConversationRepository, ProcessoRepository, RepositoryError, TransacaoFilter,
    TransacaoReportFilter, TransacaoRepository,
};

pub fn processo() -> Processo {
    Processo::new(
        Uuid::new_v4(),
        None,
        "Revisao de alimentos".to_string(),
        None,
        Some("Ana e Pedro dividem as despesas escolares.".to_string()),
    )
    .unwrap()
}

#[derive(Default)]
pub struct FakeProcessos {
    pub processos: Mutex<HashMap<Uuid, Processo>>,
    pub document_counts: Mutex<HashMap<Uuid, i64>>,
}

impl FakeProcessos {
    pub fn with(processos: Vec<Processo>) -> Self {
        let fake = Self::default();
        fake.processos
            .lock()
            .unwrap()
            .extend(processos.into_iter().map(|p| (p.id, p)));
        fake
    }
}

#[async_trait]
impl ProcessoRepository for FakeProcessos {
    async fn save(&self, processo: &Processo) -> Result<(), RepositoryError> {
        self.processos
            .lock()
            .unwrap()
            .insert(processo.id, processo.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Processo>, RepositoryError> {
        Ok(self.processos.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<Processo>, RepositoryError> {
        Ok(self
            .processos
            .lock()
            .unwrap()
            .values()
            .filter(|p| owner_id.is_none_or(|o| p.owner_id == o))
            .cloned()
            .collect())
    }

    async fn update(&self, processo: &Processo) -> Result<(), RepositoryError> {
        let mut stored = self.processos.lock().unwrap();
        let slot = stored
            .get_mut(&processo.id)
            .ok_or(RepositoryError::NotFound(processo.id))?;
        *slot = processo.clone();
        Ok(())
    }

    async fn count_documents(&self, id: Uuid) -> Result<i64, RepositoryError> {
        Ok(self
            .document_counts
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or(0))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.processos.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct FakeQueue {
    pub queued: Mutex<Vec<DocumentJob>>,
}

impl FakeQueue {
    pub fn jobs(&self) -> Vec<DocumentJob> {
        self.queued.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobQueue for FakeQueue {
    async fn enqueue(&self, job: DocumentJob) -> Result<(), JobQueueError> {
        self.queued.lock().unwrap().push(job);
        Ok(())
    }

    async fn size(&self) -> usize {
        self.queued.lock().unwrap().len()
    }
}

#[derive(Default)]
pub struct FakeConversations {
    pub conversations: Mutex<HashMap<Uuid, Conversation>>,
    pub messages: Mutex<Vec<Message>>,
}

impl FakeConversations {
    pub fn with(conversation: Conversation) -> Self {
        let fake = Self::default();
        fake.conversations
            .lock()
            .unwrap()
            .insert(conversation.id, conversation);
        fake
    }

    pub fn stored_messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn title_of(&self, id: Uuid) -> Option<String> {
        self.conversations
            .lock()
            .unwrap()
            .get(&id)
            .and_then(|c| c.title.clone())
    }
}

#[async_trait]
impl ConversationRepository for FakeConversations {
    async fn save(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.conversations.lock().unwrap().get(&id).cloned())
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        processo_id: Option<Uuid>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .values()
            .filter(|c| user_id.is_none_or(|u| c.user_id == u))
            .filter(|c| processo_id.is_none_or(|p| c.processo_id == p))
            .cloned()
            .collect())
    }

    async fn message_counts(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, RepositoryError> {
        let mut counts = HashMap::new();
        for message in self.messages.lock().unwrap().iter() {
            if ids.contains(&message.conversation_id) {
                *counts.entry(message.conversation_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<(), RepositoryError> {
        let mut conversations = self.conversations.lock().unwrap();
        let conversation = conversations
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        conversation.title = Some(title.to_string());
        Ok(())
    }

    async fn save_message(&self, message: &Message) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn find_message(&self, id: Uuid) -> Result<Option<Message>, RepositoryError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, RepositoryError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let all = self.list_messages(conversation_id).await?;
        let skip = all.len().saturating_sub(limit as usize);
        Ok(all[skip..].to_vec())
    }
}

#[derive(Default)]
pub struct FakeTransacoes {
    pub transacoes: Mutex<Vec<Transacao>>,
    pub summary: Mutex<Option<TransacaoSummary>>,
}

impl FakeTransacoes {
    pub fn with(transacoes: Vec<Transacao>) -> Self {
        Self {
            transacoes: Mutex::new(transacoes),
            summary: Mutex::new(None),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Transacao> {
        self.transacoes
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }
}

#[async_trait]
impl TransacaoRepository for FakeTransacoes {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transacao>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn list(&self, filter: &TransacaoFilter) -> Result<(Vec<Transacao>, i64), RepositoryError> {
        let matching: Vec<Transacao> = self
            .transacoes
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.processo_id == filter.processo_id)
            .filter(|t| filter.category.is_none_or(|c| t.category == Some(c)))
            .filter(|t| filter.reviewed.is_none_or(|r| t.reviewed == r))
            .filter(|t| {
                filter
                    .payer
                    .as_deref()
                    .is_none_or(|p| t.payer.as_deref() == Some(p))
            })
            .cloned()
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.skip as usize)
            .take(filter.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_for_report(&self, filter: &TransacaoReportFilter) -> Result<Vec<Transacao>, RepositoryError> {
        let mut matching: Vec<Transacao> = self
            .transacoes
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.processo_id == filter.processo_id)
            .filter(|t| filter.date_from.is_none_or(|from| t.date.is_some_and(|d| d >= from)))
            .filter(|t| filter.date_to.is_none_or(|to| t.date.is_some_and(|d| d <= to)))
            .filter(|t| {
                filter.categories.is_empty()
                    || t.category.is_some_and(|c| filter.categories.contains(&c))
            })
            .filter(|t| {
                filter.payers.is_empty()
                    || t.payer.as_ref().is_some_and(|p| filter.payers.contains(p))
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            let by_date = match (a.date, b.date) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_date.then(b.created_at.cmp(&a.created_at))
        });
        Ok(matching)
    }

    async fn summary(&self, processo_id: Uuid) -> Result<TransacaoSummary, RepositoryError> {
        self.summary
            .lock()
            .unwrap()
            .clone()
            .ok_or(RepositoryError::NotFound(processo_id))
    }

    async fn update(&self, transacao: &Transacao) -> Result<(), RepositoryError> {
        let mut stored = self.transacoes.lock().unwrap();
        let slot = stored
            .iter_mut()
            .find(|t| t.id == transacao.id)
            .ok_or(RepositoryError::NotFound(transacao.id))?;
        *slot = transacao.clone();
        Ok(())
    }

    async fn replace_unreviewed_for_document(
        &self,
        document_id: Uuid,
        transacoes: &[Transacao],
    ) -> Result<i64, RepositoryError> {
        let mut stored = self.transacoes.lock().unwrap();
        let before = stored.len();
        stored.retain(|t| t.reviewed || !t.source_document_ids.contains(&document_id));
        let removed = (before - stored.len()) as i64;
        stored.extend_from_slice(transacoes);
        Ok(removed)
    }
}

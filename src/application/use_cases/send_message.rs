use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::UseCaseError;
use crate::application::ports::StreamDelta;
use crate::application::services::RagService;
use crate::application::services::rag_service::{RagAnswer, approximate_usage};
use crate::domain::entities::{Conversation, Message, SourceInfo};
use crate::domain::repositories::{ConversationRepository, ProcessoRepository};

/// One server-sent event of a streamed answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatEvent {
    Status {
        phase: String,
    },
    Token {
        content: String,
    },
    Sources(Vec<SourceInfo>),
    Done {
        message_id: Uuid,
        tokens_input: i32,
        tokens_output: i32,
        cost_usd: f64,
    },
    Error {
        message: String,
    },
}

impl ChatEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::Status { .. } => "status",
            ChatEvent::Token { .. } => "token",
            ChatEvent::Sources(_) => "sources",
            ChatEvent::Done { .. } => "done",
            ChatEvent::Error { .. } => "error",
        }
    }

    fn status(phase: &str) -> Self {
        ChatEvent::Status {
            phase: phase.to_string(),
        }
    }

    fn error(message: impl ToString) -> Self {
        ChatEvent::Error {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub user_message: Message,
    pub assistant_message: Message,
}

/// State gathered before the model is called. The user message is already
/// stored at this point.
struct PreparedTurn {
    conversation: Conversation,
    history: Vec<Message>,
    processo_context: Option<String>,
    user_message: Message,
}

pub struct SendMessageUseCase {
    conversation_repository: Arc<dyn ConversationRepository>,
    processo_repository: Arc<dyn ProcessoRepository>,
    rag_service: Arc<RagService>,
}

impl SendMessageUseCase {
    pub fn new(
        conversation_repository: Arc<dyn ConversationRepository>,
        processo_repository: Arc<dyn ProcessoRepository>,
        rag_service: Arc<RagService>,
    ) -> Self {
        Self {
            conversation_repository,
            processo_repository,
            rag_service,
        }
    }

    async fn prepare(&self, conversation_id: Uuid, content: &str) -> Result<PreparedTurn, UseCaseError> {
        if content.trim().is_empty() {
            return Err(UseCaseError::ValidationError("Message cannot be empty".to_string()));
        }

        let conversation = self
            .conversation_repository
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| UseCaseError::not_found("Conversation", conversation_id))?;

        let history = self
            .conversation_repository
            .recent_messages(conversation_id, self.rag_service.history_window() as i64)
            .await?;

        let processo_context = self
            .processo_repository
            .find_by_id(conversation.processo_id)
            .await?
            .and_then(|p| p.context);

        let user_message = Message::user(conversation_id, content.to_string());
        self.conversation_repository.save_message(&user_message).await?;

        if let Some(title) = conversation.title_from_question(content) {
            self.conversation_repository
                .update_title(conversation_id, &title)
                .await?;
        }

        Ok(PreparedTurn {
            conversation,
            history,
            processo_context,
            user_message,
        })
    }

    pub async fn execute(&self, conversation_id: Uuid, content: &str) -> Result<ChatExchange, UseCaseError> {
        let turn = self.prepare(conversation_id, content).await?;

        let answer = self
            .rag_service
            .answer(
                content,
                &turn.history,
                Some(turn.conversation.processo_id),
                turn.processo_context.as_deref(),
            )
            .await
            .map_err(|e| UseCaseError::UpstreamError(e.to_string()))?;

        let assistant_message = assistant_message(conversation_id, answer);
        self.conversation_repository
            .save_message(&assistant_message)
            .await?;

        tracing::info!(
            "Answered message {} in conversation {} ({} sources)",
            turn.user_message.id,
            conversation_id,
            assistant_message.sources.len()
        );
        Ok(ChatExchange {
            user_message: turn.user_message,
            assistant_message,
        })
    }

    /// Validates the turn, stores the user message and returns a receiver of
    /// answer events. Dropping the receiver stops generation and nothing more
    /// is stored.
    pub async fn start_stream(
        &self,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<mpsc::UnboundedReceiver<ChatEvent>, UseCaseError> {
        let turn = self.prepare(conversation_id, content).await?;
        let (sender, receiver) = mpsc::unbounded_channel();

        let rag_service = self.rag_service.clone();
        let conversation_repository = self.conversation_repository.clone();
        let question = content.to_string();

        tokio::spawn(async move {
            let streamed = stream_answer(
                &rag_service,
                &conversation_repository,
                &question,
                turn,
                &sender,
            )
            .await;

            if let Err(message) = streamed {
                tracing::warn!("Streamed answer for conversation {} stopped: {}", conversation_id, message);
                let _ = sender.send(ChatEvent::error(message));
            }
        });

        Ok(receiver)
    }
}

/// Drives one streamed answer. `Ok` also covers a client that went away.
async fn stream_answer(
    rag_service: &RagService,
    conversation_repository: &Arc<dyn ConversationRepository>,
    question: &str,
    turn: PreparedTurn,
    sender: &mpsc::UnboundedSender<ChatEvent>,
) -> Result<(), String> {
    let conversation_id = turn.conversation.id;
    let disconnected = || {
        tracing::info!("Client left conversation {} mid-answer", conversation_id);
        Ok(())
    };

    if sender.send(ChatEvent::status("searching")).is_err() {
        return disconnected();
    }
    let chunks = rag_service
        .retrieve(question, Some(turn.conversation.processo_id))
        .await
        .map_err(|e| e.to_string())?;

    if sender.send(ChatEvent::status("generating")).is_err() {
        return disconnected();
    }
    let request = rag_service.build_request(
        question,
        &turn.history,
        turn.processo_context.as_deref(),
        &chunks,
    );
    let mut deltas = rag_service
        .stream(request.clone())
        .await
        .map_err(|e| e.to_string())?;

    let mut output = String::new();
    let mut usage = None;
    while let Some(delta) = deltas.next().await {
        match delta.map_err(|e| e.to_string())? {
            StreamDelta::Content(text) => {
                output.push_str(&text);
                if sender.send(ChatEvent::Token { content: text }).is_err() {
                    return disconnected();
                }
            }
            StreamDelta::Usage(reported) => usage = Some(reported),
        }
    }

    let usage = usage.unwrap_or_else(|| approximate_usage(&request, &output));
    let answer = RagAnswer::new(output, &chunks, usage);

    if sender.send(ChatEvent::Sources(answer.sources.clone())).is_err() {
        return disconnected();
    }
    if sender.is_closed() {
        return disconnected();
    }

    let message = assistant_message(conversation_id, answer);
    conversation_repository
        .save_message(&message)
        .await
        .map_err(|e| e.to_string())?;

    let _ = sender.send(ChatEvent::Done {
        message_id: message.id,
        tokens_input: message.tokens_input.unwrap_or_default(),
        tokens_output: message.tokens_output.unwrap_or_default(),
        cost_usd: message.cost_usd.unwrap_or_default(),
    });
    Ok(())
}

fn assistant_message(conversation_id: Uuid, answer: RagAnswer) -> Message {
    Message::assistant(
        conversation_id,
        answer.content,
        answer.chunks_used,
        answer.tokens_input,
        answer.tokens_output,
        answer.cost_usd,
        answer.sources,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::SearchService;
    use crate::application::services::rag_service::test_support::FakeChatModel;
    use crate::application::services::search_service::test_support::{
        FakeChunks, FakeEmbeddings, retrieved,
    };
    use crate::application::use_cases::test_support::{FakeConversations, FakeProcessos, processo};
    use crate::domain::value_objects::MessageRole;

    struct Fixture {
        use_case: SendMessageUseCase,
        conversations: Arc<FakeConversations>,
        chat: Arc<FakeChatModel>,
        conversation_id: Uuid,
    }

    fn fixture(chat: FakeChatModel) -> Fixture {
        let existing = processo();
        let conversation = Conversation::new(existing.id, Uuid::new_v4(), None);
        let conversation_id = conversation.id;
        let conversations = Arc::new(FakeConversations::with(conversation));
        let chat = Arc::new(chat);

        let search = SearchService::new(
            Arc::new(FakeEmbeddings { dimension: 4, fail: false }),
            Arc::new(FakeChunks {
                hits: vec![retrieved("Extrato marco", 0.82)],
                ..Default::default()
            }),
            5,
            0.3,
        );
        let rag = RagService::new(Arc::new(search), chat.clone(), "gpt-5-mini".to_string(), 10);

        Fixture {
            use_case: SendMessageUseCase::new(
                conversations.clone(),
                Arc::new(FakeProcessos::with(vec![existing])),
                Arc::new(rag),
            ),
            conversations,
            chat,
            conversation_id,
        }
    }

    async fn collect(mut receiver: mpsc::UnboundedReceiver<ChatEvent>) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        while let Some(event) = receiver.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_execute_persists_both_messages() {
        let f = fixture(FakeChatModel::replying("A mensalidade foi paga por Ana."));

        let exchange = f
            .use_case
            .execute(f.conversation_id, "Quem pagou a escola em marco?")
            .await
            .unwrap();

        let stored = f.conversations.stored_messages();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].role, MessageRole::User);
        assert_eq!(stored[1].id, exchange.assistant_message.id);
        assert_eq!(exchange.assistant_message.sources[0].doc_title, "Extrato marco");
        assert_eq!(exchange.assistant_message.chunks_used.len(), 1);
        assert_eq!(exchange.assistant_message.tokens_input, Some(1000));
        assert_eq!(
            f.conversations.title_of(f.conversation_id).as_deref(),
            Some("Quem pagou a escola em marco?")
        );

        let sent = f.chat.requests.lock().unwrap();
        let prompt = &sent[0].messages.last().unwrap().content;
        assert!(prompt.starts_with("Contexto do processo:\nAna e Pedro"));
    }

    #[tokio::test]
    async fn test_history_feeds_next_prompt() {
        let f = fixture(FakeChatModel::replying("ok"));

        f.use_case.execute(f.conversation_id, "Primeira").await.unwrap();
        f.use_case.execute(f.conversation_id, "Segunda").await.unwrap();

        let sent = f.chat.requests.lock().unwrap();
        let second = &sent[1].messages;
        assert_eq!(second.len(), 4);
        assert_eq!(second[1].content, "Primeira");
        assert_eq!(second[2].role, MessageRole::Assistant);
        assert_eq!(f.conversations.title_of(f.conversation_id).as_deref(), Some("Primeira"));
    }

    #[tokio::test]
    async fn test_execute_model_failure_keeps_user_message() {
        let mut chat = FakeChatModel::replying("x");
        chat.fail = true;
        let f = fixture(chat);

        let result = f.use_case.execute(f.conversation_id, "Quem pagou?").await;

        assert!(matches!(result, Err(UseCaseError::UpstreamError(_))));
        assert_eq!(f.conversations.stored_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_conversation_and_empty_content() {
        let f = fixture(FakeChatModel::replying("ok"));

        let missing = f.use_case.execute(Uuid::new_v4(), "Oi").await;
        assert!(matches!(missing, Err(UseCaseError::NotFound(_))));

        let empty = f.use_case.start_stream(f.conversation_id, "  ").await;
        assert!(matches!(empty, Err(UseCaseError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_stream_event_sequence() {
        let f = fixture(FakeChatModel::replying("Pago por Ana."));

        let receiver = f
            .use_case
            .start_stream(f.conversation_id, "Quem pagou?")
            .await
            .unwrap();
        let events = collect(receiver).await;

        let names: Vec<&str> = events.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["status", "status", "token", "token", "token", "sources", "done"]
        );
        assert_eq!(events[0], ChatEvent::status("searching"));
        assert_eq!(events[1], ChatEvent::status("generating"));

        let stored = f.conversations.stored_messages();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].content, "Pago por Ana.");
        match events.last().unwrap() {
            ChatEvent::Done {
                message_id,
                tokens_input,
                ..
            } => {
                assert_eq!(*message_id, stored[1].id);
                assert_eq!(*tokens_input, 1000);
            }
            other => panic!("unexpected final event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stream_without_usage_is_approximated() {
        let mut chat = FakeChatModel::replying("Pago por Ana.");
        chat.usage = None;
        let f = fixture(chat);

        let receiver = f
            .use_case
            .start_stream(f.conversation_id, "Quem pagou?")
            .await
            .unwrap();
        collect(receiver).await;

        let stored = f.conversations.stored_messages();
        assert_eq!(stored[1].tokens_output, Some(4));
        assert!(stored[1].tokens_input.unwrap() > 0);
    }

    #[tokio::test]
    async fn test_stream_failure_emits_error() {
        let mut chat = FakeChatModel::replying("x");
        chat.fail = true;
        let f = fixture(chat);

        let receiver = f
            .use_case
            .start_stream(f.conversation_id, "Quem pagou?")
            .await
            .unwrap();
        let events = collect(receiver).await;

        assert_eq!(events.last().unwrap().name(), "error");
        assert_eq!(f.conversations.stored_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_receiver_stores_no_answer() {
        let f = fixture(FakeChatModel::replying("Pago por Ana."));

        let receiver = f
            .use_case
            .start_stream(f.conversation_id, "Quem pagou?")
            .await
            .unwrap();
        drop(receiver);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert_eq!(f.conversations.stored_messages().len(), 1);
    }

    #[test]
    fn test_event_payloads() {
        let done = ChatEvent::Done {
            message_id: Uuid::nil(),
            tokens_input: 10,
            tokens_output: 2,
            cost_usd: 0.000003,
        };
        let json = serde_json::to_value(&done).unwrap();
        assert_eq!(json["tokens_input"], 10);
        assert!(json.get("Done").is_none());

        let token = serde_json::to_value(ChatEvent::Token {
            content: "Oi".to_string(),
        })
        .unwrap();
        assert_eq!(token, serde_json::json!({"content": "Oi"}));
    }
}

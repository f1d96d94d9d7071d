use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::chat_model::DeltaStream;
use crate::application::ports::{ChatMessage, ChatModel, ChatRequest, Usage};
use crate::application::services::search_service::{SearchService, build_context};
use crate::domain::entities::{Message, RetrievedChunk, SourceInfo};
use crate::domain::value_objects::MessageRole;
use crate::infrastructure::external_services::semantic_chunking::count_tokens;

pub const SYSTEM_PROMPT: &str = "\
Voce e um assistente juridico especializado em direito de familia brasileiro.
Seu papel e ajudar a analisar documentos, conversas e evidencias relacionadas a processos judiciais.

REGRAS FUNDAMENTAIS:
1. SEMPRE cite a fonte de cada afirmacao (documento - se possível com a página, conversa, data).
2. Se nao houver evidencia nos documentos, diga explicitamente \"Nao encontrei evidencia nos documentos fornecidos\".
3. NUNCA invente ou extrapole informacoes alem do que esta nos documentos.
4. Quando classificar gastos, inclua o nivel de confianca (alta/media/baixa).
5. Use linguagem clara e acessivel, nao juridiques desnecessario.
6. Quando identificar contradicoes entre documentos, aponte ambas as versoes.
7. Sempre que mencionar valores, indique a fonte e a data.
8. Sempre dê prioridade para contratos e documentos assinados - eles tem mais peso do que mensagens informais.

CAPACIDADES:
- Analisar e cruzar informacoes de conversas WhatsApp, e-mails, extratos bancarios e documentos judiciais
- Classificar gastos por responsavel (quem pagou vs quem deveria pagar)
- Montar timelines de eventos
- Identificar promessas feitas em conversas e verificar se foram cumpridas
- Gerar resumos e relatorios estruturados

Ao responder, use o formato:
[Fonte: nome do documento, data] para cada citacao.";

const ANSWER_TEMPERATURE: f32 = 1.0;
const ANSWER_MAX_TOKENS: u32 = 4000;
const PROMPT_USD_PER_MILLION: f64 = 0.15;
const COMPLETION_USD_PER_MILLION: f64 = 0.60;

#[derive(Debug)]
pub enum RagError {
    RetrievalError(String),
    ModelError(String),
}

impl std::fmt::Display for RagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RagError::RetrievalError(msg) => write!(f, "Retrieval error: {}", msg),
            RagError::ModelError(msg) => write!(f, "Model error: {}", msg),
        }
    }
}

impl std::error::Error for RagError {}

#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub content: String,
    pub chunks_used: Vec<Uuid>,
    pub sources: Vec<SourceInfo>,
    pub tokens_input: i32,
    pub tokens_output: i32,
    pub cost_usd: f64,
}

impl RagAnswer {
    pub fn new(content: String, chunks: &[RetrievedChunk], usage: Usage) -> Self {
        Self {
            content,
            chunks_used: chunks.iter().map(|c| c.chunk_id).collect(),
            sources: sources_from(chunks),
            tokens_input: usage.prompt_tokens as i32,
            tokens_output: usage.completion_tokens as i32,
            cost_usd: estimate_cost(usage),
        }
    }
}

pub struct RagService {
    search_service: Arc<SearchService>,
    chat_model: Arc<dyn ChatModel>,
    model_name: String,
    history_window: usize,
}

impl RagService {
    pub fn new(
        search_service: Arc<SearchService>,
        chat_model: Arc<dyn ChatModel>,
        model_name: String,
        history_window: usize,
    ) -> Self {
        Self {
            search_service,
            chat_model,
            model_name,
            history_window,
        }
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    pub async fn retrieve(
        &self,
        question: &str,
        processo_id: Option<Uuid>,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        self.search_service
            .search_similar_chunks(question, processo_id, None)
            .await
            .map_err(|e| RagError::RetrievalError(e.to_string()))
    }

    /// System prompt, trailing history window, then the question wrapped with
    /// processo and document context.
    pub fn build_request(
        &self,
        question: &str,
        history: &[Message],
        processo_context: Option<&str>,
        chunks: &[RetrievedChunk],
    ) -> ChatRequest {
        let mut messages = vec![ChatMessage::new(MessageRole::System, SYSTEM_PROMPT)];

        let skip = history.len().saturating_sub(self.history_window);
        messages.extend(
            history[skip..]
                .iter()
                .map(|m| ChatMessage::new(m.role, m.content.clone())),
        );

        let mut parts = Vec::new();
        if let Some(context) = processo_context.filter(|c| !c.trim().is_empty()) {
            parts.push(format!("Contexto do processo:\n{}", context));
        }
        parts.push(format!("Contexto dos documentos:\n{}", build_context(chunks)));
        parts.push(format!("Pergunta do usuario: {}", question));
        messages.push(ChatMessage::new(MessageRole::User, parts.join("\n\n")));

        ChatRequest {
            model: self.model_name.clone(),
            messages,
            temperature: Some(ANSWER_TEMPERATURE),
            max_completion_tokens: Some(ANSWER_MAX_TOKENS),
            json_mode: false,
        }
    }

    pub async fn answer(
        &self,
        question: &str,
        history: &[Message],
        processo_id: Option<Uuid>,
        processo_context: Option<&str>,
    ) -> Result<RagAnswer, RagError> {
        let chunks = self.retrieve(question, processo_id).await?;
        let request = self.build_request(question, history, processo_context, &chunks);

        let completion = self
            .chat_model
            .complete(request)
            .await
            .map_err(|e| RagError::ModelError(e.to_string()))?;

        Ok(RagAnswer::new(completion.content, &chunks, completion.usage))
    }

    pub async fn stream(&self, request: ChatRequest) -> Result<DeltaStream, RagError> {
        self.chat_model
            .stream(request)
            .await
            .map_err(|e| RagError::ModelError(e.to_string()))
    }
}

pub fn sources_from(chunks: &[RetrievedChunk]) -> Vec<SourceInfo> {
    chunks
        .iter()
        .map(|c| SourceInfo {
            doc_title: c.doc_title.clone(),
            doc_kind: c.doc_kind.clone(),
            document_id: c.document_id,
            similarity: c.similarity,
        })
        .collect()
}

/// USD estimate for one call, rounded to six decimals.
pub fn estimate_cost(usage: Usage) -> f64 {
    let cost = usage.prompt_tokens as f64 * PROMPT_USD_PER_MILLION / 1_000_000.0
        + usage.completion_tokens as f64 * COMPLETION_USD_PER_MILLION / 1_000_000.0;
    (cost * 1_000_000.0).round() / 1_000_000.0
}

/// Usage for a stream whose server did not report it.
pub fn approximate_usage(request: &ChatRequest, output: &str) -> Usage {
    Usage {
        prompt_tokens: request
            .messages
            .iter()
            .map(|m| count_tokens(&m.content) as u32)
            .sum(),
        completion_tokens: count_tokens(output) as u32,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use futures::{StreamExt, stream};
    use std::sync::Mutex;

    use crate::application::ports::chat_model::{ChatModelError, DeltaStream, StreamDelta};
    use crate::application::ports::{ChatModel, ChatRequest, Completion, Usage};

    pub struct FakeChatModel {
        pub reply: String,
        pub usage: Option<Usage>,
        pub fail: bool,
        pub requests: Mutex<Vec<ChatRequest>>,
    }

    impl FakeChatModel {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                usage: Some(Usage {
                    prompt_tokens: 1000,
                    completion_tokens: 200,
                }),
                fail: false,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for FakeChatModel {
        async fn complete(&self, request: ChatRequest) -> Result<Completion, ChatModelError> {
            self.requests.lock().unwrap().push(request);
            if self.fail {
                return Err(ChatModelError::ApiError {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(Completion {
                content: self.reply.clone(),
                usage: self.usage.unwrap_or_default(),
            })
        }

        async fn stream(&self, request: ChatRequest) -> Result<DeltaStream, ChatModelError> {
            self.requests.lock().unwrap().push(request);
            if self.fail {
                return Err(ChatModelError::NetworkError("unreachable".to_string()));
            }
            let mut items: Vec<Result<StreamDelta, ChatModelError>> = self
                .reply
                .split_inclusive(' ')
                .map(|w| Ok(StreamDelta::Content(w.to_string())))
                .collect();
            if let Some(usage) = self.usage {
                items.push(Ok(StreamDelta::Usage(usage)));
            }
            Ok(stream::iter(items).boxed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FakeChatModel;
    use super::*;
    use crate::application::services::search_service::test_support::{
        FakeChunks, FakeEmbeddings, retrieved,
    };

    fn service(chat: Arc<FakeChatModel>, hits: Vec<RetrievedChunk>, window: usize) -> RagService {
        let search = SearchService::new(
            Arc::new(FakeEmbeddings { dimension: 4, fail: false }),
            Arc::new(FakeChunks {
                hits,
                ..Default::default()
            }),
            5,
            0.3,
        );
        RagService::new(Arc::new(search), chat, "gpt-5-mini".to_string(), window)
    }

    fn history(n: usize) -> Vec<Message> {
        let conversation = Uuid::new_v4();
        (0..n)
            .map(|i| Message::user(conversation, format!("pergunta {}", i)))
            .collect()
    }

    #[test]
    fn test_estimate_cost() {
        let cost = estimate_cost(Usage {
            prompt_tokens: 1000,
            completion_tokens: 200,
        });
        assert!((cost - 0.00027).abs() < 1e-12);

        let tiny = estimate_cost(Usage {
            prompt_tokens: 1,
            completion_tokens: 1,
        });
        assert!((tiny - 0.000001).abs() < 1e-12);
    }

    #[test]
    fn test_build_request_layout() {
        let rag = service(Arc::new(FakeChatModel::replying("ok")), Vec::new(), 10);
        let request = rag.build_request(
            "Quem pagou a escola?",
            &history(12),
            Some("Guarda compartilhada"),
            &[],
        );

        assert_eq!(request.messages.len(), 12);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert!(request.messages[0].content.contains("se possível com a página"));
        assert!(request.messages[0].content.contains("CAPACIDADES:"));
        assert_eq!(request.messages[1].content, "pergunta 2");
        assert_eq!(request.temperature, Some(1.0));
        assert_eq!(request.max_completion_tokens, Some(4000));

        let last = request.messages.last().unwrap();
        assert_eq!(last.role, MessageRole::User);
        assert_eq!(
            last.content,
            "Contexto do processo:\nGuarda compartilhada\n\n\
             Contexto dos documentos:\nNenhum documento relevante encontrado.\n\n\
             Pergunta do usuario: Quem pagou a escola?"
        );
    }

    #[test]
    fn test_build_request_without_processo_context() {
        let rag = service(Arc::new(FakeChatModel::replying("ok")), Vec::new(), 10);
        let request = rag.build_request("Oi?", &[], None, &[]);

        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[1].content.starts_with("Contexto dos documentos:"));
    }

    #[tokio::test]
    async fn test_answer_collects_sources_and_cost() {
        let chat = Arc::new(FakeChatModel::replying("A escola foi paga por Ana."));
        let rag = service(chat.clone(), vec![retrieved("Extrato", 0.8)], 10);

        let answer = rag.answer("Quem pagou?", &[], None, None).await.unwrap();

        assert_eq!(answer.content, "A escola foi paga por Ana.");
        assert_eq!(answer.chunks_used.len(), 1);
        assert_eq!(answer.sources[0].doc_title, "Extrato");
        assert_eq!(answer.tokens_input, 1000);
        assert!((answer.cost_usd - 0.00027).abs() < 1e-12);

        let sent = chat.requests.lock().unwrap();
        assert!(sent[0].messages.last().unwrap().content.contains("--- Fonte 1"));
    }

    #[tokio::test]
    async fn test_answer_model_failure() {
        let mut chat = FakeChatModel::replying("x");
        chat.fail = true;
        let rag = service(Arc::new(chat), Vec::new(), 10);

        let result = rag.answer("Quem pagou?", &[], None, None).await;
        assert!(matches!(result, Err(RagError::ModelError(_))));
    }
}

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{ChatMessage, ChatModel, ChatRequest};
use crate::domain::entities::{Chunk, Document, Transacao};
use crate::domain::repositories::{ChunkRepository, ProcessoRepository, TransacaoRepository};
use crate::domain::value_objects::{MessageRole, TransactionCategory};

const EXTRACTION_TEMPERATURE: f32 = 0.1;
const EVIDENCE_CHARS: usize = 500;
const PARTY_MAX_CHARS: usize = 50;
const DEFAULT_CONFIDENCE: f32 = 0.5;

const EXTRACTION_SYSTEM_PROMPT: &str =
    "Voce e um assistente especializado em extrair transacoes financeiras de extratos bancarios.";

#[derive(Debug)]
pub enum FinancialAnalysisError {
    RepositoryError(String),
    /// Every chunk failed, so the previous results were left in place.
    ExtractionFailed(String),
}

impl std::fmt::Display for FinancialAnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinancialAnalysisError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            FinancialAnalysisError::ExtractionFailed(msg) => write!(f, "Extraction failed: {}", msg),
        }
    }
}

impl std::error::Error for FinancialAnalysisError {}

pub struct FinancialAnalyzer {
    chat_model: Arc<dyn ChatModel>,
    model_name: String,
    chunk_repository: Arc<dyn ChunkRepository>,
    transacao_repository: Arc<dyn TransacaoRepository>,
    processo_repository: Arc<dyn ProcessoRepository>,
}

impl FinancialAnalyzer {
    pub fn new(
        chat_model: Arc<dyn ChatModel>,
        model_name: String,
        chunk_repository: Arc<dyn ChunkRepository>,
        transacao_repository: Arc<dyn TransacaoRepository>,
        processo_repository: Arc<dyn ProcessoRepository>,
    ) -> Self {
        Self {
            chat_model,
            model_name,
            chunk_repository,
            transacao_repository,
            processo_repository,
        }
    }

    /// Extracts transactions from every chunk of the document, then swaps
    /// them for the unreviewed ones a previous run produced. When no chunk
    /// could be analyzed the previous results stay.
    pub async fn analyze_document(
        &self,
        document: &Document,
    ) -> Result<Vec<Transacao>, FinancialAnalysisError> {
        let processo_context = self
            .processo_repository
            .find_by_id(document.processo_id())
            .await
            .map_err(|e| FinancialAnalysisError::RepositoryError(e.to_string()))?
            .and_then(|p| p.context);

        let chunks = self
            .chunk_repository
            .find_by_document(document.id())
            .await
            .map_err(|e| FinancialAnalysisError::RepositoryError(e.to_string()))?;

        let mut transacoes = Vec::new();
        let mut last_error = None;
        let mut failed = 0;
        for chunk in &chunks {
            match self
                .extract_from_chunk(chunk, document.processo_id(), processo_context.as_deref())
                .await
            {
                Ok(mut found) => transacoes.append(&mut found),
                Err(e) => {
                    tracing::warn!("Transaction extraction failed for chunk {}: {}", chunk.id(), e);
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }

        if !chunks.is_empty() && failed == chunks.len() {
            return Err(FinancialAnalysisError::ExtractionFailed(format!(
                "all {} chunks failed, last error: {}",
                failed,
                last_error.unwrap_or_default()
            )));
        }

        let removed = self
            .transacao_repository
            .replace_unreviewed_for_document(document.id(), &transacoes)
            .await
            .map_err(|e| FinancialAnalysisError::RepositoryError(e.to_string()))?;
        if removed > 0 {
            tracing::info!(
                "Replaced {} unreviewed transactions of document {}",
                removed,
                document.id()
            );
        }

        tracing::info!(
            "Extracted {} transactions from document {}",
            transacoes.len(),
            document.id()
        );
        Ok(transacoes)
    }

    async fn extract_from_chunk(
        &self,
        chunk: &Chunk,
        processo_id: Uuid,
        processo_context: Option<&str>,
    ) -> Result<Vec<Transacao>, String> {
        let request = ChatRequest {
            model: self.model_name.clone(),
            messages: vec![
                ChatMessage::new(MessageRole::System, EXTRACTION_SYSTEM_PROMPT),
                ChatMessage::new(
                    MessageRole::User,
                    extraction_prompt(chunk.content(), processo_context),
                ),
            ],
            temperature: Some(EXTRACTION_TEMPERATURE),
            max_completion_tokens: None,
            json_mode: true,
        };

        let completion = self
            .chat_model
            .complete(request)
            .await
            .map_err(|e| e.to_string())?;

        parse_extraction(&completion.content, chunk, processo_id)
    }
}

fn extraction_prompt(chunk_text: &str, processo_context: Option<&str>) -> String {
    let mut prompt = String::from(
        "Analise o seguinte texto de extrato bancario e extraia as transacoes financeiras.\n\n",
    );
    if let Some(context) = processo_context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!(
            "Contexto do processo (use para identificar pagador e beneficiario):\n{}\n\n",
            context
        ));
    }
    prompt.push_str(&format!(
        "Para cada transacao, forneca:\n\
         - descricao: descricao da transacao\n\
         - valor: valor em reais (positivo para creditos, negativo para debitos)\n\
         - data: data no formato YYYY-MM-DD (se disponivel)\n\
         - categoria: uma das categorias: {}\n\
         - pagador: quem pagou (nome ou \"incerto\" se nao souber)\n\
         - beneficiario: quem recebeu (nome ou \"incerto\" se nao souber)\n\
         - confianca: nivel de confianca na classificacao de 0.0 a 1.0\n\n\
         Retorne um JSON no formato:\n\
         {{\"transacoes\": [{{\"descricao\": \"...\", \"valor\": 0.00, \"data\": \"YYYY-MM-DD\", \
         \"categoria\": \"...\", \"pagador\": \"...\", \"beneficiario\": \"...\", \"confianca\": 0.0}}]}}\n\n\
         Texto do extrato:\n{}",
        TransactionCategory::joined(),
        chunk_text
    ));
    prompt
}

/// Turns the model's JSON reply into transactions attributed to `chunk`.
pub fn parse_extraction(
    content: &str,
    chunk: &Chunk,
    processo_id: Uuid,
) -> Result<Vec<Transacao>, String> {
    let parsed: Value = serde_json::from_str(content).map_err(|e| format!("Invalid JSON: {}", e))?;
    let items = parsed
        .get("transacoes")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let evidence: String = chunk.content().chars().take(EVIDENCE_CHARS).collect();
    let now = Utc::now();

    Ok(items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| Transacao {
            id: Uuid::new_v4(),
            processo_id,
            description: text_field(item, "descricao").unwrap_or_default(),
            amount_cents: item.get("valor").and_then(amount_to_cents),
            date: text_field(item, "data").as_deref().and_then(parse_date),
            payer: text_field(item, "pagador").map(|p| truncate(&p, PARTY_MAX_CHARS)),
            payee: text_field(item, "beneficiario").map(|p| truncate(&p, PARTY_MAX_CHARS)),
            category: Some(TransactionCategory::normalize(
                text_field(item, "categoria").as_deref(),
            )),
            confidence: Some(
                item.get("confianca")
                    .and_then(Value::as_f64)
                    .map(|c| c as f32)
                    .unwrap_or(DEFAULT_CONFIDENCE)
                    .clamp(0.0, 1.0),
            ),
            reviewed: false,
            reviewed_by: None,
            source_chunk_ids: vec![chunk.id()],
            source_document_ids: vec![chunk.document_id()],
            evidence: Some(evidence.clone()),
            created_at: now,
            updated_at: now,
        })
        .collect())
}

fn text_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Accepts JSON numbers and numeric strings in either `1234.56` or
/// `1.234,56` notation. Zero and unparseable values yield `None`.
pub fn amount_to_cents(value: &Value) -> Option<i64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_amount_text(s)?,
        _ => return None,
    };
    if amount == 0.0 || !amount.is_finite() {
        return None;
    }
    Some((amount * 100.0).round() as i64)
}

fn parse_amount_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    normalized.parse().ok()
}

/// `YYYY-MM-DD`, or `DD/MM/YYYY` at the start of the string.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%d/%m/%Y").ok())
}

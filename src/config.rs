use std::env;
use std::str::FromStr;

/// Width of the `chunks.embedding` column.
pub const STORED_EMBEDDING_DIMENSIONS: usize = 1536;

#[derive(Debug)]
pub enum ConfigError {
    Missing(String),
    Invalid { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} not set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct RagSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub similarity_threshold: f32,
    pub history_window: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 5,
            similarity_threshold: 0.3,
            history_window: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub chat_model: String,
    pub processing_model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub frontend_url: String,
    pub max_body_bytes: usize,
    pub worker_count: usize,
    pub models: ModelSettings,
    pub rag: RagSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::Missing(key.to_string()))
        };
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let models = ModelSettings {
            api_key: required("OPENAI_API_KEY")?,
            base_url: text("OPENAI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            embedding_model: text("EMBEDDING_MODEL", "text-embedding-3-large"),
            embedding_dimensions: parse_or(&lookup, "EMBEDDING_DIMENSIONS", STORED_EMBEDDING_DIMENSIONS)?,
            chat_model: text("CHAT_MODEL", "gpt-5-mini"),
            processing_model: text("PROCESSING_MODEL", "gpt-5-mini"),
        };

        if models.embedding_dimensions != STORED_EMBEDDING_DIMENSIONS {
            return Err(ConfigError::Invalid {
                key: "EMBEDDING_DIMENSIONS".to_string(),
                value: format!(
                    "{} (chunks.embedding is vector({}))",
                    models.embedding_dimensions, STORED_EMBEDDING_DIMENSIONS
                ),
            });
        }

        let defaults = RagSettings::default();
        let rag = RagSettings {
            chunk_size: parse_or(&lookup, "CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: parse_or(&lookup, "CHUNK_OVERLAP", defaults.chunk_overlap)?,
            top_k: parse_or(&lookup, "SIMILARITY_TOP_K", defaults.top_k)?,
            similarity_threshold: parse_or(
                &lookup,
                "SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            )?,
            history_window: parse_or(&lookup, "HISTORY_WINDOW", defaults.history_window)?,
        };

        if rag.chunk_size == 0 || rag.chunk_overlap >= rag.chunk_size {
            return Err(ConfigError::Invalid {
                key: "CHUNK_OVERLAP".to_string(),
                value: format!("{} (chunk size {})", rag.chunk_overlap, rag.chunk_size),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parse_or(&lookup, "SERVER_PORT", 8000)?,
            frontend_url: text("FRONTEND_URL", "http://localhost:3000"),
            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", 50 * 1024 * 1024)?,
            worker_count: parse_or::<usize, _>(&lookup, "WORKER_COUNT", 3)?.max(1),
            models,
            rag,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

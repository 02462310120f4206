use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub qa: QaConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            postgres: PostgresConfig::from_env(),
            llm: LlmConfig::from_env(),
            embedding: EmbeddingConfig::from_env(),
            qa: QaConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  server:     host={}, port={}", self.server.host, self.server.port);
        tracing::info!("  postgres:   host={}, db={}", self.postgres.host, self.postgres.database);
        tracing::info!(
            "  llm:        provider={}, answer_model={}, summary_model={}",
            self.llm.provider,
            self.llm.answer_model,
            self.llm.summary_model
        );
        tracing::info!(
            "  embedding:  provider={}, model={}, dimensions={}",
            self.embedding.provider,
            self.embedding.model,
            self.embedding.dimensions
        );
        tracing::info!(
            "  qa:         max_chunk_tokens={}, top_k={}",
            self.qa.max_chunk_tokens,
            self.qa.top_k
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_u16("PORT", 8000),
            cors_origin: env_or("CORS_ORIGIN", "*"),
        }
    }
}

// ── PostgreSQL ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl_mode: String,
    pub max_connections: u32,
}

impl PostgresConfig {
    fn from_env() -> Self {
        Self {
            host: env_or("PG_HOST", "localhost"),
            port: env_u16("PG_PORT", 5432),
            database: env_or("PG_DATABASE", "folio"),
            username: env_opt("PG_USERNAME"),
            password: env_opt("PG_PASSWORD"),
            ssl_mode: env_or("PG_SSL_MODE", "prefer"),
            max_connections: env_u32("PG_MAX_CONNECTIONS", 10),
        }
    }

    pub fn connection_string(&self) -> String {
        let user = self.username.as_deref().unwrap_or("postgres");
        let pass = self.password.as_deref().unwrap_or("");
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            user, pass, self.host, self.port, self.database, self.ssl_mode
        )
    }

    pub fn is_configured(&self) -> bool {
        self.username.is_some()
    }
}

// ── LLM (answering + summarization) ───────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "anthropic", "openai", "ollama"
    pub provider: String,
    /// Model used to answer questions (`ANSWER_MODEL`).
    pub answer_model: String,
    /// Model used to summarize documents (`SUMMARY_MODEL`).
    pub summary_model: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub ollama_url: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

fn default_answer_model(provider: &str) -> &'static str {
    match provider {
        "openai" => "gpt-4o-mini",
        "ollama" => "llama3.2",
        _ => "claude-3-5-haiku-20241022",
    }
}

fn default_summary_model(provider: &str) -> &'static str {
    match provider {
        "openai" => "gpt-4o-mini",
        "ollama" => "llama3.2",
        _ => "claude-3-haiku-20240307",
    }
}

impl LlmConfig {
    fn from_env() -> Self {
        let provider = env_or("LLM_PROVIDER", "anthropic");
        let answer_model =
            env_opt("ANSWER_MODEL").unwrap_or_else(|| default_answer_model(&provider).to_string());
        let summary_model = env_opt("SUMMARY_MODEL")
            .unwrap_or_else(|| default_summary_model(&provider).to_string());
        Self {
            provider,
            answer_model,
            summary_model,
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            max_tokens: env_u32("LLM_MAX_TOKENS", 512),
            timeout_secs: env_u64("LLM_TIMEOUT_SECS", 120),
            max_retries: env_u32("LLM_MAX_RETRIES", 3),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama", "openai"
    pub provider: String,
    pub model: String,
    pub dimensions: u32,
    pub batch_size: usize,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub ollama_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

fn default_embedding_model(provider: &str) -> &'static str {
    match provider {
        "openai" => "text-embedding-3-small",
        _ => "nomic-embed-text",
    }
}

impl EmbeddingConfig {
    fn from_env() -> Self {
        let provider = env_or("EMBEDDING_PROVIDER", "ollama");
        let model = env_opt("EMBEDDING_MODEL")
            .unwrap_or_else(|| default_embedding_model(&provider).to_string());
        Self {
            provider,
            model,
            dimensions: env_u32("EMBEDDING_DIMENSIONS", 768),
            batch_size: env_usize("EMBEDDING_BATCH_SIZE", 64),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            timeout_secs: env_u64("EMBEDDING_TIMEOUT_SECS", 60),
            max_retries: env_u32("EMBEDDING_MAX_RETRIES", 3),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Question answering ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    /// Upper bound on whitespace tokens per chunk.
    pub max_chunk_tokens: usize,
    /// Chunks retrieved per question.
    pub top_k: usize,
}

impl QaConfig {
    fn from_env() -> Self {
        Self {
            max_chunk_tokens: env_usize("MAX_CHUNK_TOKENS", 500),
            top_k: env_usize("TOP_K", 3),
        }
    }
}

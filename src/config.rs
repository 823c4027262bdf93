// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{RagError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    pub splitter: SplitterConfig,
    pub database: DatabaseConfig,
    pub openai: OpenAiConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub data_path: PathBuf,
    pub pattern: String,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default = "default_true")]
    pub strip_markdown: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub table_name: String,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    pub top_k: usize,
    pub relevance_threshold: f32,
    #[serde(default = "default_true")]
    pub show_prompt: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| RagError::Serialization(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(
                config::File::from(Path::new("config/default.toml")).required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("NOTES_RAG")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| RagError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| RagError::Config(e.to_string()))?;

        if config.openai.api_key.is_none() {
            config.openai.api_key = std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            source: SourceConfig {
                data_path: PathBuf::from("data/Personal"),
                pattern: "*.md".to_string(),
                recursive: false,
                strip_markdown: true,
            },
            splitter: SplitterConfig {
                chunk_size: 300,
                chunk_overlap: 100,
            },
            database: DatabaseConfig {
                uri: "chroma".to_string(),
                table_name: "chunks".to_string(),
                batch_size: 100,
            },
            openai: OpenAiConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                embedding_model: "text-embedding-ada-002".to_string(),
                chat_model: "gpt-3.5-turbo".to_string(),
                temperature: 0.7,
            },
            query: QueryConfig {
                top_k: 3,
                relevance_threshold: 0.7,
                show_prompt: true,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.splitter.chunk_size == 0 {
            return Err(RagError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.splitter.chunk_overlap > self.splitter.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must not exceed chunk_size ({})",
                self.splitter.chunk_overlap, self.splitter.chunk_size
            )));
        }

        if self.database.batch_size == 0 {
            return Err(RagError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }

        if self.query.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than 0".to_string()));
        }

        if !(0.0..=1.0).contains(&self.query.relevance_threshold) {
            return Err(RagError::Config(format!(
                "relevance_threshold must be within [0, 1], got {}",
                self.query.relevance_threshold
            )));
        }

        Validator::validate_url(&self.openai.base_url)
            .map_err(|e| RagError::Config(e.to_string()))?;

        Ok(())
    }

    /// Returns the API key or a configuration error naming where to set it.
    pub fn require_api_key(&self) -> Result<&str> {
        self.openai.api_key.as_deref().ok_or_else(|| {
            RagError::Config(
                "no API key configured; set OPENAI_API_KEY or NOTES_RAG__OPENAI__API_KEY"
                    .to_string(),
            )
        })
    }
}

// file: src/pipeline/query.rs
// description: embed query -> retrieve -> prompt -> answer -> redact
// reference: retrieval-augmented answering over the chunk store

use crate::config::QueryConfig;
use crate::database::VectorStore;
use crate::error::{RagError, Result};
use crate::llm::prompt::{PromptTemplate, build_context};
use crate::llm::{ChatModel, Embedder};
use crate::models::SearchResult;
use crate::utils::Validator;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct QueryAnswer {
    /// Answer after the redaction pass
    pub response: String,
    /// Source path of each retrieved chunk, in retrieval order
    pub sources: Vec<String>,
    pub prompt: String,
    pub results: Vec<SearchResult>,
}

/// Retrieved context and the filled prompt, before any model call.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    pub prompt: String,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone)]
pub enum Retrieval {
    NoMatch { best_score: Option<f32> },
    Ready(PreparedQuery),
}

#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// Nothing retrieved, or the best score fell below the threshold.
    NoMatch { best_score: Option<f32> },
    Answer(QueryAnswer),
}

pub struct QueryPipeline<'a> {
    config: &'a QueryConfig,
    embedder: &'a dyn Embedder,
    store: &'a dyn VectorStore,
    chat: &'a dyn ChatModel,
    answer_template: PromptTemplate,
    redact_template: PromptTemplate,
}

impl<'a> QueryPipeline<'a> {
    pub fn new(
        config: &'a QueryConfig,
        embedder: &'a dyn Embedder,
        store: &'a dyn VectorStore,
        chat: &'a dyn ChatModel,
    ) -> Self {
        Self {
            config,
            embedder,
            store,
            chat,
            answer_template: PromptTemplate::answer(),
            redact_template: PromptTemplate::redact(),
        }
    }

    /// Embed the query and return the top-k chunks, best first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        Validator::validate_query(query)?;

        let embedding = self.embedder.embed_query(query).await?;
        self.store
            .similarity_search(&embedding, self.config.top_k)
            .await
    }

    /// True when the best result reaches the relevance threshold.
    pub fn is_relevant(&self, results: &[SearchResult]) -> bool {
        results
            .first()
            .is_some_and(|best| best.score >= self.config.relevance_threshold)
    }

    pub fn build_prompt(&self, query: &str, results: &[SearchResult]) -> Result<String> {
        let context = build_context(results.iter().map(|r| r.chunk.content.as_str()));
        self.answer_template
            .format(&[("context", &context), ("question", query)])
    }

    /// Ask the model, then ask it again to redact sensitive content from its answer.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let answer = self.chat.complete(prompt).await?;
        debug!("Raw answer: {} chars", answer.len());

        let redact_prompt = self.redact_template.format(&[("text", &answer)])?;
        let redacted = self.chat.complete(&redact_prompt).await?;

        if redacted.trim().is_empty() {
            return Err(RagError::Api("Model returned an empty response".to_string()));
        }
        Ok(redacted)
    }

    /// Retrieve and build the prompt; the chat model is not called.
    pub async fn prepare(&self, query: &str) -> Result<Retrieval> {
        let results = self.retrieve(query).await?;
        let best_score = results.first().map(|r| r.score);

        if !self.is_relevant(&results) {
            info!(
                "No result above relevance threshold {:.2} (best: {:?})",
                self.config.relevance_threshold, best_score
            );
            return Ok(Retrieval::NoMatch { best_score });
        }
        debug!("Best relevance {:?} from {} results", best_score, results.len());

        let prompt = self.build_prompt(query, &results)?;
        Ok(Retrieval::Ready(PreparedQuery { prompt, results }))
    }

    pub async fn complete(&self, prepared: PreparedQuery) -> Result<QueryAnswer> {
        let response = self.generate(&prepared.prompt).await?;
        let sources = prepared
            .results
            .iter()
            .map(|r| r.source().to_string())
            .collect();

        Ok(QueryAnswer {
            response,
            sources,
            prompt: prepared.prompt,
            results: prepared.results,
        })
    }

    pub async fn answer(&self, query: &str) -> Result<QueryOutcome> {
        match self.prepare(query).await? {
            Retrieval::NoMatch { best_score } => Ok(QueryOutcome::NoMatch { best_score }),
            Retrieval::Ready(prepared) => Ok(QueryOutcome::Answer(self.complete(prepared).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;
    use crate::models::{Chunk, Document};
    use crate::pipeline::fakes::{KeywordEmbedder, ScriptedChat};
    use pretty_assertions::assert_eq;

    fn query_config() -> QueryConfig {
        QueryConfig {
            top_k: 3,
            relevance_threshold: 0.7,
            show_prompt: false,
        }
    }

    async fn seeded_store() -> InMemoryStore {
        let texts = [
            ("notes/garden.md", "Tomatoes want sun."),
            ("notes/garden.md", "Basil beside tomato plants."),
            ("notes/travel.md", "Passport renewal takes six weeks."),
            ("notes/travel.md", "Keep the passport receipt."),
        ];
        let chunks: Vec<Chunk> = texts
            .iter()
            .enumerate()
            .map(|(i, (source, text))| {
                let doc = Document::new(source.to_string(), source.to_string(), text.to_string(), 0);
                Chunk::from_document(&doc, text.to_string(), i)
            })
            .collect();
        let embeddings: Vec<Vec<f32>> = texts.iter().map(|(_, t)| KeywordEmbedder::vector(t)).collect();

        let store = InMemoryStore::new();
        store.rebuild(&chunks, &embeddings).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_low_relevance_short_circuits_without_generation() {
        let store = seeded_store().await;
        let embedder = KeywordEmbedder::default();
        let chat = ScriptedChat::new(&["should not be used"]);
        let config = query_config();

        let outcome = QueryPipeline::new(&config, &embedder, &store, &chat)
            .answer("what is the capital of France?")
            .await
            .unwrap();

        assert!(matches!(outcome, QueryOutcome::NoMatch { best_score: Some(s) } if s < 0.7));
        assert_eq!(chat.calls(), 0);
        assert_eq!(embedder.query_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_short_circuits() {
        let store = InMemoryStore::new();
        let embedder = KeywordEmbedder::default();
        let chat = ScriptedChat::new(&[]);
        let config = query_config();

        let outcome = QueryPipeline::new(&config, &embedder, &store, &chat)
            .answer("passport")
            .await
            .unwrap();

        assert!(matches!(outcome, QueryOutcome::NoMatch { best_score: None }));
        assert_eq!(chat.calls(), 0);
    }

    #[tokio::test]
    async fn test_qualifying_query_answers_with_sources() {
        let store = seeded_store().await;
        let embedder = KeywordEmbedder::default();
        let chat = ScriptedChat::new(&["Renewal takes six weeks, ref #4411.", "Renewal takes six weeks."]);
        let config = query_config();

        let outcome = QueryPipeline::new(&config, &embedder, &store, &chat)
            .answer("How many weeks for a passport?")
            .await
            .unwrap();

        let QueryOutcome::Answer(answer) = outcome else {
            panic!("expected an answer");
        };

        assert_eq!(answer.response, "Renewal takes six weeks.");
        assert_eq!(answer.results.len(), 3);
        assert_eq!(answer.sources[0], "notes/travel.md");
        assert_eq!(
            answer.sources,
            answer
                .results
                .iter()
                .map(|r| r.chunk.source.clone())
                .collect::<Vec<_>>()
        );
        assert!(answer.results[0].score >= 0.7);

        let prompts = chat.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Passport renewal takes six weeks."));
        assert!(prompts[0].contains("How many weeks for a passport?"));
        assert!(prompts[0].contains("\n\n---\n\n"));
        assert!(prompts[1].starts_with("\nChange the following text to hide sensitive information:"));
        assert!(prompts[1].contains("ref #4411"));
    }

    #[tokio::test]
    async fn test_empty_model_reply_is_error() {
        let store = seeded_store().await;
        let embedder = KeywordEmbedder::default();
        let chat = ScriptedChat::new(&["something", "   "]);
        let config = query_config();

        let result = QueryPipeline::new(&config, &embedder, &store, &chat)
            .answer("passport weeks")
            .await;

        assert!(matches!(result, Err(RagError::Api(_))));
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let store = seeded_store().await;
        let embedder = KeywordEmbedder::default();
        let chat = ScriptedChat::new(&[]);
        let config = query_config();

        let result = QueryPipeline::new(&config, &embedder, &store, &chat)
            .answer("   ")
            .await;

        assert!(matches!(result, Err(RagError::Validation(_))));
        assert_eq!(embedder.query_calls(), 0);
    }

    #[tokio::test]
    async fn test_prepare_builds_prompt_without_generation() {
        let store = seeded_store().await;
        let embedder = KeywordEmbedder::default();
        let chat = ScriptedChat::new(&["unreachable"]);
        let config = query_config();
        let pipeline = QueryPipeline::new(&config, &embedder, &store, &chat);

        let Retrieval::Ready(prepared) = pipeline.prepare("passport weeks").await.unwrap() else {
            panic!("expected a qualifying retrieval");
        };
        assert!(prepared.prompt.contains("Passport renewal takes six weeks."));
        assert_eq!(chat.calls(), 0);

        // the only scripted reply is consumed, so the redaction call fails
        let result = pipeline.complete(prepared).await;
        assert!(matches!(result, Err(RagError::Api(_))));
        assert_eq!(chat.calls(), 1);
    }

    #[test]
    fn test_score_equal_to_threshold_is_relevant() {
        let store = InMemoryStore::new();
        let embedder = KeywordEmbedder::default();
        let chat = ScriptedChat::new(&[]);
        let config = query_config();
        let pipeline = QueryPipeline::new(&config, &embedder, &store, &chat);

        let doc = Document::new("a.md".into(), "a.md".into(), "text".into(), 0);
        let result = |score: f32| SearchResult::new(Chunk::from_document(&doc, "text".into(), 0), score, None);

        assert!(pipeline.is_relevant(&[result(0.7)]));
        assert!(pipeline.is_relevant(&[result(0.7), result(0.1)]));
        assert!(!pipeline.is_relevant(&[result(0.69)]));
        assert!(!pipeline.is_relevant(&[]));
    }
}

// file: src/pipeline/fakes.rs
// description: in-process Embedder and ChatModel doubles for pipeline tests
// reference: test doubles behind the llm ports

use crate::error::{RagError, Result};
use crate::llm::{ChatModel, Embedder};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

const KEYWORDS: [&str; 6] = ["tomato", "basil", "passport", "receipt", "sun", "weeks"];

/// One dimension per keyword; a text scores 1.0 on every keyword it contains.
#[derive(Default)]
pub struct KeywordEmbedder {
    document_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        KEYWORDS
            .iter()
            .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
            .collect()
    }

    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }
}

/// Replies with canned responses in order and records every prompt.
pub struct ScriptedChat {
    replies: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedChat {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut prompts = self
            .prompts
            .lock()
            .map_err(|_| RagError::Api("chat double poisoned".to_string()))?;
        let reply = self
            .replies
            .get(prompts.len())
            .cloned()
            .ok_or_else(|| RagError::Api("no scripted reply left".to_string()))?;
        prompts.push(prompt.to_string());
        Ok(reply)
    }
}

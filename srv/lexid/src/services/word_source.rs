use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use thiserror::Error;

use crate::models::{GameConfig, Locale, WordOrigin};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("word generator has no API key configured")]
    MissingCredential,

    #[error("word generator request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no valid words generated")]
    NoValidWords,

    #[error("no fallback words available for {locale} words of length {length}")]
    NoFallbackTable { locale: Locale, length: usize },

    #[error("no valid fallback words available for the current keyboard configuration")]
    NoUsableFallbackWords,
}

/// Candidate words produced for a config; the first one becomes the answer
#[derive(Debug, Clone)]
pub struct GeneratedWords {
    pub words: Vec<String>,
    pub origin: WordOrigin,
}

#[async_trait]
pub trait WordSource: Send + Sync {
    async fn generate(&self, config: &GameConfig) -> Result<GeneratedWords, GenerationError>;
}

/// Lets one source be shared by several owners
#[async_trait]
impl<S: WordSource + ?Sized> WordSource for Arc<S> {
    async fn generate(&self, config: &GameConfig) -> Result<GeneratedWords, GenerationError> {
        (**self).generate(config).await
    }
}

/// Tries the primary source and falls back to the secondary one on any error
pub struct CompositeWordSource {
    primary: Box<dyn WordSource>,
    fallback: Box<dyn WordSource>,
}

impl CompositeWordSource {
    pub fn new(primary: Box<dyn WordSource>, fallback: Box<dyn WordSource>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl WordSource for CompositeWordSource {
    async fn generate(&self, config: &GameConfig) -> Result<GeneratedWords, GenerationError> {
        match self.primary.generate(config).await {
            Ok(words) => Ok(words),
            Err(e) => {
                warn!("Primary word source failed, using fallback: {}", e);
                let words = self.fallback.generate(config).await?;
                debug!("Fallback produced {} candidates", words.words.len());
                Ok(words)
            }
        }
    }
}

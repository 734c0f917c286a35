use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use crate::models::{GameConfig, WordOrigin};
use crate::services::word_source::{GeneratedWords, GenerationError, WordSource};

/// Candidates and answers already handed out for one keyboard setup
#[derive(Debug)]
struct Ledger {
    available: Vec<String>,
    origin: WordOrigin,
    used: HashSet<String>,
}

impl Ledger {
    /// Hand out the first candidate not used yet
    fn take_unused(&mut self) -> Option<(String, WordOrigin)> {
        let word = self
            .available
            .iter()
            .find(|word| !self.used.contains(*word))?
            .clone();
        self.used.insert(word.clone());
        Some((word, self.origin))
    }
}

/// Serves words without repeating one until the candidates run out
///
/// Candidates are cached per locale, word length and allowed letters. When
/// every cached candidate has been served a new list is generated; if that
/// list holds nothing new either, the history is cleared and its first word
/// is served again.
pub struct WordLedger {
    source: Box<dyn WordSource>,
    ledgers: Mutex<HashMap<String, Ledger>>,
}

fn ledger_key(config: &GameConfig) -> String {
    let letters: String = config.allowed_letters().into_iter().collect();
    format!("{}-{}-{}", config.locale, config.word_length, letters)
}

impl WordLedger {
    pub fn new(source: Box<dyn WordSource>) -> Self {
        Self {
            source,
            ledgers: Mutex::new(HashMap::new()),
        }
    }

    /// Return a word not served before for this config
    pub async fn next_word(
        &self,
        config: &GameConfig,
    ) -> Result<(String, WordOrigin), GenerationError> {
        let key = ledger_key(config);

        let cached = self.lock().get_mut(&key).and_then(Ledger::take_unused);
        if let Some(found) = cached {
            debug!("Serving cached word for {}", key);
            return Ok(found);
        }

        let GeneratedWords { words, origin } = self.source.generate(config).await?;
        let words: Vec<String> = words.into_iter().map(|w| w.to_uppercase()).collect();
        let first = words.first().cloned().ok_or(GenerationError::NoValidWords)?;

        let mut ledgers = self.lock();
        let ledger = ledgers.entry(key.clone()).or_insert_with(|| Ledger {
            available: Vec::new(),
            origin,
            used: HashSet::new(),
        });
        ledger.available = words;
        ledger.origin = origin;

        if let Some(found) = ledger.take_unused() {
            debug!("Serving fresh word for {}", key);
            return Ok(found);
        }

        info!("Every word for {} has been served, starting over", key);
        ledger.used.clear();
        ledger.used.insert(first.clone());
        Ok((first, origin))
    }

    /// Number of words served for a config since its history was last cleared
    pub fn used_count(&self, config: &GameConfig) -> usize {
        self.lock()
            .get(&ledger_key(config))
            .map_or(0, |ledger| ledger.used.len())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Ledger>> {
        self.ledgers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

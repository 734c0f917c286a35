use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use log::{debug, info};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::{GameConfig, GameMode, GuessResult, InitResponse, Locale, WordOrigin};
use crate::services::scorer::score;
use crate::services::word_source::{GenerationError, WordSource};

/// A started game; never changes after creation
#[derive(Debug, Clone)]
pub struct GameSession {
    pub answer: String,
    pub config: GameConfig,
    pub source: WordOrigin,
}

/// Daily games sharing one answer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DailyKey {
    locale: Locale,
    length: usize,
    letters: String,
    date: NaiveDate,
}

impl DailyKey {
    fn new(config: &GameConfig, date: NaiveDate) -> Self {
        let mut letters = config.allowed_letters();
        letters.sort_unstable();
        Self {
            locale: config.locale,
            length: config.word_length,
            letters: letters.into_iter().collect(),
            date,
        }
    }
}

#[derive(Debug, Default)]
struct Games {
    sessions: HashMap<String, Arc<GameSession>>,
    // creation order, oldest first
    order: VecDeque<String>,
}

/// In-memory map of game ids to their answers
pub struct GameRegistry {
    source: Box<dyn WordSource>,
    games: Mutex<Games>,
    daily: Mutex<HashMap<DailyKey, (String, WordOrigin)>>,
    max_games: Option<usize>,
}

impl GameRegistry {
    /// `max_games` bounds the number of live sessions; `None` keeps every game
    pub fn new(source: Box<dyn WordSource>, max_games: Option<usize>) -> Self {
        Self {
            source,
            games: Mutex::new(Games::default()),
            daily: Mutex::new(HashMap::new()),
            max_games,
        }
    }

    /// Start a game and return its id
    pub async fn initialize(&self, config: GameConfig) -> Result<InitResponse, ServiceError> {
        self.initialize_on(config, Utc::now().date_naive()).await
    }

    pub(crate) async fn initialize_on(
        &self,
        config: GameConfig,
        today: NaiveDate,
    ) -> Result<InitResponse, ServiceError> {
        let (answer, source) = match config.mode {
            GameMode::Daily => self.daily_answer(&config, today).await?,
            _ => self.fresh_answer(&config).await?,
        };

        let game_id = Uuid::new_v4().to_string();
        info!(
            "Starting {:?} game {} ({} {} letters, {:?} word)",
            config.mode, game_id, config.locale, config.word_length, source
        );
        debug!("Answer for game {}: {}", game_id, answer);

        self.insert(
            game_id.clone(),
            GameSession {
                answer,
                config,
                source,
            },
        );

        Ok(InitResponse { game_id, source })
    }

    async fn fresh_answer(&self, config: &GameConfig) -> Result<(String, WordOrigin), ServiceError> {
        let generated = self.source.generate(config).await?;
        let answer = generated
            .words
            .into_iter()
            .next()
            .ok_or(GenerationError::NoValidWords)?;
        Ok((answer.to_uppercase(), generated.origin))
    }

    async fn daily_answer(
        &self,
        config: &GameConfig,
        today: NaiveDate,
    ) -> Result<(String, WordOrigin), ServiceError> {
        let key = DailyKey::new(config, today);
        let cached = self.lock_daily().get(&key).cloned();
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let fresh = self.fresh_answer(config).await?;

        let mut daily = self.lock_daily();
        daily.retain(|k, _| k.date == today);
        // a concurrent request may have stored the day's word while we waited
        Ok(daily.entry(key).or_insert(fresh).clone())
    }

    fn insert(&self, game_id: String, session: GameSession) {
        let mut games = self.lock_games();
        games.order.push_back(game_id.clone());
        games.sessions.insert(game_id, Arc::new(session));

        if let Some(max) = self.max_games {
            while games.sessions.len() > max {
                match games.order.pop_front() {
                    Some(oldest) => {
                        games.sessions.remove(&oldest);
                        debug!("Evicted game {}", oldest);
                    }
                    None => break,
                }
            }
        }
    }

    /// Look up a game by id
    pub fn resolve(&self, game_id: &str) -> Result<Arc<GameSession>, ServiceError> {
        self.lock_games()
            .sessions
            .get(game_id)
            .cloned()
            .ok_or(ServiceError::GameNotFound)
    }

    /// Score a guess against the answer of a game
    ///
    /// Guesses whose length differs from the answer are rejected before scoring.
    pub fn validate_guess(&self, guess: &str, game_id: &str) -> Result<GuessResult, ServiceError> {
        let session = self.resolve(game_id)?;

        let expected = session.answer.chars().count();
        let actual = guess.trim().to_uppercase().chars().count();
        if actual != expected {
            return Err(ServiceError::validation(
                "Invalid guess length",
                Some(format!("expected {} letters, got {}", expected, actual)),
            ));
        }

        debug!(
            "Validating guess {} for {:?} game {} ({:?} word)",
            guess, session.config.mode, game_id, session.source
        );
        Ok(score(guess.trim(), &session.answer))
    }

    pub fn len(&self) -> usize {
        self.lock_games().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_games().sessions.is_empty()
    }

    fn lock_games(&self) -> MutexGuard<'_, Games> {
        self.games.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_daily(&self) -> MutexGuard<'_, HashMap<DailyKey, (String, WordOrigin)>> {
        self.daily.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ServiceError;
use crate::services::rate_limiter::RateLimiter;
use crate::services::registry::GameRegistry;
use crate::services::settings::SettingsStore;
use crate::services::word_ledger::WordLedger;

/// Word lengths a new game may be started with
pub const MIN_WORD_LENGTH: usize = 4;
pub const MAX_WORD_LENGTH: usize = 8;

/// Application state shared across all handlers
pub struct AppState {
    pub registry: GameRegistry,
    pub ledger: WordLedger,
    pub limiter: RateLimiter,
    pub settings: SettingsStore,
    pub limits: RateLimits,
}

/// Requests allowed per client per window, by action
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub init: u32,
    pub guess: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self { init: 5, guess: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "EN")]
    En,
    #[serde(rename = "PL")]
    Pl,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Pl];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "EN",
            Locale::Pl => "PL",
        }
    }

    /// Language name as used when asking the generator for words
    pub fn language(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Pl => "Polish",
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Pl => "Polski",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Daily,
    Practice,
    Custom,
}

/// Game configuration as sent by the browser client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(rename = "maxWordLength")]
    pub word_length: usize,
    #[serde(rename = "maxGuesses")]
    pub max_guesses: usize,
    #[serde(rename = "gameMode")]
    pub mode: GameMode,
    pub locale: Locale,
    #[serde(rename = "keyboardRows")]
    pub keyboard_rows: Vec<Vec<String>>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let row = |keys: &[&str]| keys.iter().map(|k| k.to_string()).collect::<Vec<_>>();
        Self {
            word_length: 5,
            max_guesses: 6,
            mode: GameMode::Practice,
            locale: Locale::En,
            keyboard_rows: vec![
                row(&["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"]),
                row(&["A", "S", "D", "F", "G", "H", "J", "K", "L"]),
                row(&["ENTER", "Z", "X", "C", "V", "B", "N", "M", "BACK"]),
            ],
        }
    }
}

impl GameConfig {
    /// Letters a word may use, in keyboard order without repeats.
    ///
    /// Only single-character keys count; labels like `ENTER` and `BACK` are
    /// control keys.
    pub fn allowed_letters(&self) -> Vec<char> {
        let mut letters = Vec::new();
        for key in self.keyboard_rows.iter().flatten() {
            let mut chars = key.trim().chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                for upper in ch.to_uppercase() {
                    if !letters.contains(&upper) {
                        letters.push(upper);
                    }
                }
            }
        }
        letters
    }

    /// Check the constraints a config must satisfy to start a game
    pub fn validate_for_init(&self) -> Result<(), ServiceError> {
        if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&self.word_length) {
            return Err(ServiceError::validation(
                "Invalid config structure",
                Some(format!(
                    "maxWordLength must be between {} and {}",
                    MIN_WORD_LENGTH, MAX_WORD_LENGTH
                )),
            ));
        }
        if self.max_guesses < 1 {
            return Err(ServiceError::validation(
                "Invalid config structure",
                Some("maxGuesses must be at least 1".to_string()),
            ));
        }
        if self.mode == GameMode::Custom {
            return Err(ServiceError::validation(
                "Invalid config structure",
                Some("gameMode must be 'daily' or 'practice'".to_string()),
            ));
        }
        Ok(())
    }
}

/// Feedback for a single guessed letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LetterStatus {
    InPosition,
    OutOfPosition,
    NotInWord,
}

impl LetterStatus {
    /// Numeric code understood by the browser client
    pub fn code(self) -> u8 {
        match self {
            LetterStatus::InPosition => 0,
            LetterStatus::OutOfPosition => 1,
            LetterStatus::NotInWord => 2,
        }
    }
}

impl Serialize for LetterStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessResult {
    pub correct: bool,
    #[serde(rename = "letterStatuses")]
    pub letter_statuses: BTreeMap<usize, LetterStatus>,
}

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordOrigin {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitResponse {
    #[serde(rename = "gameId")]
    pub game_id: String,
    pub source: WordOrigin,
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub guess: String,
    #[serde(rename = "gameId")]
    pub game_id: String,
}

/// Keyboard setup a word is requested for
#[derive(Debug, Deserialize)]
pub struct WordRequest {
    pub locale: Locale,
    #[serde(rename = "maxWordLength")]
    pub word_length: usize,
    #[serde(rename = "keyboardRows")]
    pub keyboard_rows: Vec<Vec<String>>,
}

impl WordRequest {
    pub fn into_config(self) -> GameConfig {
        GameConfig {
            word_length: self.word_length,
            locale: self.locale,
            keyboard_rows: self.keyboard_rows,
            ..GameConfig::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WordResponse {
    pub word: String,
    pub source: WordOrigin,
}

/// Query string carrying a JSON config
#[derive(Debug, Deserialize)]
pub struct ConfigQuery {
    pub config: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Serialize)]
pub struct LocaleInfo {
    pub name: String,
    pub code: String,
}

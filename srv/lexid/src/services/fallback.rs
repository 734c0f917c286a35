use async_trait::async_trait;
use log::debug;

use crate::models::{GameConfig, Locale, WordOrigin};
use crate::services::word_source::{GeneratedWords, GenerationError, WordSource};
use crate::utils::{has_length, shuffled, uses_only_letters};

const EN_4: &[&str] = &[
    "ABLE", "BABY", "CALM", "DARK", "EASY", "FISH", "GOOD", "HELP", "IDEA", "JUMP",
    "KIND", "LOVE", "MIND", "NICE", "OPEN", "PLAY", "QUIT", "READ", "SING", "TIME",
];
const EN_5: &[&str] = &[
    "APPLE", "BEACH", "CLOUD", "DANCE", "EARTH", "FLAME", "GRACE", "HAPPY", "IVORY", "JUICE",
    "KNOTS", "LEMON", "MUSIC", "NIGHT", "OCEAN", "PEACE", "QUEEN", "RIVER", "SMILE", "THINK",
];
const EN_6: &[&str] = &[
    "ACTION", "BEAUTY", "CHANGE", "DESIGN", "ENERGY", "FAMILY", "GARDEN", "HEALTH", "IMPACT",
    "JUNGLE", "KNIGHT", "LEADER", "MEMORY", "NATURE", "ORANGE", "PEOPLE", "REASON", "SIMPLE",
    "TRAVEL",
];
const EN_7: &[&str] = &[
    "AMAZING", "BALANCE", "COMFORT", "DIAMOND", "ELEGANT", "FREEDOM", "GENUINE", "HARMONY",
    "INSPIRE", "JOURNEY", "KINDRED", "LOGICAL", "MYSTERY", "NATURAL", "ORGANIC", "PERFECT",
    "QUALITY", "RESPECT", "SILENCE", "THOUGHT",
];
const EN_8: &[&str] = &[
    "ABSOLUTE", "CREATIVE", "DELICATE", "FRIENDLY", "GRACEFUL", "HARMONIC", "INFINITE",
    "JOYFULLY", "KINDNESS", "LAUGHTER", "MAGNETIC", "ORIGINAL", "PEACEFUL", "TOGETHER",
];

const PL_4: &[&str] = &[
    "CZAS", "FALA", "GÓRA", "KAWA", "LATO", "MAPA", "NOGA", "OKNO", "PIES", "RAMA",
    "SALA", "TATA", "WODA", "ZONA", "RUCH", "SENS", "TLEN", "WIEK", "ZNAK",
];
const PL_5: &[&str] = &[
    "BIALY", "CZARY", "DROGA", "FAJNY", "GLOWA", "JASNY", "KOLOR", "LAMPA", "MLODY", "NIEBO",
    "OBRAZ", "PRACA", "RADIO", "SLOWO", "ULICA", "WIATR", "ZAMEK", "ZEGAR", "KWIAT", "EKRAN",
    "JEZYK", "OBIAD",
];
const PL_6: &[&str] = &[
    "AKCENT", "BALKON", "CHMURA", "DRZEWO", "FRYZUR", "GITARA", "HANDEL", "ISKIER", "KAMERA",
    "LAMPER", "MIASTO", "NATURA", "PROSTO", "RADOSC", "SLONCE", "TANCZY", "ULOTKA", "APTEKA",
    "BALWAN", "CEBULA", "JABLKO", "MALINA", "PACZKA", "TANIEC",
];
const PL_7: &[&str] = &[
    "DRABINA", "FORTUNA", "GWIAZDA", "HERBATA", "IMPREZA", "KAPUSTA", "LATARKA", "OKULARY",
    "RAKIETA", "SERWETA", "TABLICA", "UBRANIE", "BANDANA", "EKSPRES", "MALOWAC", "UCZCIWY",
];
const PL_8: &[&str] = &[
    "AKADEMIA", "CZEKOLAD", "FANTAZJA", "GITAROWY", "HORYZONT", "IMIENINY", "LATARNIA",
    "NADZIEJA", "PATELNIA", "ROWEROWY", "SAMOCHOD", "EKOLOGIA",
];

/// Built-in words for a locale and word length
pub fn word_table(locale: Locale, length: usize) -> Option<&'static [&'static str]> {
    let table = match (locale, length) {
        (Locale::En, 4) => EN_4,
        (Locale::En, 5) => EN_5,
        (Locale::En, 6) => EN_6,
        (Locale::En, 7) => EN_7,
        (Locale::En, 8) => EN_8,
        (Locale::Pl, 4) => PL_4,
        (Locale::Pl, 5) => PL_5,
        (Locale::Pl, 6) => PL_6,
        (Locale::Pl, 7) => PL_7,
        (Locale::Pl, 8) => PL_8,
        _ => return None,
    };
    Some(table)
}

/// Picks answers from the built-in word tables
#[derive(Debug, Default)]
pub struct FallbackWordSource;

impl FallbackWordSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WordSource for FallbackWordSource {
    async fn generate(&self, config: &GameConfig) -> Result<GeneratedWords, GenerationError> {
        let table = word_table(config.locale, config.word_length).ok_or(
            GenerationError::NoFallbackTable {
                locale: config.locale,
                length: config.word_length,
            },
        )?;

        let allowed = config.allowed_letters();
        let candidates: Vec<String> = table
            .iter()
            .filter(|word| has_length(word, config.word_length) && uses_only_letters(word, &allowed))
            .map(|word| word.to_string())
            .collect();

        if candidates.is_empty() {
            return Err(GenerationError::NoUsableFallbackWords);
        }

        debug!(
            "Fallback has {} of {} {} words usable for length {}",
            candidates.len(),
            table.len(),
            config.locale,
            config.word_length
        );

        Ok(GeneratedWords {
            words: shuffled(candidates),
            origin: WordOrigin::Fallback,
        })
    }
}

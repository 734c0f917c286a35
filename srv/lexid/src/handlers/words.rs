use actix_web::{get, web, HttpRequest, HttpResponse};
use log::info;

use crate::error::ServiceError;
use crate::handlers::config_param;
use crate::models::{AppState, WordRequest, WordResponse, MAX_WORD_LENGTH, MIN_WORD_LENGTH};

/// Serve a word the caller has not been given before for this keyboard setup
#[get("/words")]
pub async fn get_word(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let raw = config_param(&req)?.ok_or_else(|| ServiceError::validation("Invalid config", None))?;
    let request: WordRequest = serde_json::from_str(&raw)
        .map_err(|e| ServiceError::validation("Invalid config", Some(e.to_string())))?;
    if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&request.word_length) {
        return Err(ServiceError::validation(
            "Invalid config",
            Some(format!(
                "maxWordLength must be between {} and {}",
                MIN_WORD_LENGTH, MAX_WORD_LENGTH
            )),
        ));
    }

    let config = request.into_config();
    let (word, source) = data
        .ledger
        .next_word(&config)
        .await
        .map_err(ServiceError::WordList)?;
    info!(
        "Served {:?} word for {} {} letters ({} used so far)",
        source,
        config.locale,
        config.word_length,
        data.ledger.used_count(&config)
    );

    Ok(HttpResponse::Ok().json(WordResponse { word, source }))
}

use actix_web::{get, post, web, HttpResponse, Responder};
use log::info;
use serde_json::Value;

use crate::error::ServiceError;
use crate::models::{AppState, GameConfig, Locale, LocaleInfo};

#[get("/locales")]
pub async fn get_locales() -> impl Responder {
    let locales: Vec<LocaleInfo> = Locale::ALL
        .iter()
        .map(|locale| LocaleInfo {
            name: locale.native_name().to_string(),
            code: locale.code().to_string(),
        })
        .collect();

    HttpResponse::Ok().json(locales)
}

#[get("/config")]
pub async fn get_config(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.settings.get())
}

fn is_positive(value: Option<&Value>) -> bool {
    value.and_then(Value::as_u64).is_some_and(|n| n >= 1)
}

fn check_settings(value: &Value) -> Result<(), ServiceError> {
    if !is_positive(value.get("maxWordLength")) {
        return Err(ServiceError::validation("Invalid maxWordLength", None));
    }
    if !is_positive(value.get("maxGuesses")) {
        return Err(ServiceError::validation("Invalid maxGuesses", None));
    }
    let mode = value.get("gameMode").and_then(Value::as_str);
    if !matches!(mode, Some("daily" | "practice" | "custom")) {
        return Err(ServiceError::validation("Invalid gameMode", None));
    }
    Ok(())
}

/// Overlay the posted fields on the current settings; fields left out keep
/// their stored value
fn merge_settings(current: GameConfig, posted: Value) -> Result<GameConfig, ServiceError> {
    fn invalid(e: serde_json::Error) -> ServiceError {
        ServiceError::validation("Invalid request body", Some(e.to_string()))
    }

    let Value::Object(fields) = posted else {
        return Err(ServiceError::validation("Invalid request body", None));
    };
    let mut merged = serde_json::to_value(current).map_err(invalid)?;
    if let Value::Object(stored) = &mut merged {
        stored.extend(fields);
    }
    serde_json::from_value(merged).map_err(invalid)
}

#[post("/config")]
pub async fn update_config(
    data: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|_| ServiceError::validation("Invalid request body", None))?;
    check_settings(&value)?;

    let config = merge_settings(data.settings.get(), value)?;

    info!(
        "Updated settings: {} {} letters, {} guesses, {:?}",
        config.locale, config.word_length, config.max_guesses, config.mode
    );
    data.settings.replace(config.clone());

    Ok(HttpResponse::Ok().json(config))
}

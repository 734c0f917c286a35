use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::Value;

use crate::error::{with_rate_headers, ServiceError};
use crate::handlers::config_param;
use crate::models::{AppState, GameConfig, GuessRequest};
use crate::services::rate_limiter::{Action, RateLimitDecision};
use crate::utils::client_identifier;

fn check_rate(
    req: &HttpRequest,
    data: &web::Data<AppState>,
    action: Action,
) -> Result<RateLimitDecision, ServiceError> {
    let client = client_identifier(req);
    let limit = match action {
        Action::Init => data.limits.init,
        Action::Guess => data.limits.guess,
    };

    let decision = data.limiter.check_limit(&client, action, limit);
    if decision.allowed {
        return Ok(decision);
    }

    info!(
        "Rate limited {} request from {} ({} clients tracked)",
        action.as_str(),
        client,
        data.limiter.len()
    );
    let message = match action {
        Action::Init => "Too many initialization requests. Please try again later.",
        Action::Guess => "Too many guess attempts. Please try again later.",
    };
    Err(ServiceError::RateLimited { message, decision })
}

async fn start_game(
    data: &web::Data<AppState>,
    value: Value,
    decision: RateLimitDecision,
) -> Result<HttpResponse, ServiceError> {
    let config: GameConfig = serde_json::from_value(value)
        .map_err(|e| ServiceError::validation("Invalid config structure", Some(e.to_string())))?;
    config.validate_for_init()?;

    let result = data.registry.initialize(config).await?;
    info!("Game {} ready, {} games live", result.game_id, data.registry.len());
    Ok(with_rate_headers(HttpResponse::Ok(), &decision).json(result))
}

/// Start a game from a JSON config passed in the `config` query parameter
#[get("/game/init")]
pub async fn init_game_query(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let decision = check_rate(&req, &data, Action::Init)?;

    let raw = config_param(&req)?
        .ok_or_else(|| ServiceError::validation("Config parameter is required", None))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| ServiceError::validation("Invalid config JSON", Some(e.to_string())))?;

    start_game(&data, value, decision).await
}

/// Start a game from a JSON config in the request body
#[post("/game/init")]
pub async fn init_game_body(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let decision = check_rate(&req, &data, Action::Init)?;

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ServiceError::validation("Invalid JSON body", Some(e.to_string())))?;

    start_game(&data, value, decision).await
}

#[put("/game/guess")]
pub async fn submit_guess(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ServiceError::validation("Invalid JSON body", Some(e.to_string())))?;
    let request: GuessRequest = serde_json::from_value(value)
        .map_err(|e| ServiceError::validation("Invalid request data", Some(e.to_string())))?;

    let decision = check_rate(&req, &data, Action::Guess)?;

    let result = data.registry.validate_guess(&request.guess, &request.game_id)?;
    Ok(with_rate_headers(HttpResponse::Ok(), &decision).json(result))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    use super::*;
    use crate::handlers::{test_state, test_state_with};
    use crate::models::{GameMode, RateLimits, WordOrigin};
    use crate::services::word_source::fixtures::{Failing, FixedWords};

    fn config_json() -> Value {
        serde_json::to_value(GameConfig::default()).unwrap()
    }

    macro_rules! app {
        ($data:expr) => {
            test::init_service(
                App::new()
                    .app_data($data.clone())
                    .service(init_game_query)
                    .service(init_game_body)
                    .service(submit_guess),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_init_then_guess() {
        let data = test_state(Box::new(FixedWords::new(&["APPLE"], WordOrigin::Generated)));
        let app = app!(data);

        let req = test::TestRequest::post()
            .uri("/game/init")
            .set_json(config_json())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("X-RateLimit-Limit").unwrap(), "5");
        assert_eq!(resp.headers().get("X-RateLimit-Remaining").unwrap(), "4");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["source"], "generated");
        let game_id = body["gameId"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri("/game/guess")
            .set_json(json!({"guess": "papal", "gameId": game_id}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"correct": false, "letterStatuses": {"0": 1, "1": 1, "2": 0, "3": 2, "4": 1}})
        );
    }

    #[actix_web::test]
    async fn test_init_from_query_parameter() {
        let data = test_state(Box::new(FixedWords::new(&["APPLE"], WordOrigin::Fallback)));
        let app = app!(data);

        let config = config_json().to_string();
        let url = reqwest::Url::parse_with_params("http://localhost/game/init", &[("config", &config)])
            .unwrap();
        let req = test::TestRequest::get()
            .uri(&format!("/game/init?{}", url.query().unwrap()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["source"], "fallback");
    }

    #[actix_web::test]
    async fn test_init_requires_config() {
        let data = test_state(Box::new(FixedWords::new(&["APPLE"], WordOrigin::Generated)));
        let app = app!(data);

        let req = test::TestRequest::get().uri("/game/init").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Config parameter is required");
    }

    #[actix_web::test]
    async fn test_malformed_query_gets_json_error() {
        let data = test_state(Box::new(FixedWords::new(&["APPLE"], WordOrigin::Generated)));
        let app = app!(data);

        for uri in ["/game/init?config=1&config=2", "/game/init?config=%ZZ"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
            let body: Value = test::read_body_json(resp).await;
            assert!(body["error"].is_string(), "{}", uri);
        }

        let req = test::TestRequest::get()
            .uri("/game/init?config=1&config=2")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["error"], "Invalid query string");
        assert_eq!(data.limiter.len(), 1);
    }

    #[actix_web::test]
    async fn test_init_rejects_invalid_config() {
        let data = test_state(Box::new(FixedWords::new(&["APPLE"], WordOrigin::Generated)));
        let app = app!(data);

        let mut too_long = config_json();
        too_long["maxWordLength"] = json!(9);
        let mut custom = config_json();
        custom["gameMode"] = json!(GameMode::Custom);
        let mut no_rows = config_json();
        no_rows.as_object_mut().unwrap().remove("keyboardRows");
        let mut bad_locale = config_json();
        bad_locale["locale"] = json!("DE");

        for config in [too_long, custom, no_rows, bad_locale] {
            let req = test::TestRequest::post()
                .uri("/game/init")
                .set_json(config)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "Invalid config structure");
        }

        let req = test::TestRequest::post()
            .uri("/game/init")
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_init_reports_generation_failure() {
        let data = test_state(Box::new(Failing));
        let app = app!(data);

        let req = test::TestRequest::post()
            .uri("/game/init")
            .set_json(config_json())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Failed to initialize game");
        assert!(body["details"].is_string());
    }

    #[actix_web::test]
    async fn test_init_is_rate_limited_per_client() {
        let data = test_state(Box::new(FixedWords::new(&["APPLE"], WordOrigin::Generated)));
        let app = app!(data);

        let init = |ip: &str| {
            test::TestRequest::post()
                .uri("/game/init")
                .insert_header(("X-Forwarded-For", ip.to_string()))
                .set_json(config_json())
                .to_request()
        };

        for _ in 0..5 {
            let resp = test::call_service(&app, init("10.0.0.1")).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        let resp = test::call_service(&app, init("10.0.0.1")).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get("X-RateLimit-Remaining").unwrap(), "0");
        assert!(resp.headers().contains_key("Retry-After"));

        let resp = test::call_service(&app, init("10.0.0.2")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_guess_for_unknown_game_is_not_found() {
        let data = test_state(Box::new(FixedWords::new(&["APPLE"], WordOrigin::Generated)));
        let app = app!(data);

        let req = test::TestRequest::put()
            .uri("/game/guess")
            .set_json(json!({"guess": "APPLE", "gameId": "missing"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Game not found");
    }

    #[actix_web::test]
    async fn test_guess_shape_is_validated_before_rate_limit() {
        let data = test_state(Box::new(FixedWords::new(&["APPLE"], WordOrigin::Generated)));
        let app = app!(data);

        let req = test::TestRequest::put()
            .uri("/game/guess")
            .set_json(json!({"guess": "APPLE"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid request data");
        assert!(data.limiter.is_empty());
    }

    #[actix_web::test]
    async fn test_guess_is_rate_limited() {
        let data = test_state_with(
            Box::new(FixedWords::new(&["APPLE"], WordOrigin::Generated)),
            RateLimits { init: 5, guess: 1 },
        );
        let app = app!(data);

        let guess = || {
            test::TestRequest::put()
                .uri("/game/guess")
                .set_json(json!({"guess": "APPLE", "gameId": "missing"}))
                .to_request()
        };
        let resp = test::call_service(&app, guess()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = test::call_service(&app, guess()).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Too many guess attempts. Please try again later.");
    }
}

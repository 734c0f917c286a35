mod error;
mod handlers;
mod models;
mod services;
mod utils;

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware, web, App, HttpServer};
use clap::{value_parser, Arg, Command};
use log::{info, warn};

use crate::models::{AppState, GameConfig, RateLimits};
use crate::services::fallback::FallbackWordSource;
use crate::services::generator::{GeneratorSettings, LlmWordGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::services::rate_limiter::RateLimiter;
use crate::services::registry::GameRegistry;
use crate::services::settings::SettingsStore;
use crate::services::word_ledger::WordLedger;
use crate::services::word_source::{CompositeWordSource, WordSource};

// Function to initialize logging
fn init_logging(log_file: Option<&String>) -> io::Result<()> {
    if let Some(file) = log_file {
        let log_output = OpenOptions::new().create(true).append(true).open(file)?;

        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(log_output)))
            .init();
    } else {
        env_logger::init();
    }
    Ok(())
}

fn cli() -> Command {
    Command::new("lexid")
        .version("1.0")
        .author("Ron Straight <straightre@gmail.com>")
        .about("Game and word service for LexiGuess")
        .arg(
            Arg::new("listen-host")
                .long("listen-host")
                .num_args(1)
                .default_value("0.0.0.0:2345")
                .help("Specify the listen address (e.g., 0.0.0.0:2345)"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .num_args(1)
                .help("Specify a log file path (if omitted, logs to stderr)"),
        )
        .arg(
            Arg::new("llm-api-key")
                .long("llm-api-key")
                .num_args(1)
                .env("OPENAI_API_KEY")
                .hide_env_values(true)
                .help("API key for the word generator (without one, fallback words are used)"),
        )
        .arg(
            Arg::new("llm-base-url")
                .long("llm-base-url")
                .num_args(1)
                .default_value(DEFAULT_BASE_URL)
                .help("Base URL of the chat-completion API"),
        )
        .arg(
            Arg::new("llm-model")
                .long("llm-model")
                .num_args(1)
                .default_value(DEFAULT_MODEL)
                .help("Model asked for words"),
        )
        .arg(
            Arg::new("llm-timeout-secs")
                .long("llm-timeout-secs")
                .num_args(1)
                .default_value("10")
                .value_parser(value_parser!(u64).range(1..))
                .help("Seconds to wait for the word generator"),
        )
        .arg(
            Arg::new("init-limit")
                .long("init-limit")
                .num_args(1)
                .default_value("5")
                .value_parser(value_parser!(u32))
                .help("Game initializations allowed per client per minute"),
        )
        .arg(
            Arg::new("guess-limit")
                .long("guess-limit")
                .num_args(1)
                .default_value("10")
                .value_parser(value_parser!(u32))
                .help("Guesses allowed per client per minute"),
        )
        .arg(
            Arg::new("max-games")
                .long("max-games")
                .num_args(1)
                .value_parser(value_parser!(u64).range(1..))
                .help("Keep at most this many games in memory, dropping the oldest (default: unbounded)"),
        )
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let matches = cli().get_matches();

    let listen_host = matches
        .get_one::<String>("listen-host")
        .expect("listen-host argument must always have a default value")
        .clone();
    init_logging(matches.get_one::<String>("log-file"))?;

    let settings = GeneratorSettings {
        api_key: matches.get_one::<String>("llm-api-key").cloned(),
        base_url: matches
            .get_one::<String>("llm-base-url")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        model: matches
            .get_one::<String>("llm-model")
            .cloned()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        timeout: Duration::from_secs(*matches.get_one::<u64>("llm-timeout-secs").unwrap_or(&10)),
    };
    if settings.api_key.is_none() {
        warn!("No word generator API key configured, every game will use fallback words");
    }
    info!("Word generator: model {} at {}", settings.model, settings.base_url);

    let limits = RateLimits {
        init: *matches.get_one::<u32>("init-limit").unwrap_or(&5),
        guess: *matches.get_one::<u32>("guess-limit").unwrap_or(&10),
    };
    let max_games = matches.get_one::<u64>("max-games").map(|&n| n as usize);
    info!(
        "Rate limits per minute: init {}, guess {}; game capacity: {}",
        limits.init,
        limits.guess,
        max_games.map_or("unbounded".to_string(), |n| n.to_string())
    );

    let generator = LlmWordGenerator::new(settings).map_err(io::Error::other)?;
    let words: Arc<dyn WordSource> = Arc::new(CompositeWordSource::new(
        Box::new(generator),
        Box::new(FallbackWordSource::new()),
    ));

    let state = AppState {
        registry: GameRegistry::new(Box::new(words.clone()), max_games),
        ledger: WordLedger::new(Box::new(words)),
        limiter: RateLimiter::new(),
        settings: SettingsStore::new(GameConfig::default()),
        limits,
    };
    let shared_state = web::Data::new(state);
    let final_state = shared_state.clone();

    info!("Listening on {}", listen_host);
    HttpServer::new(move || {
        App::new()
            .app_data(shared_state.clone())
            .wrap(middleware::Logger::default())
            .service(handlers::game::init_game_query)
            .service(handlers::game::init_game_body)
            .service(handlers::game::submit_guess)
            .service(handlers::config::get_config)
            .service(handlers::config::update_config)
            .service(handlers::config::get_locales)
            .service(handlers::words::get_word)
    })
    .bind(&listen_host)?
    .run()
    .await?;

    if !final_state.registry.is_empty() || !final_state.limiter.is_empty() {
        info!(
            "Shut down with {} games and {} rate limit entries in memory",
            final_state.registry.len(),
            final_state.limiter.len()
        );
    }
    Ok(())
}

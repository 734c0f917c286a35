pub mod config;
pub mod game;
pub mod words;

use actix_web::{web, HttpRequest};

use crate::error::ServiceError;
use crate::models::ConfigQuery;

/// Raw `config` query parameter, if present
///
/// The query string is decoded here rather than through the `web::Query`
/// extractor so a malformed one is reported like any other bad request.
pub(crate) fn config_param(req: &HttpRequest) -> Result<Option<String>, ServiceError> {
    web::Query::<ConfigQuery>::from_query(req.query_string())
        .map(|query| query.into_inner().config)
        .map_err(|e| ServiceError::validation("Invalid query string", Some(e.to_string())))
}

#[cfg(test)]
pub(crate) use testing::{test_state, test_state_with};

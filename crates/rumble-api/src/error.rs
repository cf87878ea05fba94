//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use rumble_core::source::SourceError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The match could not be completed because not every combatant
  /// resolved. Which one failed is deliberately not exposed.
  #[error("unprocessable: {0}")]
  Unresolvable(String),

  /// The external stat source misbehaved.
  #[error("upstream error: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<rumble_core::Error> for ApiError {
  fn from(err: rumble_core::Error) -> Self {
    use rumble_core::Error as E;
    match err {
      E::EmptyRoster | E::DuplicateName(_) => {
        ApiError::BadRequest(err.to_string())
      }
      E::IncompleteFetch { .. } => ApiError::Unresolvable(err.to_string()),
      E::DetailNotFound { .. } => ApiError::NotFound(err.to_string()),
      E::Source(SourceError::NotFound(name)) => {
        ApiError::NotFound(format!("combatant {name:?} not found"))
      }
      E::Source(SourceError::Transport(msg)) => ApiError::Upstream(msg),
      E::MalformedStats { .. } => ApiError::Upstream(err.to_string()),
      E::Store(inner) => ApiError::Store(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"rumble\""),
        );
        return res;
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unresolvable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

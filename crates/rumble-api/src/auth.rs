//! HTTP Basic-auth extractor and standalone verifier.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rumble_core::{source::StatSource, store::MatchStore};

use crate::{AppState, error::ApiError};

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Zero-size marker: present in the handler means the request was
/// authenticated.
pub struct Authenticated;

/// Verify credentials directly from headers.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  if username != config.username {
    return Err(ApiError::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(())
}

impl<F, S> FromRequestParts<AppState<F, S>> for Authenticated
where
  F: StatSource + 'static,
  S: MatchStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<F, S>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth)?;
    Ok(Authenticated)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::http::{Request, header};
  use rumble_core::{
    MatchEngine,
    combatant::StatSheet,
    matches::{
      LeaderboardEntry, MatchDetail, MatchView, NewMatchDetail, TimeWindow,
    },
    source::{RosterPage, SourceError},
  };

  use super::*;

  // Minimal no-op collaborators for testing auth only.
  struct NoopSource;

  impl StatSource for NoopSource {
    async fn fetch(&self, _: &str) -> Result<StatSheet, SourceError> {
      unimplemented!()
    }
    async fn roster_page(
      &self,
      _: u32,
      _: u32,
    ) -> Result<RosterPage, SourceError> {
      unimplemented!()
    }
  }

  struct NoopStore;

  impl MatchStore for NoopStore {
    type Error = std::convert::Infallible;

    async fn create_match(
      &self,
      _: Vec<NewMatchDetail>,
    ) -> Result<MatchView, Self::Error> {
      unimplemented!()
    }
    async fn find_active_detail(
      &self,
      _: i64,
      _: &str,
    ) -> Result<Option<MatchDetail>, Self::Error> {
      unimplemented!()
    }
    async fn shift_scores_below(
      &self,
      _: i64,
      _: i64,
    ) -> Result<usize, Self::Error> {
      unimplemented!()
    }
    async fn save_detail(&self, _: &MatchDetail) -> Result<(), Self::Error> {
      unimplemented!()
    }
    async fn list_matches(
      &self,
      _: Option<TimeWindow>,
    ) -> Result<Vec<MatchView>, Self::Error> {
      unimplemented!()
    }
    async fn sum_scores(&self) -> Result<Vec<LeaderboardEntry>, Self::Error> {
      unimplemented!()
    }
  }

  fn make_state(password: &str) -> AppState<NoopSource, NoopStore> {
    use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState {
      engine: Arc::new(MatchEngine::new(
        Arc::new(NoopSource),
        Arc::new(NoopStore),
      )),
      auth:   Arc::new(AuthConfig {
        username:      "user".to_string(),
        password_hash: hash,
      }),
    }
  }

  async fn extract(
    req: Request<axum::body::Body>,
    state: &AppState<NoopSource, NoopStore>,
  ) -> Result<Authenticated, ApiError> {
    let (mut parts, _) = req.into_parts();
    Authenticated::from_request_parts(&mut parts, state).await
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[tokio::test]
  async fn correct_credentials() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("user", "secret"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(extract(req, &state).await.is_ok());
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("user", "wrong"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(
      extract(req, &state).await,
      Err(ApiError::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn wrong_username() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("intruder", "secret"))
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(
      extract(req, &state).await,
      Err(ApiError::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state("secret");
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    assert!(matches!(
      extract(req, &state).await,
      Err(ApiError::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic !!!not-base64!!!")
      .body(axum::body::Body::empty())
      .unwrap();
    assert!(matches!(
      extract(req, &state).await,
      Err(ApiError::Unauthorized)
    ));
  }
}

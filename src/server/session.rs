use super::state::ServerState;
use crate::user::{AuthTokenValue, JwtError, User};

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{debug, error};

/// Browser session backed by a row in the auth token table.
#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
    pub token: String,
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";

pub enum SessionExtractionError {
    LoginRequired,
    InternalError,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::LoginRequired => Redirect::to("/login").into_response(),
            SessionExtractionError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn extract_session_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(|c| c.value().to_string())
        .or_else(|| {
            parts
                .headers
                .get(AUTHORIZATION)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        })
}

fn extract_session(
    parts: &Parts,
    ctx: &ServerState,
) -> Result<Option<Session>, SessionExtractionError> {
    let Some(token) = extract_session_token(parts) else {
        debug!("No token in cookies nor headers.");
        return Ok(None);
    };

    match ctx.user_manager.get_auth_token(&AuthTokenValue(token)) {
        Ok(Some(auth_token)) => {
            debug!("Found auth token for user_id={}", auth_token.user_id);
            Ok(Some(Session {
                user_id: auth_token.user_id,
                token: auth_token.value.0,
            }))
        }
        Ok(None) => {
            debug!("Auth token not found in database");
            Ok(None)
        }
        Err(e) => {
            error!("Failed to get auth token from database: {}", e);
            Err(SessionExtractionError::InternalError)
        }
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session(parts, ctx)?.ok_or(SessionExtractionError::LoginRequired)
    }
}

impl OptionalFromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        extract_session(parts, ctx)
    }
}

/// Caller of the JSON API, identified by an `Authorization: Bearer <jwt>` header.
#[derive(Debug)]
pub struct ApiUser(pub User);

#[derive(Debug)]
pub enum ApiAuthError {
    Unauthorized(&'static str),
    InternalError,
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiAuthError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
            }
            ApiAuthError::InternalError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl From<JwtError> for ApiAuthError {
    fn from(value: JwtError) -> Self {
        match value {
            JwtError::Expired => ApiAuthError::Unauthorized("Token has expired"),
            JwtError::Invalid => ApiAuthError::Unauthorized("Invalid token"),
        }
    }
}

/// Takes the last space separated word, so both `Bearer <jwt>` and a bare token work.
fn extract_bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.split_whitespace().last().map(str::to_string)
}

impl FromRequestParts<ServerState> for ApiUser {
    type Rejection = ApiAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts).ok_or(JwtError::Invalid)?;
        let claims = ctx.jwt_issuer.verify(&token)?;
        match ctx.user_manager.get_user(claims.user_id) {
            Ok(Some(user)) => Ok(ApiUser(user)),
            Ok(None) => Err(ApiAuthError::Unauthorized("User not found")),
            Err(e) => {
                error!("Failed to load user {}: {}", claims.user_id, e);
                Err(ApiAuthError::InternalError)
            }
        }
    }
}

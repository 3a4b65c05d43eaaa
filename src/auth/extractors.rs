use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use super::session::{self, SessionKeys, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated identity for protected handlers. Handlers receive the user
/// id as an explicit argument; nothing downstream reads request state.
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(AppError::unauthorized)?;

        let keys = SessionKeys::from_ref(state);
        match session::get_session(&state.db, &keys, &token).await? {
            Some(user_id) => Ok(CurrentUser(user_id)),
            None => Err(AppError::unauthorized()),
        }
    }
}

/// Identity for endpoints that serve anonymous callers too (`GET /me`).
/// Never rejects; a broken store reads as "not signed in".
pub struct MaybeUser(pub Option<Uuid>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(MaybeUser(None));
        };

        let keys = SessionKeys::from_ref(state);
        match session::get_session(&state.db, &keys, cookie.value()).await {
            Ok(user_id) => Ok(MaybeUser(user_id)),
            Err(e) => {
                warn!(error = %e, "session lookup failed");
                Ok(MaybeUser(None))
            }
        }
    }
}

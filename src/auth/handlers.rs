use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MeResponse, PublicUser, SignupRequest},
        extractors::MaybeUser,
        password,
        repo::User,
        session::{self, SessionKeys, SESSION_COOKIE},
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.name.is_empty() || payload.email.is_empty() || payload.password.len() < 6 {
        return Err(AppError::BadRequest(
            "Name, email and password (min 6 chars) required".into(),
        ));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let hash = password::hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.name, &payload.email, &hash).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = session::create_session(&state.db, &keys, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((
        jar.add(session::session_cookie(&keys, token)),
        Json(AuthResponse { user: user.into() }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest("Email and password required".into()));
    }

    // Unknown email and wrong password answer identically.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }
    };

    let ok = password::verify_password(&payload.password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let keys = SessionKeys::from_ref(&state);
    let token = session::create_session(&state.db, &keys, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        jar.add(session::session_cookie(&keys, token)),
        Json(AuthResponse { user: user.into() }),
    ))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        session::delete_session(&state.db, cookie.value()).await?;
        info!("session revoked");
    }
    Ok((
        jar.remove(session::clear_session_cookie()),
        Json(json!({ "ok": true })),
    ))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
) -> Result<Json<MeResponse>, AppError> {
    let user = match user_id {
        Some(id) => User::find_by_id(&state.db, id).await?.map(PublicUser::from),
        None => None,
    };
    Ok(Json(MeResponse { user }))
}

use axum::extract::FromRef;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "wardrobe_session";

/// Claims embedded in a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// Signing half of the session service. The other half is the sessions
/// table: a token counts only while both agree.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl SessionKeys {
    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::days(cfg.ttl_days),
            cookie_secure: cfg.cookie_secure,
        }
    }

    pub fn sign(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.session)
    }
}

/// One active login.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

pub async fn create_session(
    db: &PgPool,
    keys: &SessionKeys,
    user_id: Uuid,
) -> anyhow::Result<String> {
    let token = keys.sign(user_id)?;
    let expires_at = OffsetDateTime::now_utc() + keys.ttl;
    sqlx::query(
        r#"
        INSERT INTO sessions (user_id, token, expires_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(&token)
    .bind(expires_at)
    .execute(db)
    .await?;
    Ok(token)
}

/// Resolves a presented token to its user, or `None` for every way a token
/// can be unacceptable: bad signature, no row (revoked), or expired. The row
/// is authoritative for revocation; a valid signature alone is not enough.
/// Expired rows are deleted on first sight.
pub async fn get_session(
    db: &PgPool,
    keys: &SessionKeys,
    token: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    if keys.verify(token).is_err() {
        debug!("session token failed verification");
        return Ok(None);
    }

    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, user_id, token, expires_at, created_at
        FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    let Some(session) = session else {
        return Ok(None);
    };

    if session.expires_at <= OffsetDateTime::now_utc() {
        sqlx::query(r#"DELETE FROM sessions WHERE id = $1"#)
            .bind(session.id)
            .execute(db)
            .await?;
        debug!(session_id = %session.id, "expired session removed");
        return Ok(None);
    }

    Ok(Some(session.user_id))
}

/// Removes zero or one row; deleting an unknown token is not an error.
pub async fn delete_session(db: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query(r#"DELETE FROM sessions WHERE token = $1"#)
        .bind(token)
        .execute(db)
        .await?;
    Ok(())
}

pub fn session_cookie(keys: &SessionKeys, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(keys.cookie_secure)
        .path("/")
        .max_age(keys.ttl)
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn make_keys() -> SessionKeys {
        SessionKeys::from_config(&SessionConfig {
            secret: "test-secret".into(),
            ttl_days: 7,
            cookie_secure: false,
        })
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys();
        let other = SessionKeys::from_config(&SessionConfig {
            secret: "another-secret".into(),
            ttl_days: 7,
            cookie_secure: false,
        });
        let token = keys.sign(Uuid::new_v4()).expect("sign");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let mut token = keys.sign(Uuid::new_v4()).expect("sign");
        token.replace_range(token.len() - 2.., "xx");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys();
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now - Duration::hours(3)).unix_timestamp() as usize,
            exp: (now - Duration::hours(2)).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn keys_from_state_carry_configured_ttl() {
        let state = AppState::fake();
        let keys = SessionKeys::from_ref(&state);
        assert_eq!(keys.ttl, Duration::days(7));
        assert!(!keys.cookie_secure);
    }

    #[test]
    fn session_cookie_attributes() {
        let keys = make_keys();
        let cookie = session_cookie(&keys, "tok".into());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
    }

    #[test]
    fn secure_cookie_in_production_config() {
        let keys = SessionKeys::from_config(&SessionConfig {
            secret: "s".into(),
            ttl_days: 7,
            cookie_secure: true,
        });
        let cookie = session_cookie(&keys, "tok".into());
        assert_eq!(cookie.secure(), Some(true));
    }
}

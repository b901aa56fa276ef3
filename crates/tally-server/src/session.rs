//! Cookie sessions
//!
//! A login sets two private (encrypted and authenticated) cookies: the user ID
//! and the session expiry as a unix timestamp. The browser drops them after
//! `expires`; the server also checks the expiry cookie so a replayed cookie
//! stops working once the session is over.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    cookie::{Cookie, Key, SameSite},
    PrivateCookieJar,
};
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use tally_core::models::User;

use crate::{AppError, AppState};

pub const COOKIE_USER_ID: &str = "user_id";
pub const COOKIE_EXPIRY: &str = "session_expiry";

/// Sessions last a day
pub const DEFAULT_SESSION_DURATION: Duration = Duration::hours(24);

/// Derive the cookie encryption key from a secret string
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);
    Key::from(&hash)
}

fn session_cookie(
    name: &'static str,
    value: String,
    expiry: OffsetDateTime,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .expires(expiry)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Add session cookies for `user_id` valid for `duration` from now
pub fn set_session(
    jar: PrivateCookieJar,
    user_id: i64,
    duration: Duration,
    secure: bool,
) -> PrivateCookieJar {
    let expiry = OffsetDateTime::now_utc() + duration;

    jar.add(session_cookie(
        COOKIE_USER_ID,
        user_id.to_string(),
        expiry,
        secure,
    ))
    .add(session_cookie(
        COOKIE_EXPIRY,
        expiry.unix_timestamp().to_string(),
        expiry,
        secure,
    ))
}

/// Overwrite the session cookies with expired ones so the browser deletes them
pub fn clear_session(jar: PrivateCookieJar, secure: bool) -> PrivateCookieJar {
    let expired = |name: &'static str| {
        Cookie::build((name, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .build()
    };

    jar.add(expired(COOKIE_USER_ID)).add(expired(COOKIE_EXPIRY))
}

/// User ID from an unexpired session, if any
pub fn session_user_id(jar: &PrivateCookieJar) -> Option<i64> {
    let user_id: i64 = jar.get(COOKIE_USER_ID)?.value_trimmed().parse().ok()?;
    let expiry: i64 = jar.get(COOKIE_EXPIRY)?.value_trimmed().parse().ok()?;

    if expiry <= OffsetDateTime::now_utc().unix_timestamp() {
        debug!(user_id, "Session expired");
        return None;
    }

    Some(user_id)
}

/// Load the user behind the session cookie
///
/// A session for a user that no longer exists counts as no session.
pub fn current_user(state: &AppState, jar: &PrivateCookieJar) -> Result<Option<User>, AppError> {
    match session_user_id(jar) {
        Some(id) => Ok(state.db.get_user(id)?),
        None => Ok(None),
    }
}

/// Middleware for routes that need a logged-in user.
///
/// Handlers receive the user with `Extension(user): Extension<User>`.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&state, &jar) {
        Ok(Some(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(None) => {
            warn!(path = %request.uri().path(), "Unauthorized request - no valid session");
            AppError::unauthorized("Authentication required").into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Middleware for register and login: a logged-in user is turned away.
pub async fn require_no_auth(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    match current_user(&state, &jar) {
        Ok(Some(_)) => AppError::bad_request("Already authenticated").into_response(),
        Ok(None) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar() -> PrivateCookieJar {
        PrivateCookieJar::new(create_cookie_key("test secret"))
    }

    #[test]
    fn test_session_round_trip() {
        let jar = set_session(jar(), 42, Duration::hours(1), true);
        assert_eq!(session_user_id(&jar), Some(42));

        let cookie = jar.get(COOKIE_USER_ID).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_expired_session_is_rejected() {
        let jar = set_session(jar(), 42, Duration::seconds(-5), false);
        assert_eq!(session_user_id(&jar), None);
    }

    #[test]
    fn test_cleared_session_has_no_user() {
        let jar = set_session(jar(), 7, Duration::hours(1), false);
        let jar = clear_session(jar, false);
        assert_eq!(session_user_id(&jar), None);
    }

    #[test]
    fn test_missing_cookies() {
        assert_eq!(session_user_id(&jar()), None);
    }
}

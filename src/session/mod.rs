//! Browser sessions: claim mapping and encrypted cookie storage.

pub mod claims;
pub mod cookie;

pub use claims::{ProviderProfile, Session, SessionClaims, SessionToken};

use axum_extra::extract::cookie::PrivateCookieJar;
use time::Duration;

use cookie::{SESSION_COOKIE, clear_cookie, get_json, put_json};

/// Session token as stored, expired or not.
pub fn read_session_token(jar: &PrivateCookieJar) -> Option<SessionToken> {
    get_json(jar, SESSION_COOKIE)
}

pub fn store_session(jar: PrivateCookieJar, token: &SessionToken, secure: bool) -> PrivateCookieJar {
    let max_age = Duration::days(claims::SESSION_MAX_AGE_DAYS);
    put_json(jar, SESSION_COOKIE, token, max_age, secure)
}

pub fn clear_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(clear_cookie(SESSION_COOKIE))
}

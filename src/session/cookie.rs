use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use serde::{Serialize, de::DeserializeOwned};
use time::Duration;
use tracing::warn;

pub const SESSION_COOKIE: &str = "autoduo.session-token";
pub const DIALOG_COOKIE: &str = "autoduo.dialog";
pub const TOAST_COOKIE: &str = "autoduo.toast";
pub const CSRF_COOKIE: &str = "autoduo.oauth-csrf";
pub const PKCE_COOKIE: &str = "autoduo.oauth-pkce";

pub fn build_cookie(name: &str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

pub fn clear_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Serialize `value` into an encrypted cookie.
pub fn put_json<T: Serialize>(
    jar: PrivateCookieJar,
    name: &str,
    value: &T,
    max_age: Duration,
    secure: bool,
) -> PrivateCookieJar {
    match serde_json::to_string(value) {
        Ok(json) => jar.add(build_cookie(name, json, max_age, secure)),
        Err(e) => {
            warn!(cookie = name, error = %e, "failed to serialize cookie payload");
            jar
        }
    }
}

/// Decrypt and parse a cookie. Undecryptable or malformed cookies read as absent.
pub fn get_json<T: DeserializeOwned>(jar: &PrivateCookieJar, name: &str) -> Option<T> {
    let cookie = jar.get(name)?;
    serde_json::from_str(cookie.value())
        .inspect_err(|e| warn!(cookie = name, error = %e, "discarding malformed cookie"))
        .ok()
}

/// Read a cookie once and schedule its removal.
pub fn take_json<T: DeserializeOwned>(
    jar: PrivateCookieJar,
    name: &str,
) -> (Option<T>, PrivateCookieJar) {
    if jar.get(name).is_none() {
        return (None, jar);
    }
    let value = get_json(&jar, name);
    (value, jar.remove(clear_cookie(name)))
}

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Key, PrivateCookieJar};
use chrono::Utc;
use std::convert::Infallible;
use tracing::debug;

use crate::router::AutoDuoState;
use crate::session::{Session, clear_session, read_session_token, store_session};

/// The caller's session, if the request carries a valid, unexpired one.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar = PrivateCookieJar::from_headers(&parts.headers, Key::from_ref(state));
        let now = Utc::now();
        let session = read_session_token(&jar)
            .filter(|token| !token.is_expired(now))
            .map(|token| Session::from(&token));
        Ok(Self(session))
    }
}

/// Slide the session expiry forward once it is old enough, and drop expired
/// session cookies. Sign-in and sign-out manage the cookie themselves.
pub async fn refresh_session(
    State(state): State<AutoDuoState>,
    jar: PrivateCookieJar,
    req: Request,
    next: Next,
) -> Response {
    let skip = req.uri().path().starts_with("/api/auth/");
    let resp = next.run(req).await;
    if skip {
        return resp;
    }

    let now = Utc::now();
    match read_session_token(&jar) {
        Some(token) if token.is_expired(now) => {
            debug!("clearing expired session cookie");
            (clear_session(jar), resp).into_response()
        }
        Some(token) if token.needs_refresh(now) => {
            debug!(id = ?token.claims.id, "refreshing session cookie");
            let jar = store_session(jar, &token.refreshed(now), state.secure_cookies());
            (jar, resp).into_response()
        }
        _ => resp,
    }
}

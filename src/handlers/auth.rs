use crate::discord_oauth::DiscordOauthEndpoints;
use crate::middleware::CurrentSession;
use crate::session::cookie::{CSRF_COOKIE, PKCE_COOKIE, build_cookie, clear_cookie};
use crate::session::{Session, SessionClaims, SessionToken, clear_session, store_session};
use crate::{AutoDuoError, router::AutoDuoState};
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use time::Duration;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// GET /api/auth/signin/discord -> redirects to Discord's consent page.
pub async fn discord_signin(
    State(state): State<AutoDuoState>,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, AutoDuoError> {
    let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
    let (auth_url, csrf_token) = DiscordOauthEndpoints::build_authorize_url(&state.cfg, challenge)?;

    let jar = store_oauth_cookies(jar, &csrf_token, verifier.secret(), state.secure_cookies());

    info!("Dispatching OAuth redirect");
    Ok((jar, Redirect::to(auth_url.as_str())))
}

/// GET /api/auth/callback/discord -> exchanges the code and starts a session.
pub async fn discord_callback(
    State(state): State<AutoDuoState>,
    Query(query): Query<AuthCallbackQuery>,
    jar: PrivateCookieJar,
) -> Response {
    let (pkce_verifier, csrf_cookie, jar) = match load_oauth_session(jar) {
        Ok(data) => data,
        Err((jar, err)) => return respond_with_error(jar, err),
    };

    let Some(state_param) = query.state.as_deref() else {
        return respond_with_error(
            jar,
            AutoDuoError::OauthFlowError("missing `state` in callback".to_string()),
        );
    };

    if !bool::from(state_param.as_bytes().ct_eq(csrf_cookie.as_bytes())) {
        return respond_with_error(
            jar,
            AutoDuoError::OauthFlowError("CSRF token mismatch".to_string()),
        );
    }

    let Some(code) = query.code.as_deref() else {
        return respond_with_error(
            jar,
            AutoDuoError::OauthFlowError("missing `code` in callback".to_string()),
        );
    };

    let token_response = match DiscordOauthEndpoints::exchange_authorization_code(
        &state.cfg,
        AuthorizationCode::new(code.to_owned()),
        PkceCodeVerifier::new(pkce_verifier),
        state.client.clone(),
    )
    .await
    {
        Ok(res) => res,
        Err(err) => return respond_with_error(jar, err),
    };

    let user_token = token_response.extra_fields().user_token.clone();
    let profile =
        DiscordOauthEndpoints::fetch_profile(&state.cfg, &token_response, state.client.clone())
            .await;
    let claims = SessionClaims::from_sign_in(user_token, profile);
    info!(id = ?claims.id, username = ?claims.username, "OAuth callback started session");

    let token = SessionToken::issue(claims, Utc::now());
    let jar = store_session(jar, &token, state.secure_cookies());
    (jar, Redirect::to("/")).into_response()
}

/// GET|POST /api/auth/signout -> ends the session.
pub async fn signout(jar: PrivateCookieJar) -> impl IntoResponse {
    info!("signing out");
    (clear_session(jar), Redirect::to("/"))
}

/// GET /api/auth/session -> the visible session object, or `null`.
pub async fn session(CurrentSession(session): CurrentSession) -> Json<Option<Session>> {
    Json(session)
}

fn store_oauth_cookies(
    jar: PrivateCookieJar,
    csrf: &CsrfToken,
    pkce_verifier: &str,
    secure: bool,
) -> PrivateCookieJar {
    let ttl = Duration::minutes(15);
    jar.add(build_cookie(CSRF_COOKIE, csrf.secret().to_string(), ttl, secure))
        .add(build_cookie(PKCE_COOKIE, pkce_verifier.to_string(), ttl, secure))
}

fn load_oauth_session(
    jar: PrivateCookieJar,
) -> Result<(String, String, PrivateCookieJar), (PrivateCookieJar, AutoDuoError)> {
    let Some(csrf_cookie) = jar.get(CSRF_COOKIE).map(|c| c.value().to_owned()) else {
        let jar = clear_oauth_cookies(jar);
        return Err((
            jar,
            AutoDuoError::OauthFlowError("Missing CSRF token in cookie".to_string()),
        ));
    };

    let Some(pkce_cookie) = jar.get(PKCE_COOKIE).map(|c| c.value().to_owned()) else {
        let jar = clear_oauth_cookies(jar);
        return Err((
            jar,
            AutoDuoError::OauthFlowError("Missing PKCE verifier in cookie".to_string()),
        ));
    };

    let jar = clear_oauth_cookies(jar);

    Ok((pkce_cookie, csrf_cookie, jar))
}

fn clear_oauth_cookies(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(clear_cookie(CSRF_COOKIE))
        .remove(clear_cookie(PKCE_COOKIE))
}

fn respond_with_error(jar: PrivateCookieJar, err: AutoDuoError) -> Response {
    (jar, err.into_response()).into_response()
}

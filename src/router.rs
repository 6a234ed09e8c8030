use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use std::time::Duration;

use crate::api::BackendClient;
use crate::config::Config;
use crate::error::AutoDuoError;
use crate::handlers::{accounts, auth, dialog, page};
use crate::middleware::refresh_session;

/// Largest enrollment image accepted by `/dialog/upload`.
pub const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AutoDuoState {
    pub cfg: Arc<Config>,
    pub client: reqwest::Client,
    pub backend: BackendClient,
    key: Key,
}

impl AutoDuoState {
    pub fn new(cfg: Config) -> Result<Self, AutoDuoError> {
        let key = cfg.cookie_key()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("autoduo-web/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        let backend = BackendClient::new(
            client.clone(),
            cfg.backend_url.clone(),
            cfg.backend_secret.as_str(),
        );
        Ok(Self {
            cfg: Arc::new(cfg),
            client,
            backend,
            key,
        })
    }

    /// Whether cookies carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        !self.cfg.insecure_cookie
    }
}

impl FromRef<AutoDuoState> for Key {
    fn from_ref(state: &AutoDuoState) -> Self {
        state.key.clone()
    }
}

pub fn autoduo_router(state: AutoDuoState) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/actions/remove", post(page::remove_action))
        .route("/api/auth/signin/discord", get(auth::discord_signin))
        .route("/api/auth/callback/discord", get(auth::discord_callback))
        .route("/api/auth/signout", get(auth::signout).post(auth::signout))
        .route("/api/auth/session", get(auth::session))
        .route(
            "/api/remove_account",
            get(accounts::remove_account).post(accounts::remove_account),
        )
        .route("/api/add_account", post(accounts::add_account))
        .route("/dialog/open", post(dialog::open))
        .route("/dialog/acknowledge", post(dialog::acknowledge))
        .route(
            "/dialog/upload",
            post(dialog::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/dialog/close", post(dialog::close))
        .layer(middleware::from_fn_with_state(state.clone(), refresh_session))
        .with_state(state)
}

use axum_extra::extract::cookie::Key;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

use crate::error::AutoDuoError;

/// Process-wide configuration for the binary. Tests build `Config` directly.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().unwrap_or_else(|e| panic!("FATAL: invalid configuration: {e}"))
});

/// Environment keys read by [`Config::from_env`].
const ENV_KEYS: &[&str] = &[
    "BACKEND_URL",
    "BACKEND_SECRET",
    "DISCORD_ID",
    "DISCORD_SECRET",
    "DISCORD_API_URL",
    "PUBLIC_URL",
    "SESSION_SECRET",
    "LISTEN_ADDR",
    "LOGLEVEL",
    "INSECURE_COOKIE",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the accounts backend.
    pub backend_url: Url,
    /// Pre-shared key sent to the backend as `x-api-key`.
    pub backend_secret: String,
    pub discord_id: String,
    pub discord_secret: String,
    /// Discord API root; the OAuth and profile endpoints hang off it.
    pub discord_api_url: Url,
    /// External base URL of this service, used to build the OAuth redirect URI.
    pub public_url: Url,
    /// Key material for the private cookie jar, at least 64 bytes.
    /// Empty means a random key per process.
    pub session_secret: String,
    pub listen_addr: String,
    pub loglevel: String,
    pub insecure_cookie: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: Url::parse("http://127.0.0.1:8080").expect("static url"),
            backend_secret: String::new(),
            discord_id: String::new(),
            discord_secret: String::new(),
            discord_api_url: Url::parse("https://discord.com/api").expect("static url"),
            public_url: Url::parse("http://localhost:3000").expect("static url"),
            session_secret: String::new(),
            listen_addr: "0.0.0.0:3000".to_string(),
            loglevel: "info".to_string(),
            insecure_cookie: false,
        }
    }
}

impl Config {
    /// Defaults overlaid with the process environment (and `.env`, if loaded).
    pub fn from_env() -> Result<Self, AutoDuoError> {
        let cfg = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(ENV_KEYS))
            .extract::<Config>()
            .map_err(Box::new)?;
        Ok(cfg)
    }

    /// Key for the private cookie jar.
    pub fn cookie_key(&self) -> Result<Key, AutoDuoError> {
        if self.session_secret.is_empty() {
            return Ok(Key::generate());
        }
        Key::try_from(self.session_secret.as_bytes())
            .map_err(|e| AutoDuoError::InvalidConfig(format!("SESSION_SECRET: {e}")))
    }

    /// `{discord_api_url}/oauth2/authorize`
    pub fn discord_auth_url(&self) -> Result<Url, AutoDuoError> {
        join_segments(&self.discord_api_url, &["oauth2", "authorize"])
    }

    /// `{discord_api_url}/oauth2/token`
    pub fn discord_token_url(&self) -> Result<Url, AutoDuoError> {
        join_segments(&self.discord_api_url, &["oauth2", "token"])
    }

    /// `{discord_api_url}/users/@me`
    pub fn discord_userinfo_url(&self) -> Result<Url, AutoDuoError> {
        join_segments(&self.discord_api_url, &["users", "@me"])
    }

    /// Redirect URI registered with Discord for this deployment.
    pub fn redirect_url(&self) -> Result<Url, AutoDuoError> {
        join_segments(&self.public_url, &["api", "auth", "callback", "discord"])
    }
}

/// Append path segments to `base`, keeping any path it already carries.
pub fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, AutoDuoError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AutoDuoError::InvalidConfig(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

use crate::config::Config;
use crate::error::AutoDuoError;
use crate::session::ProviderProfile;

use oauth2::{
    AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, ExtraTokenFields, PkceCodeChallenge, PkceCodeVerifier,
    RedirectUrl, Scope, StandardRevocableToken, StandardTokenResponse, TokenResponse, TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenType,
    },
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

/// Scopes requested from Discord; `identify` grants `/users/@me`.
const SCOPES: &[&str] = &["identify"];

/// Stateless Discord OAuth endpoints.
pub struct DiscordOauthEndpoints;

impl DiscordOauthEndpoints {
    /// Authorization URL and the CSRF state it embeds.
    pub fn build_authorize_url(
        cfg: &Config,
        challenge: PkceCodeChallenge,
    ) -> Result<(Url, CsrfToken), AutoDuoError> {
        let client = build_oauth2_client(cfg)?;
        let (url, csrf) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .set_pkce_challenge(challenge)
            .url();
        Ok((url, csrf))
    }

    pub async fn exchange_authorization_code(
        cfg: &Config,
        code: AuthorizationCode,
        verifier: PkceCodeVerifier,
        http_client: reqwest::Client,
    ) -> Result<DiscordTokenResponse, AutoDuoError> {
        let client = build_oauth2_client(cfg)?;
        let token = client
            .exchange_code(code)
            .set_pkce_verifier(verifier)
            .request_async(&http_client)
            .await?;
        info!("Discord authorization code exchanged");
        Ok(token)
    }

    /// Profile of the signed-in user. Failures leave the profile absent.
    pub async fn fetch_profile(
        cfg: &Config,
        token: &DiscordTokenResponse,
        http_client: reqwest::Client,
    ) -> Option<ProviderProfile> {
        try_fetch_profile(cfg, token, http_client)
            .await
            .inspect_err(|e| warn!(error = %e, "fetching Discord profile failed"))
            .ok()
    }
}

async fn try_fetch_profile(
    cfg: &Config,
    token: &DiscordTokenResponse,
    http_client: reqwest::Client,
) -> Result<ProviderProfile, AutoDuoError> {
    let profile = http_client
        .get(cfg.discord_userinfo_url()?)
        .bearer_auth(token.access_token().secret())
        .header("Accept", "application/json")
        .send()
        .await?
        .error_for_status()?
        .json::<ProviderProfile>()
        .await?;
    Ok(profile)
}

/// Build the Discord OAuth2 client from configuration.
fn build_oauth2_client(cfg: &Config) -> Result<DiscordOauth2Client, AutoDuoError> {
    let client = OAuth2Client::new(ClientId::new(cfg.discord_id.clone()))
        .set_client_secret(ClientSecret::new(cfg.discord_secret.clone()))
        .set_auth_uri(AuthUrl::from_url(cfg.discord_auth_url()?))
        .set_token_uri(TokenUrl::from_url(cfg.discord_token_url()?))
        .set_redirect_uri(RedirectUrl::from_url(cfg.redirect_url()?));
    Ok(client)
}

/// Backend credential the token endpoint may hand out next to the access token.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscordTokenField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
}
impl ExtraTokenFields for DiscordTokenField {}

pub type DiscordTokenResponse = StandardTokenResponse<DiscordTokenField, BasicTokenType>;

pub type DiscordOauth2Client = OAuth2Client<
    BasicErrorResponse,
    DiscordTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

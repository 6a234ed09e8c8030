use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Session lifetime from the last (re)issue, in days.
pub const SESSION_MAX_AGE_DAYS: i64 = 30;
/// A session read after this many hours is re-issued with a fresh expiry.
pub const SESSION_UPDATE_AGE_HOURS: i64 = 24;

pub fn session_max_age() -> TimeDelta {
    TimeDelta::days(SESSION_MAX_AGE_DAYS)
}

/// Identity data returned by the provider's profile endpoint (`/users/@me`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProviderProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// The three claims carried from sign-in into every session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_token: Option<String>,
    pub id: Option<String>,
    pub username: Option<String>,
}

impl SessionClaims {
    /// Claims captured right after a code exchange. Whatever the provider
    /// did not send stays unset.
    pub fn from_sign_in(user_token: Option<String>, profile: Option<ProviderProfile>) -> Self {
        let profile = profile.unwrap_or_default();
        Self {
            user_token,
            id: profile.id,
            username: profile.username,
        }
    }
}

/// Durable record behind a browser session, stored in a private cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionToken {
    #[serde(flatten)]
    pub claims: SessionClaims,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn issue(claims: SessionClaims, now: DateTime<Utc>) -> Self {
        Self {
            claims,
            issued_at: now,
            expires_at: now + session_max_age(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now)
            && now - self.issued_at >= TimeDelta::hours(SESSION_UPDATE_AGE_HOURS)
    }

    /// Same claims, new lifetime.
    pub fn refreshed(&self, now: DateTime<Utc>) -> Self {
        Self::issue(self.claims.clone(), now)
    }
}

/// Session as exposed to handlers and to `GET /api/auth/session`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Session {
    #[serde(rename = "userToken")]
    pub user_token: Option<String>,
    pub id: Option<String>,
    pub username: Option<String>,
}

impl From<&SessionToken> for Session {
    fn from(token: &SessionToken) -> Self {
        Self {
            user_token: token.claims.user_token.clone(),
            id: token.claims.id.clone(),
            username: token.claims.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, username: &str) -> ProviderProfile {
        ProviderProfile {
            id: Some(id.to_string()),
            username: Some(username.to_string()),
        }
    }

    #[test]
    fn sign_in_copies_profile_and_backend_token() {
        let claims =
            SessionClaims::from_sign_in(Some("opaque".into()), Some(profile("42", "alice")));
        assert_eq!(claims.user_token.as_deref(), Some("opaque"));
        assert_eq!(claims.id.as_deref(), Some("42"));
        assert_eq!(claims.username.as_deref(), Some("alice"));
    }

    #[test]
    fn missing_profile_leaves_claims_unset() {
        let claims = SessionClaims::from_sign_in(None, None);
        assert_eq!(claims, SessionClaims::default());
    }

    #[test]
    fn session_mirrors_token_claims() {
        let now = Utc::now();
        let token = SessionToken::issue(
            SessionClaims::from_sign_in(None, Some(profile("7", "bob"))),
            now,
        );
        let session = Session::from(&token);
        assert_eq!(session.id.as_deref(), Some("7"));
        assert_eq!(session.username.as_deref(), Some("bob"));
        assert_eq!(session.user_token, None);

        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("userToken").is_some());
    }

    #[test]
    fn token_lifetime_and_sliding_refresh() {
        let now = Utc::now();
        let token = SessionToken::issue(SessionClaims::default(), now);
        assert!(!token.is_expired(now));
        assert!(!token.needs_refresh(now + TimeDelta::hours(1)));
        assert!(token.needs_refresh(now + TimeDelta::days(2)));
        assert!(token.is_expired(now + session_max_age()));

        let later = now + TimeDelta::days(2);
        let refreshed = token.refreshed(later);
        assert_eq!(refreshed.expires_at, later + session_max_age());
        assert_eq!(refreshed.claims, token.claims);
    }

    #[test]
    fn token_round_trips_through_cookie_json() {
        let token = SessionToken::issue(
            SessionClaims::from_sign_in(Some("t".into()), Some(profile("1", "u"))),
            Utc::now(),
        );
        let json = serde_json::to_string(&token).unwrap();
        let back: SessionToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}

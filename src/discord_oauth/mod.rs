pub mod endpoints;

pub use endpoints::{DiscordOauthEndpoints, DiscordTokenResponse};

use axum::{Json, http::StatusCode, response::IntoResponse};
use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum AutoDuoError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad Request")]
    BadRequest,

    #[error("Forbidden")]
    Forbidden,

    /// Backend answered with a non-2xx status; carries the extracted message.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("No QR code found in image")]
    QrNotFound,

    #[error("QR decode error: {0}")]
    QrDecode(String),

    #[error("No image found in clipboard.")]
    ClipboardEmpty,

    #[error("Invalid dialog transition from `{from}` on `{event}`")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("OAuth2 token request error: {0}")]
    Oauth2Token(String),

    #[error("OAuth2 server error: {error}")]
    Oauth2Server { error: String },

    #[error("OAuth flow error: {0}")]
    OauthFlowError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl
    From<
        RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    > for AutoDuoError
{
    fn from(
        e: RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    ) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => AutoDuoError::Oauth2Server {
                error: err.error().to_string(),
            },
            RequestTokenError::Request(req_e) => {
                AutoDuoError::Oauth2Token(format!("request failed: {}", req_e))
            }
            RequestTokenError::Parse(parse_err, _body) => {
                AutoDuoError::Json(parse_err.into_inner())
            }
            RequestTokenError::Other(s) => AutoDuoError::Oauth2Token(s),
        }
    }
}

impl AutoDuoError {
    pub fn status(&self) -> StatusCode {
        match self {
            AutoDuoError::Unauthorized
            | AutoDuoError::Oauth2Token(_)
            | AutoDuoError::Oauth2Server { .. }
            | AutoDuoError::OauthFlowError(_) => StatusCode::UNAUTHORIZED,
            AutoDuoError::Forbidden => StatusCode::FORBIDDEN,
            AutoDuoError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AutoDuoError::InvalidConfig(_) | AutoDuoError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // Upstream failures, transport errors and bad input all surface as 400.
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AutoDuoError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            AutoDuoError::InvalidConfig(_) | AutoDuoError::Config(_) => {
                tracing::error!(error = %self, "configuration error surfaced to a request");
                "An internal server error occurred.".to_string()
            }
            AutoDuoError::Oauth2Token(_)
            | AutoDuoError::Oauth2Server { .. }
            | AutoDuoError::OauthFlowError(_) => {
                tracing::warn!(error = %self, "sign-in failed");
                "Authentication error.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageBody { message })).into_response()
    }
}

/// `{ "message": ... }`, the body shape of every JSON answer and of backend errors.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

use tracing::warn;

use crate::api::BackendClient;
use crate::error::AutoDuoError;
use crate::session::Session;

/// `uid` / `code` as they arrived on the query string.
/// A parameter that is missing, empty or repeated is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentQuery {
    pub uid: Option<String>,
    pub code: Option<String>,
}

impl EnrollmentQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut uids = Vec::new();
        let mut codes = Vec::new();
        for (k, v) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match k.as_ref() {
                "uid" => uids.push(v.into_owned()),
                "code" => codes.push(v.into_owned()),
                _ => {}
            }
        }
        Self {
            uid: single(uids),
            code: single(codes),
        }
    }
}

fn single(mut values: Vec<String>) -> Option<String> {
    match values.len() {
        1 => values.pop().filter(|v| !v.is_empty()),
        _ => None,
    }
}

/// An enrollment request that passed the session checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub uid: String,
    pub code: String,
}

/// Session and parameter checks shared by add and remove, in response order:
/// 401 without a session, 400 on bad parameters or a session without an id,
/// 403 when `uid` is not the caller.
pub fn authorize(
    session: Option<&Session>,
    query: EnrollmentQuery,
) -> Result<Enrollment, AutoDuoError> {
    let session = session.ok_or(AutoDuoError::Unauthorized)?;
    let (Some(uid), Some(code)) = (query.uid, query.code) else {
        return Err(AutoDuoError::BadRequest);
    };
    let Some(id) = session.id.as_deref() else {
        return Err(AutoDuoError::BadRequest);
    };
    if id != uid {
        warn!(session_id = id, uid, "enrollment request for another user");
        return Err(AutoDuoError::Forbidden);
    }
    Ok(Enrollment { uid, code })
}

pub async fn add_account(
    backend: &BackendClient,
    session: Option<&Session>,
    query: EnrollmentQuery,
) -> Result<(), AutoDuoError> {
    let enrollment = authorize(session, query)?;
    backend.add_account(&enrollment.uid, &enrollment.code).await
}

pub async fn remove_account(
    backend: &BackendClient,
    session: Option<&Session>,
    query: EnrollmentQuery,
) -> Result<(), AutoDuoError> {
    let enrollment = authorize(session, query)?;
    backend
        .remove_account(&enrollment.uid, &enrollment.code)
        .await
}

use axum::{
    Json,
    extract::{RawQuery, State},
};

use crate::error::MessageBody;
use crate::middleware::CurrentSession;
use crate::service::accounts::{self, EnrollmentQuery};
use crate::{AutoDuoError, router::AutoDuoState};

/// GET|POST /api/remove_account?uid=..&code=..
pub async fn remove_account(
    State(state): State<AutoDuoState>,
    CurrentSession(session): CurrentSession,
    RawQuery(raw): RawQuery,
) -> Result<Json<MessageBody>, AutoDuoError> {
    let query = EnrollmentQuery::parse(raw.as_deref());
    accounts::remove_account(&state.backend, session.as_ref(), query).await?;
    Ok(Json(MessageBody::new("Success")))
}

/// POST /api/add_account?uid=..&code=..
pub async fn add_account(
    State(state): State<AutoDuoState>,
    CurrentSession(session): CurrentSession,
    RawQuery(raw): RawQuery,
) -> Result<Json<MessageBody>, AutoDuoError> {
    let query = EnrollmentQuery::parse(raw.as_deref());
    accounts::add_account(&state.backend, session.as_ref(), query).await?;
    Ok(Json(MessageBody::new("Success")))
}

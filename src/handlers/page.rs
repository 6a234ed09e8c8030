use axum::{
    Form,
    extract::State,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::warn;

use super::{flash_toast, read_dialog};
use crate::middleware::CurrentSession;
use crate::router::AutoDuoState;
use crate::service::accounts::{self, EnrollmentQuery};
use crate::session::cookie::{TOAST_COOKIE, take_json};
use crate::types::Toast;
use crate::views::{self, ManagementView};

/// GET / -> sign-in view, or the account list for a signed-in user.
pub async fn index(
    State(state): State<AutoDuoState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Html<String>) {
    let (toast, jar) = take_json::<Toast>(jar, TOAST_COOKIE);

    let Some(session) = session else {
        return (jar, Html(views::sign_in(toast.as_ref()).into_string()));
    };

    let accounts = match session.id.as_deref() {
        Some(id) => state.backend.get_active_accounts(id).await,
        None => Vec::new(),
    };
    let dialog = read_dialog(&jar);
    let view = ManagementView {
        username: session.username.as_deref().unwrap_or_default(),
        accounts: &accounts,
        dialog: dialog.as_ref(),
        toast: toast.as_ref(),
    };
    (jar, Html(views::management(&view).into_string()))
}

#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub code: Option<String>,
}

/// POST /actions/remove -> remove one of the caller's accounts, then reload.
pub async fn remove_action(
    State(state): State<AutoDuoState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Form(form): Form<RemoveForm>,
) -> (PrivateCookieJar, Redirect) {
    let query = EnrollmentQuery {
        uid: session.as_ref().and_then(|s| s.id.clone()),
        code: form.code.filter(|c| !c.is_empty()),
    };
    let toast = match accounts::remove_account(&state.backend, session.as_ref(), query).await {
        Ok(()) => Toast::success("Account removed successfully."),
        Err(e) => {
            warn!(error = %e, "removing account failed");
            Toast::error(format!("Error removing account:\n{e}"))
        }
    };
    let jar = flash_toast(jar, &toast, state.secure_cookies());
    (jar, Redirect::to("/"))
}

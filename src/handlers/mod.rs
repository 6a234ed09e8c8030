pub mod accounts;
pub mod auth;
pub mod dialog;
pub mod page;

use axum_extra::extract::cookie::PrivateCookieJar;
use time::Duration;

use crate::enrollment::DialogStep;
use crate::session::cookie::{DIALOG_COOKIE, TOAST_COOKIE, clear_cookie, get_json, put_json};
use crate::types::Toast;

/// Queue a toast for the next rendered page.
pub(crate) fn flash_toast(jar: PrivateCookieJar, toast: &Toast, secure: bool) -> PrivateCookieJar {
    put_json(jar, TOAST_COOKIE, toast, Duration::minutes(5), secure)
}

pub(crate) fn read_dialog(jar: &PrivateCookieJar) -> Option<DialogStep> {
    get_json(jar, DIALOG_COOKIE)
}

pub(crate) fn store_dialog(
    jar: PrivateCookieJar,
    step: &DialogStep,
    secure: bool,
) -> PrivateCookieJar {
    put_json(jar, DIALOG_COOKIE, step, Duration::hours(1), secure)
}

pub(crate) fn clear_dialog(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(clear_cookie(DIALOG_COOKIE))
}

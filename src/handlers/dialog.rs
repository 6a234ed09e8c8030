use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::{info, warn};

use super::{clear_dialog, flash_toast, read_dialog, store_dialog};
use crate::enrollment::{self, ClipboardItem, DialogStep, ImageSource};
use crate::middleware::CurrentSession;
use crate::types::Toast;
use crate::{AutoDuoError, router::AutoDuoState};

/// POST /dialog/open -> (re)start the dialog at the disclaimer.
pub async fn open(
    State(state): State<AutoDuoState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    let jar = store_dialog(jar, &DialogStep::open(), state.secure_cookies());
    (jar, Redirect::to("/"))
}

/// POST /dialog/acknowledge -> disclaimer accepted.
pub async fn acknowledge(
    State(state): State<AutoDuoState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    let Some(step) = read_dialog(&jar) else {
        return (jar, Redirect::to("/"));
    };
    match step.acknowledge() {
        Ok(next) => {
            let jar = store_dialog(jar, &next, state.secure_cookies());
            (jar, Redirect::to("/"))
        }
        Err(e) => {
            warn!(error = %e, "ignoring dialog event");
            (jar, Redirect::to("/"))
        }
    }
}

/// POST /dialog/upload -> decode the submitted QR image and enroll it.
pub async fn upload(
    State(state): State<AutoDuoState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    multipart: Multipart,
) -> Response {
    let Some(step) = read_dialog(&jar) else {
        return (jar, Redirect::to("/")).into_response();
    };
    let source = match read_image_source(multipart).await {
        Ok(source) => source,
        Err(e) => return (jar, e).into_response(),
    };

    match enrollment::upload(&step, source, session.as_ref(), &state.backend).await {
        Ok(next) => {
            let secure = state.secure_cookies();
            let mut jar = store_dialog(jar, &next, secure);
            if next == DialogStep::Success {
                jar = flash_toast(jar, &Toast::success("New account added successfully."), secure);
            }
            (jar, Redirect::to("/")).into_response()
        }
        Err(e) => {
            warn!(error = %e, "ignoring dialog event");
            (jar, Redirect::to("/")).into_response()
        }
    }
}

/// POST /dialog/close -> drop the dialog; the redirect reloads the account list.
pub async fn close(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    info!("enrollment dialog closed");
    (clear_dialog(jar), Redirect::to("/"))
}

/// Collect the image from an upload form. `source=clipboard` selects the
/// clipboard parts; anything else reads the `file` part.
async fn read_image_source(mut multipart: Multipart) -> Result<ImageSource, AutoDuoError> {
    let mut source_kind = None;
    let mut file = None;
    let mut clipboard = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let mime = field.content_type().unwrap_or_default().to_string();
        match name.as_str() {
            "source" => source_kind = Some(field.text().await.map_err(multipart_error)?),
            "file" => file = Some(field.bytes().await.map_err(multipart_error)?.to_vec()),
            "clipboard" => clipboard.push(ClipboardItem {
                mime,
                data: field.bytes().await.map_err(multipart_error)?.to_vec(),
            }),
            _ => {}
        }
    }

    Ok(match source_kind.as_deref() {
        Some("clipboard") => ImageSource::Clipboard(clipboard),
        _ => ImageSource::File(file.unwrap_or_default()),
    })
}

fn multipart_error(e: MultipartError) -> AutoDuoError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AutoDuoError::PayloadTooLarge
    } else {
        AutoDuoError::Multipart(e.body_text())
    }
}

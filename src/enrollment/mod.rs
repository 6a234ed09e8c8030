//! Enrollment dialog: step machine, image intake and QR decoding.

pub mod dialog;
pub mod qr;

pub use dialog::{DialogStep, UploadFailure};

use tracing::{debug, info};

use crate::api::BackendClient;
use crate::service::accounts::{self, EnrollmentQuery};
use crate::session::Session;

/// One clipboard item as submitted by the browser.
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub mime: String,
    pub data: Vec<u8>,
}

/// Where the enrollment image came from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Dropped or picked file.
    File(Vec<u8>),
    /// Pasted clipboard contents; only `image/png` items are considered.
    Clipboard(Vec<ClipboardItem>),
}

impl ImageSource {
    pub fn into_image(self) -> Result<Vec<u8>, UploadFailure> {
        match self {
            ImageSource::File(data) if data.is_empty() => {
                Err(UploadFailure::Decode("No file provided".to_string()))
            }
            ImageSource::File(data) => Ok(data),
            ImageSource::Clipboard(items) => items
                .into_iter()
                .find(|item| item.mime == "image/png" && !item.data.is_empty())
                .map(|item| item.data)
                .ok_or(UploadFailure::NoClipboardImage),
        }
    }
}

/// Run one upload attempt from the scan step: decode the QR payload and
/// submit it as a new account for the session's user.
pub async fn upload(
    step: &DialogStep,
    source: ImageSource,
    session: Option<&Session>,
    backend: &BackendClient,
) -> Result<DialogStep, crate::error::AutoDuoError> {
    let uploading = step.begin_upload()?;
    let outcome = attempt(source, session, backend).await;
    let next = uploading.finish_upload(outcome)?;
    info!(step = next.name(), "enrollment upload finished");
    Ok(next)
}

async fn attempt(
    source: ImageSource,
    session: Option<&Session>,
    backend: &BackendClient,
) -> Result<(), UploadFailure> {
    let image = source.into_image()?;
    let payload = qr::decode_qr(&image).map_err(|e| UploadFailure::Decode(e.to_string()))?;
    debug!(payload_len = payload.len(), "decoded enrollment QR code");

    let query = EnrollmentQuery {
        uid: session.and_then(|s| s.id.clone()),
        code: Some(payload),
    };
    accounts::add_account(backend, session, query)
        .await
        .map_err(|e| UploadFailure::AddAccount(e.to_string()))
}

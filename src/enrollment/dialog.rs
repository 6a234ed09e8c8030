use serde::{Deserialize, Serialize};

use crate::error::AutoDuoError;
use crate::types::clip_message;

/// Steps of the enrollment dialog. `Upload` is only held while an image is
/// being processed; the request ends in `Success` or `Error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "error", rename_all = "lowercase")]
pub enum DialogStep {
    #[default]
    Warning,
    Scan,
    Upload,
    Error(String),
    Success,
}

/// Why an upload attempt ended in the error step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFailure {
    /// The image could not be read or held no QR code.
    Decode(String),
    /// The add-account call failed.
    AddAccount(String),
    /// Clipboard contents carried no `image/png` item.
    NoClipboardImage,
}

impl UploadFailure {
    /// Text shown in the error step, clipped to fit the dialog cookie.
    pub fn message(&self) -> String {
        clip_message(match self {
            UploadFailure::Decode(e) => format!("Error parsing QR code image:\n{e}"),
            UploadFailure::AddAccount(e) => format!("Error adding new account:\n{e}"),
            UploadFailure::NoClipboardImage => AutoDuoError::ClipboardEmpty.to_string(),
        })
    }
}

impl DialogStep {
    pub fn name(&self) -> &'static str {
        match self {
            DialogStep::Warning => "warning",
            DialogStep::Scan => "scan",
            DialogStep::Upload => "upload",
            DialogStep::Error(_) => "error",
            DialogStep::Success => "success",
        }
    }

    /// Opening the dialog always starts over, whatever came before.
    pub fn open() -> Self {
        DialogStep::Warning
    }

    /// The user accepted the risk disclosure.
    pub fn acknowledge(&self) -> Result<Self, AutoDuoError> {
        match self {
            DialogStep::Warning => Ok(DialogStep::Scan),
            other => Err(other.reject("acknowledge")),
        }
    }

    /// An image was supplied.
    pub fn begin_upload(&self) -> Result<Self, AutoDuoError> {
        match self {
            DialogStep::Scan => Ok(DialogStep::Upload),
            other => Err(other.reject("begin_upload")),
        }
    }

    pub fn finish_upload(&self, outcome: Result<(), UploadFailure>) -> Result<Self, AutoDuoError> {
        match self {
            DialogStep::Upload => Ok(match outcome {
                Ok(()) => DialogStep::Success,
                Err(failure) => DialogStep::Error(failure.message()),
            }),
            other => Err(other.reject("finish_upload")),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, DialogStep::Error(_) | DialogStep::Success)
    }

    fn reject(&self, event: &'static str) -> AutoDuoError {
        AutoDuoError::InvalidTransition {
            from: self.name(),
            event,
        }
    }
}

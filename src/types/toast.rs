use serde::{Deserialize, Serialize};

/// Longest message, in bytes, kept in a cookie. Private cookies grow by about
/// a third once encrypted, and browsers drop anything past 4096 bytes.
pub const MAX_STORED_MESSAGE: usize = 1024;

/// Shorten `message` to fit a cookie, cutting on a char boundary and marking
/// the cut with an ellipsis. Control characters other than newlines become
/// spaces so JSON escaping cannot blow the size back up.
pub fn clip_message(message: impl Into<String>) -> String {
    let mut message: String = message
        .into()
        .chars()
        .map(|c| if c.is_control() && c != '\n' { ' ' } else { c })
        .collect();
    if message.len() > MAX_STORED_MESSAGE {
        let mut end = MAX_STORED_MESSAGE - '…'.len_utf8();
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
        message.push('…');
    }
    message
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
}

/// One-shot notification shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: clip_message(message),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: clip_message(message),
        }
    }
}

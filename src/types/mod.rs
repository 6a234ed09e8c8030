pub mod account;
pub mod toast;

pub use account::Account;
pub use toast::{MAX_STORED_MESSAGE, Toast, ToastLevel, clip_message};

pub mod session;

pub use session::{CurrentSession, refresh_session};

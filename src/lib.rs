pub mod api;
pub mod config;
pub mod discord_oauth;
pub mod enrollment;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod session;
pub mod types;
pub mod views;

pub use error::AutoDuoError;
pub use router::{AutoDuoState, autoduo_router};

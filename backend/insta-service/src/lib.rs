pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod repository;
pub mod services;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;

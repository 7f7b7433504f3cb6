pub mod app_state;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod modules;
pub mod telemetry;

pub use app_state::AppState;
pub use error::{AppError, AppResult};

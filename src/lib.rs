pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod insights;
pub mod models;
pub mod refresh;
pub mod samples;
pub mod state;
pub mod synthesis;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use gateway::{Gateway, SessionContext};
pub use state::AppState;

pub mod aggregate;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;
pub mod views;

pub use app::router;
pub use config::Config;
pub use state::AppState;

pub mod app;
pub mod audits;
pub mod client;
pub mod config;
pub mod errors;
pub mod fixed;
pub mod handlers;
pub mod models;
pub mod profile;
pub mod radar;
pub mod ratio;
pub mod session;
pub mod skills;
pub mod state;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;

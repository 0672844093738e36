pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod records;
pub mod scheduler;
pub mod series;
pub mod state;
pub mod storage;
pub mod trainer;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::Store;

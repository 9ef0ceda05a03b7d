pub mod health;
pub mod summary;

pub use health::health_check;
pub use summary::{get_summary, AppState};

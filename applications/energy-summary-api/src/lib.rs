pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod tibber;
pub mod window;

// Re-export commonly used items
pub use aggregate::Aggregator;
pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
pub use models::{AggregateResult, HomeSelection, MetricRecord, Resolution};
pub use tibber::{EnergyDataSource, TibberClient};

pub mod client;
pub mod response;

pub use client::{EnergyDataSource, TibberClient};
pub use response::normalize;

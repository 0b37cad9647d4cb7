mod api;
pub use api::{Api, ApiError};

mod config;
pub use config::PizzeriaConfig;

mod metrics;
pub use metrics::{HttpMetricsSnapshot, LatencySnapshot, StoreMetricsSnapshot};

mod service;
pub use service::Pizzeria;

mod store;
pub use store::{PlayerStore, StoreError};

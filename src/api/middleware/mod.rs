//! API middleware and extractors

pub mod client_id;
pub mod logging;
pub mod metrics;

pub use client_id::{ClientId, ClientIdPolicy};
pub use logging::logging_middleware;
pub use metrics::metrics_middleware;

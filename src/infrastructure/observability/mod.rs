//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_cache_lookup, record_generation,
    record_http_request, record_llm_request, CacheOutcome, PrometheusMetrics,
};

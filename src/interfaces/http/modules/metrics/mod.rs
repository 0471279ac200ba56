//! Prometheus metrics endpoint and HTTP metrics middleware

pub mod handlers;
pub mod middleware;

use std::sync::OnceLock;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub use handlers::*;
pub use middleware::http_metrics_middleware;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder, or return the one already
/// installed. The recorder is process-wide, so a server restarted inside
/// the same process (or a second router built by a test) reuses it.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        // Lost a race with another caller; fall back to its handle
        Err(e) => return PROMETHEUS_HANDLE.get().cloned().ok_or(e),
    };
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Handle that renders without touching the global recorder
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

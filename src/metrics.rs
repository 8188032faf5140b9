//! Prometheus metrics exporter install and render.
//!
//! Counters and gauges are recorded inline at the call sites that
//! matter (`facade::Router::quote`, `cache`) via the global `metrics`
//! facade; this module only owns installing the recorder and rendering
//! its text-exposition output for the `/metrics` endpoint, the same
//! split the teacher uses between recording metrics throughout
//! `monitoring/metrics_broadcaster.rs` and exposing them over one
//! handle.

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder on first call and returns
/// its handle; subsequent calls (e.g. from multiple tests in the same
/// process) reuse the already-installed recorder rather than panicking
/// on a second `set_global_recorder`.
pub fn install() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new().install_recorder().expect("failed to install prometheus recorder")
        })
        .clone()
}

pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_and_render_does_not_panic() {
        let handle = install();
        metrics::counter!("routing_engine_test_total").increment(1);
        let rendered = render(&handle);
        assert!(rendered.contains("routing_engine_test_total"));
    }
}

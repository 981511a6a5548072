//! Gatehouse Observability
//!
//! Logging, per-request tracing and Prometheus metrics.
//!
//! Compiled in with the `observability` feature (default). At runtime it can
//! still be switched off with `OBSERVABILITY_ENABLED=false`, in which case
//! only console logging is set up and every tracker is a no-op.
//!
//! ```no_run
//! use gatehouse_observability::{init_metrics, init_tracing};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_tracing()?;
//!     let _handle = init_metrics();
//!     Ok(())
//! }
//! ```

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::{default_filter, init_basic_console_logging, parse_enabled};

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use crate::logging::{init_tracing, is_observability_enabled, logging_middleware};
#[cfg(feature = "observability")]
pub use crate::metrics::{
    init_metrics, metrics_app, metrics_middleware, track_auth_rejected,
    track_authorization_check, track_jwt_issued, track_login_failure, track_login_success,
    track_user_registered,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{Router, extract::Request, middleware::Next, response::Response};

    /// Stand-in for the Prometheus handle; never constructed.
    #[derive(Clone, Debug)]
    pub enum PrometheusHandle {}

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub fn init_tracing() -> anyhow::Result<()> {
        super::init_basic_console_logging()
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub fn init_metrics() -> Option<PrometheusHandle> {
        None
    }

    pub fn metrics_app(handle: PrometheusHandle) -> Router {
        match handle {}
    }

    pub fn track_login_success(_role: &str) {}
    pub fn track_login_failure(_reason: &str) {}
    pub fn track_user_registered(_role: &str) {}
    pub fn track_jwt_issued() {}
    pub fn track_auth_rejected(_kind: &str) {}
    pub fn track_authorization_check(_allowed: bool, _operation: &str) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;

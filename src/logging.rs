use crate::app_env;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing::{Span, debug, debug_span, field};
use tracing_subscriber::{EnvFilter, prelude::*, registry};

/// Attaches a tracing middleware layer to the given router. Every request gets
/// a span carrying the method and path, with the response status recorded once
/// the request completes
pub fn attach_tracing_http<T>(router: Router<T>) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    debug_span!(
                        "request",
                        method = &request.method().as_str(),
                        path = request.uri().path(),
                        response_status = field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<Body>, _latency: Duration, span: &Span| {
                        span.record("response_status", field::display(response.status()));
                        debug!("request processing complete");
                    },
                ),
        ),
    )
}

/// Constructs a filter which uses [app_env::LOG_LEVEL] to configure per-module logging. Filters
/// to the "info" level by default.
pub fn init_env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(app_env::LOG_LEVEL)
        .from_env()
        .expect("building the logging filter failed")
}

/// Sets up the global logging sink, printing JSON log lines to stdout. Though the
/// logger is set up with the "tracing" crate, it also provides a bridge for
/// libraries still using "log" for logging.
pub fn setup_logging(env_filter: EnvFilter) {
    registry()
        .with(LevelFilter::DEBUG)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_filter(env_filter),
        )
        .init();
}

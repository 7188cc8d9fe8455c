use axum::{middleware, routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

use crate::access_log::access_log;
use crate::handlers::{internal_error, not_found, ship};

pub fn build_router() -> Router {
    let routes = Router::new()
        // Methods other than GET/HEAD fall through to 404 like unknown paths.
        .route("/ship", get(ship).fallback(not_found))
        .fallback(not_found);
    with_layers(routes)
}

/// Outermost first: request span, access log, panic recovery.
fn with_layers(routes: Router) -> Router {
    routes
        .layer(CatchPanicLayer::custom(internal_error))
        .layer(middleware::from_fn(access_log))
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)),
        )
}

use std::any::Any;

use axum::{
    extract::{rejection::QueryRejection, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::{ResponseEnvelope, TelemetryReport};

fn reply(status: StatusCode, body: ResponseEnvelope) -> Response {
    (status, Json(body)).into_response()
}

pub async fn ship(query: Result<Query<Vec<(String, String)>>, QueryRejection>) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return reply(
                StatusCode::BAD_REQUEST,
                ResponseEnvelope::error(rejection.body_text()),
            )
        }
    };

    match TelemetryReport::from_query(&params) {
        Ok(report) => {
            tracing::info!(
                "Detected ship {} in position ({},{}) with fuel {}",
                report.name,
                report.x,
                report.y,
                report.fuel
            );
            reply(StatusCode::OK, ResponseEnvelope::ack(&report.name))
        }
        Err(err) => {
            tracing::debug!(field = err.field(), error = %err, "rejected telemetry report");
            reply(StatusCode::BAD_REQUEST, ResponseEnvelope::error(err.to_string()))
        }
    }
}

pub async fn not_found() -> Response {
    reply(StatusCode::NOT_FOUND, ResponseEnvelope::error("Not Found"))
}

/// Turns a handler panic into a JSON 500 so the request still gets a body.
pub fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = detail, "handler panicked");

    reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        ResponseEnvelope::error("Internal Server Error"),
    )
}

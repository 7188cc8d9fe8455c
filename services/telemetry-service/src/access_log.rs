use std::{fmt, time::Instant};

use axum::{
    extract::Request,
    http::{Method, StatusCode, Uri},
    middleware::Next,
    response::Response,
};

/// Status recorded when the request future is dropped before a response
/// exists, e.g. the client hung up.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// One completed exchange. `path` keeps the query string as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogEntry {
    pub method: Method,
    pub path: String,
    pub status: u16,
    pub duration_millis: u128,
}

impl fmt::Display for AccessLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} → {} ({}ms)",
            self.method, self.path, self.status, self.duration_millis
        )
    }
}

impl AccessLogEntry {
    pub fn emit(&self) {
        tracing::info!(target: "telemetry_service::access", "{}", self);
    }
}

/// Emits exactly one entry: from `finish`, or from `Drop` if the request
/// was cancelled first.
struct InFlight {
    method: Method,
    path: String,
    started: Instant,
    logged: bool,
}

impl InFlight {
    fn new(method: Method, uri: &Uri) -> Self {
        let path = uri
            .path_and_query()
            .map(|path_and_query| path_and_query.as_str())
            .unwrap_or_else(|| uri.path())
            .to_string();
        Self {
            method,
            path,
            started: Instant::now(),
            logged: false,
        }
    }

    fn entry(&self, status: u16) -> AccessLogEntry {
        AccessLogEntry {
            method: self.method.clone(),
            path: self.path.clone(),
            status,
            duration_millis: self.started.elapsed().as_millis(),
        }
    }

    fn finish(mut self, status: StatusCode) {
        self.logged = true;
        self.entry(status.as_u16()).emit();
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.logged {
            self.entry(CLIENT_CLOSED_REQUEST).emit();
        }
    }
}

pub async fn access_log(request: Request, next: Next) -> Response {
    let in_flight = InFlight::new(request.method().clone(), request.uri());
    let response = next.run(request).await;
    in_flight.finish(response.status());
    response
}

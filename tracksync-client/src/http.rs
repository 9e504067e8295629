//! Request execution and error mapping shared by both clients.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracksync_core::{ApiError, Service};

/// Execute `request`, with an optional JSON body, mapping failures onto [`ApiError`].
pub(crate) fn send<B: Serialize>(
    service: Service,
    operation: &'static str,
    request: ureq::Request,
    body: Option<&B>,
) -> Result<ureq::Response, ApiError> {
    tracing::debug!("{service} {} {}", request.method(), request.url());
    let result = match body {
        Some(body) => request.send_json(body),
        None => request.call(),
    };
    result.map_err(|err| map_error(service, operation, err))
}

/// Decode a JSON response body.
pub(crate) fn decode<T: DeserializeOwned>(
    service: Service,
    operation: &'static str,
    response: ureq::Response,
) -> Result<T, ApiError> {
    response.into_json().map_err(|source| ApiError::Decode {
        service,
        operation,
        source,
    })
}

/// Numeric response header, `None` when absent or malformed.
pub(crate) fn header_number<N: std::str::FromStr>(response: &ureq::Response, name: &str) -> Option<N> {
    response.header(name).and_then(|v| v.trim().parse().ok())
}

fn map_error(service: Service, operation: &'static str, err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(401, _) => ApiError::Unauthorized { service, operation },
        ureq::Error::Status(status, response) => ApiError::Status {
            service,
            operation,
            status,
            body: truncate(&response.into_string().unwrap_or_default()),
        },
        ureq::Error::Transport(transport) => ApiError::Transport {
            service,
            operation,
            message: transport.to_string(),
        },
    }
}

const MAX_ERROR_BODY: usize = 512;

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

//! Request and response types exchanged across the worker boundary.
//!
//! Server-side types are what the relay hands to the worker and expects back.
//! Framework-side types are what the application handles after the host has
//! bridged a server request. Both sides use the `http` crate representation;
//! the conversion between them belongs to the host.

use bytes::Bytes;

use crate::extension::ExtensionError;

/// Request as received from the application server relay.
pub type ServerRequest = http::Request<Bytes>;

/// Response as sent back to the application server relay.
pub type ServerResponse = http::Response<Bytes>;

/// Request as seen by the framework application.
pub type Request = http::Request<Bytes>;

/// Response produced by the framework application.
pub type Response = http::Response<Bytes>;

pub(crate) fn json_response(
    status: http::StatusCode,
    body: &serde_json::Value,
) -> Result<ServerResponse, ExtensionError> {
    let payload = serde_json::to_vec(body)?;

    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Bytes::from(payload))
        .map_err(|e| ExtensionError::handler(format!("Failed to build response: {}", e)))
}

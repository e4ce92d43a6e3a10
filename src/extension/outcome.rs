use std::fmt;

use crate::extension::BoxError;
use crate::message::ServerResponse;

/// What an `error` hook offers in place of a failed request. The host
/// decides how to dispatch it: send the response, or report the error.
#[derive(Debug)]
pub enum ErrorOutcome {
    Response(ServerResponse),
    Error(BoxError),
}

impl ErrorOutcome {
    pub fn response(response: ServerResponse) -> Self {
        ErrorOutcome::Response(response)
    }

    pub fn error<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        ErrorOutcome::Error(error.into())
    }

    pub fn is_response(&self) -> bool {
        matches!(self, ErrorOutcome::Response(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ErrorOutcome::Error(_))
    }

    pub fn into_response(self) -> Option<ServerResponse> {
        match self {
            ErrorOutcome::Response(response) => Some(response),
            ErrorOutcome::Error(_) => None,
        }
    }

    pub fn into_error(self) -> Option<BoxError> {
        match self {
            ErrorOutcome::Error(error) => Some(error),
            ErrorOutcome::Response(_) => None,
        }
    }
}

impl fmt::Display for ErrorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorOutcome::Response(response) => write!(f, "Response: {}", response.status()),
            ErrorOutcome::Error(e) => write!(f, "Error: {}", e),
        }
    }
}

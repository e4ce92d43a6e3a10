use crate::app::Application;
use crate::config::Config;
use crate::extension::{BoxError, ErrorOutcome, Extension, ExtensionError};
use crate::message::{json_response, ServerRequest};

/// Converts any request failure into a JSON 500 response. The failure
/// message is only exposed when `app.debug` is set.
#[derive(Debug, Default)]
pub struct ErrorResponseExtension {
    debug: bool,
}

impl ErrorResponseExtension {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Extension for ErrorResponseExtension {
    fn name(&self) -> &str {
        "error-response"
    }

    fn init(&mut self, _app: &mut Application, config: &Config) -> Result<(), ExtensionError> {
        self.debug = config.debug();
        Ok(())
    }

    fn error(
        &mut self,
        _app: &Application,
        _request: &ServerRequest,
        err: &BoxError,
    ) -> Result<Option<ErrorOutcome>, ExtensionError> {
        let body = if self.debug {
            serde_json::json!({ "error": "Internal Server Error", "message": err.to_string() })
        } else {
            serde_json::json!({ "error": "Internal Server Error" })
        };

        let response = json_response(http::StatusCode::INTERNAL_SERVER_ERROR, &body)?;
        Ok(Some(ErrorOutcome::response(response)))
    }
}

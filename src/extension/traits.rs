use crate::app::Application;
use crate::client::RelayClient;
use crate::config::Config;
use crate::extension::{BoxError, ErrorOutcome, ExtensionDependency, ExtensionError};
use crate::message::{Request, Response, ServerRequest, ServerResponse};

/// Lifecycle hooks a worker invokes around its request loop.
///
/// Every hook has a no-op default so an extension only implements the
/// points it cares about.
pub trait Extension: Send + 'static {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn dependencies(&self) -> Vec<ExtensionDependency> {
        vec![]
    }

    /// Called once before the worker starts serving. Extensions register
    /// their services into `app` here.
    fn init(&mut self, _app: &mut Application, _config: &Config) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Returns `true` when the extension answered the request itself through
    /// `client`, in which case the application never sees it.
    fn handle_request(
        &mut self,
        _app: &Application,
        _client: &mut dyn RelayClient,
        _request: &ServerRequest,
    ) -> Result<bool, ExtensionError> {
        Ok(false)
    }

    fn before_request(&mut self, _app: &Application, _request: &ServerRequest) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn after_request(
        &mut self,
        _app: &Application,
        _request: &ServerRequest,
        _response: &ServerResponse,
    ) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn before_handle(&mut self, _app: &Application, _request: &Request) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn after_handle(
        &mut self,
        _app: &Application,
        _request: &Request,
        _response: &Response,
    ) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn before_loop(&mut self, _app: &Application) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn after_loop(&mut self, _app: &Application) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Observes a failure raised while executing `request`. Returning
    /// `Some` offers a response to send or an error to report in its place.
    fn error(
        &mut self,
        _app: &Application,
        _request: &ServerRequest,
        _error: &BoxError,
    ) -> Result<Option<ErrorOutcome>, ExtensionError> {
        Ok(None)
    }
}

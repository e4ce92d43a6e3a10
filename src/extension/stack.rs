use tracing::{debug, trace};

use crate::app::Application;
use crate::client::RelayClient;
use crate::config::Config;
use crate::extension::{BoxError, ErrorOutcome, Extension, ExtensionError};
use crate::message::{Request, Response, ServerRequest, ServerResponse};

/// Ordered group of extensions that behaves like a single extension.
///
/// Hooks are forwarded to every member in construction order. Two hooks
/// combine results:
///
/// - `handle_request` stops at the first member that claims the request.
/// - `error` visits every member and keeps the last outcome offered.
///
/// A failing member aborts the current call; members after it are skipped
/// and the failure is returned unchanged.
pub struct ExtensionStack {
    extensions: Vec<Box<dyn Extension>>,
}

impl ExtensionStack {
    pub fn new(extensions: Vec<Box<dyn Extension>>) -> Self {
        ExtensionStack { extensions }
    }

    pub fn builder() -> crate::extension::ExtensionStackBuilder {
        crate::extension::ExtensionStackBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Member names in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|ext| ext.name()).collect()
    }
}

impl Default for ExtensionStack {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Extension for ExtensionStack {
    fn name(&self) -> &str {
        "extension-stack"
    }

    fn init(&mut self, app: &mut Application, config: &Config) -> Result<(), ExtensionError> {
        for ext in self.extensions.iter_mut() {
            trace!(extension = ext.name(), "init");
            ext.init(app, config)?;
        }
        Ok(())
    }

    fn handle_request(
        &mut self,
        app: &Application,
        client: &mut dyn RelayClient,
        request: &ServerRequest,
    ) -> Result<bool, ExtensionError> {
        for ext in self.extensions.iter_mut() {
            if ext.handle_request(app, client, request)? {
                debug!(extension = ext.name(), path = request.uri().path(), "request claimed");
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn before_request(&mut self, app: &Application, request: &ServerRequest) -> Result<(), ExtensionError> {
        for ext in self.extensions.iter_mut() {
            ext.before_request(app, request)?;
        }
        Ok(())
    }

    fn after_request(
        &mut self,
        app: &Application,
        request: &ServerRequest,
        response: &ServerResponse,
    ) -> Result<(), ExtensionError> {
        for ext in self.extensions.iter_mut() {
            ext.after_request(app, request, response)?;
        }
        Ok(())
    }

    fn before_handle(&mut self, app: &Application, request: &Request) -> Result<(), ExtensionError> {
        for ext in self.extensions.iter_mut() {
            ext.before_handle(app, request)?;
        }
        Ok(())
    }

    fn after_handle(
        &mut self,
        app: &Application,
        request: &Request,
        response: &Response,
    ) -> Result<(), ExtensionError> {
        for ext in self.extensions.iter_mut() {
            ext.after_handle(app, request, response)?;
        }
        Ok(())
    }

    fn before_loop(&mut self, app: &Application) -> Result<(), ExtensionError> {
        for ext in self.extensions.iter_mut() {
            trace!(extension = ext.name(), "before_loop");
            ext.before_loop(app)?;
        }
        Ok(())
    }

    fn after_loop(&mut self, app: &Application) -> Result<(), ExtensionError> {
        for ext in self.extensions.iter_mut() {
            trace!(extension = ext.name(), "after_loop");
            ext.after_loop(app)?;
        }
        Ok(())
    }

    fn error(
        &mut self,
        app: &Application,
        request: &ServerRequest,
        error: &BoxError,
    ) -> Result<Option<ErrorOutcome>, ExtensionError> {
        let mut result = None;

        for ext in self.extensions.iter_mut() {
            if let Some(outcome) = ext.error(app, request, error)? {
                debug!(extension = ext.name(), %outcome, "error outcome");
                result = Some(outcome);
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BufferedClient;
    use bytes::Bytes;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<String>>>;

    /// Records every hook call as `"<hook>:<id>"` and answers with canned
    /// results.
    struct Probe {
        id: usize,
        log: CallLog,
        claims: bool,
        outcome: Option<&'static str>,
        fail_on: Option<&'static str>,
    }

    impl Probe {
        fn new(id: usize, log: &CallLog) -> Self {
            Probe {
                id,
                log: log.clone(),
                claims: false,
                outcome: None,
                fail_on: None,
            }
        }

        fn claims(mut self) -> Self {
            self.claims = true;
            self
        }

        fn outcome(mut self, message: &'static str) -> Self {
            self.outcome = Some(message);
            self
        }

        fn fail_on(mut self, hook: &'static str) -> Self {
            self.fail_on = Some(hook);
            self
        }

        fn record(&self, hook: &str) -> Result<(), ExtensionError> {
            self.log.lock().unwrap().push(format!("{}:{}", hook, self.id));
            if self.fail_on == Some(hook) {
                return Err(ExtensionError::handler(format!("{} failed in {}", hook, self.id)));
            }
            Ok(())
        }
    }

    impl Extension for Probe {
        fn init(&mut self, _app: &mut Application, _config: &Config) -> Result<(), ExtensionError> {
            self.record("init")
        }

        fn handle_request(
            &mut self,
            _app: &Application,
            _client: &mut dyn RelayClient,
            _request: &ServerRequest,
        ) -> Result<bool, ExtensionError> {
            self.record("handle_request")?;
            Ok(self.claims)
        }

        fn before_request(&mut self, _app: &Application, _request: &ServerRequest) -> Result<(), ExtensionError> {
            self.record("before_request")
        }

        fn after_request(
            &mut self,
            _app: &Application,
            _request: &ServerRequest,
            _response: &ServerResponse,
        ) -> Result<(), ExtensionError> {
            self.record("after_request")
        }

        fn before_handle(&mut self, _app: &Application, _request: &Request) -> Result<(), ExtensionError> {
            self.record("before_handle")
        }

        fn after_handle(
            &mut self,
            _app: &Application,
            _request: &Request,
            _response: &Response,
        ) -> Result<(), ExtensionError> {
            self.record("after_handle")
        }

        fn before_loop(&mut self, _app: &Application) -> Result<(), ExtensionError> {
            self.record("before_loop")
        }

        fn after_loop(&mut self, _app: &Application) -> Result<(), ExtensionError> {
            self.record("after_loop")
        }

        fn error(
            &mut self,
            _app: &Application,
            _request: &ServerRequest,
            _error: &BoxError,
        ) -> Result<Option<ErrorOutcome>, ExtensionError> {
            self.record("error")?;
            Ok(self.outcome.map(ErrorOutcome::error))
        }
    }

    fn new_log() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn stack_of(probes: Vec<Probe>) -> ExtensionStack {
        ExtensionStack::new(
            probes
                .into_iter()
                .map(|p| Box::new(p) as Box<dyn Extension>)
                .collect(),
        )
    }

    fn request() -> ServerRequest {
        http::Request::builder()
            .uri("/orders")
            .body(Bytes::new())
            .unwrap()
    }

    fn failure() -> BoxError {
        "database unavailable".into()
    }

    #[test]
    fn test_init_runs_every_extension_in_order() {
        let log = new_log();
        let mut stack = stack_of((0..3).map(|i| Probe::new(i, &log)).collect());
        let mut app = Application::new("test");

        stack.init(&mut app, &Config::default()).unwrap();

        assert_eq!(calls(&log), vec!["init:0", "init:1", "init:2"]);
    }

    #[test]
    fn test_handle_request_first_claim_wins() {
        let log = new_log();
        let mut stack = stack_of(vec![
            Probe::new(0, &log),
            Probe::new(1, &log).claims(),
            Probe::new(2, &log).claims(),
        ]);
        let app = Application::new("test");
        let mut client = BufferedClient::new();

        let claimed = stack.handle_request(&app, &mut client, &request()).unwrap();

        assert!(claimed);
        assert_eq!(calls(&log), vec!["handle_request:0", "handle_request:1"]);
    }

    #[test]
    fn test_handle_request_unclaimed_visits_all() {
        let log = new_log();
        let mut stack = stack_of((0..3).map(|i| Probe::new(i, &log)).collect());
        let app = Application::new("test");
        let mut client = BufferedClient::new();

        let claimed = stack.handle_request(&app, &mut client, &request()).unwrap();

        assert!(!claimed);
        assert_eq!(
            calls(&log),
            vec!["handle_request:0", "handle_request:1", "handle_request:2"]
        );
    }

    #[test]
    fn test_void_hooks_visit_all_in_order() {
        let log = new_log();
        let mut stack = stack_of((0..3).map(|i| Probe::new(i, &log)).collect());
        let app = Application::new("test");
        let req = request();
        let resp = http::Response::new(Bytes::new());

        stack.before_loop(&app).unwrap();
        stack.before_request(&app, &req).unwrap();
        stack.before_handle(&app, &req).unwrap();
        stack.after_handle(&app, &req, &resp).unwrap();
        stack.after_request(&app, &req, &resp).unwrap();
        stack.after_loop(&app).unwrap();

        let expected: Vec<String> = [
            "before_loop",
            "before_request",
            "before_handle",
            "after_handle",
            "after_request",
            "after_loop",
        ]
        .iter()
        .flat_map(|hook| (0..3).map(move |i| format!("{}:{}", hook, i)))
        .collect();

        assert_eq!(calls(&log), expected);
    }

    #[test]
    fn test_error_last_outcome_wins() {
        let log = new_log();
        let mut stack = stack_of(vec![
            Probe::new(0, &log),
            Probe::new(1, &log).outcome("X"),
            Probe::new(2, &log),
            Probe::new(3, &log).outcome("Y"),
        ]);
        let app = Application::new("test");

        let outcome = stack.error(&app, &request(), &failure()).unwrap();

        assert_eq!(outcome.unwrap().into_error().unwrap().to_string(), "Y");
        assert_eq!(calls(&log), vec!["error:0", "error:1", "error:2", "error:3"]);
    }

    #[test]
    fn test_error_trailing_absent_keeps_earlier_outcome() {
        let log = new_log();
        let mut stack = stack_of(vec![
            Probe::new(0, &log).outcome("X"),
            Probe::new(1, &log),
        ]);
        let app = Application::new("test");

        let outcome = stack.error(&app, &request(), &failure()).unwrap();

        assert_eq!(outcome.unwrap().to_string(), "Error: X");
    }

    #[test]
    fn test_error_all_absent() {
        let log = new_log();
        let mut stack = stack_of((0..3).map(|i| Probe::new(i, &log)).collect());
        let app = Application::new("test");

        let outcome = stack.error(&app, &request(), &failure()).unwrap();

        assert!(outcome.is_none());
        assert_eq!(calls(&log).len(), 3);
    }

    #[test]
    fn test_failure_propagates_and_skips_rest() {
        let log = new_log();
        let mut stack = stack_of(vec![
            Probe::new(0, &log),
            Probe::new(1, &log).fail_on("before_loop"),
            Probe::new(2, &log),
        ]);
        let app = Application::new("test");

        let result = stack.before_loop(&app);

        match result {
            Err(ExtensionError::HandlerError(msg)) => assert_eq!(msg, "before_loop failed in 1"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(calls(&log), vec!["before_loop:0", "before_loop:1"]);
    }

    #[test]
    fn test_failing_error_hook_skips_rest() {
        let log = new_log();
        let mut stack = stack_of(vec![
            Probe::new(0, &log).outcome("X"),
            Probe::new(1, &log).fail_on("error"),
            Probe::new(2, &log).outcome("Y"),
        ]);
        let app = Application::new("test");

        let result = stack.error(&app, &request(), &failure());

        assert!(result.is_err());
        assert_eq!(calls(&log), vec!["error:0", "error:1"]);
    }

    #[test]
    fn test_failing_handle_request_skips_rest() {
        let log = new_log();
        let mut stack = stack_of(vec![
            Probe::new(0, &log).fail_on("handle_request"),
            Probe::new(1, &log).claims(),
        ]);
        let app = Application::new("test");
        let mut client = BufferedClient::new();

        assert!(stack.handle_request(&app, &mut client, &request()).is_err());
        assert_eq!(calls(&log), vec!["handle_request:0"]);
    }

    #[test]
    fn test_empty_stack_is_noop() {
        let mut stack = ExtensionStack::default();
        let mut app = Application::new("test");
        let mut client = BufferedClient::new();
        let req = request();
        let resp = http::Response::new(Bytes::new());

        assert!(stack.is_empty());
        stack.init(&mut app, &Config::default()).unwrap();
        stack.before_loop(&app).unwrap();
        assert!(!stack.handle_request(&app, &mut client, &req).unwrap());
        stack.before_request(&app, &req).unwrap();
        stack.before_handle(&app, &req).unwrap();
        stack.after_handle(&app, &req, &resp).unwrap();
        stack.after_request(&app, &req, &resp).unwrap();
        assert!(stack.error(&app, &req, &failure()).unwrap().is_none());
        stack.after_loop(&app).unwrap();
    }

    #[test]
    fn test_nested_stacks() {
        let log = new_log();
        let inner = stack_of(vec![Probe::new(1, &log), Probe::new(2, &log).outcome("inner")]);
        let mut outer = ExtensionStack::new(vec![
            Box::new(Probe::new(0, &log)),
            Box::new(inner),
            Box::new(Probe::new(3, &log)),
        ]);
        let app = Application::new("test");

        let outcome = outer.error(&app, &request(), &failure()).unwrap();

        assert_eq!(outcome.unwrap().to_string(), "Error: inner");
        assert_eq!(calls(&log), vec!["error:0", "error:1", "error:2", "error:3"]);
        assert_eq!(outer.names()[1], "extension-stack");
    }
}

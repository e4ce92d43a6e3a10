use bytes::Bytes;
use http_worker_ext::config::HEALTH_PATH_KEY;
use http_worker_ext::extension::{
    BoxError, ErrorOutcome, ErrorResponseExtension, Extension, ExtensionDependency, ExtensionError,
    ExtensionStack, HealthCheckExtension, RequestLogExtension,
};
use http_worker_ext::message::{Request, Response};
use http_worker_ext::{Application, BufferedClient, Config, RelayClient};
use tracing::info;

struct HelloExtension {
    greeting: String,
    handled: u64,
}

impl HelloExtension {
    fn new() -> Self {
        HelloExtension {
            greeting: "Hello".to_string(),
            handled: 0,
        }
    }
}

impl Extension for HelloExtension {
    fn name(&self) -> &str {
        "hello"
    }

    fn dependencies(&self) -> Vec<ExtensionDependency> {
        vec![ExtensionDependency::new("request-log", semver::Version::new(1, 0, 0))]
    }

    fn init(&mut self, app: &mut Application, config: &Config) -> Result<(), ExtensionError> {
        if let Some(greeting) = config.settings().get_string("hello.greeting") {
            self.greeting = greeting;
        }
        app.bind("hello.greeting", self.greeting.clone());
        info!("Hello extension initialized");
        Ok(())
    }

    fn after_handle(&mut self, _app: &Application, request: &Request, _response: &Response) -> Result<(), ExtensionError> {
        self.handled += 1;
        info!("{} from {}", self.greeting, request.uri().path());
        Ok(())
    }

    fn after_loop(&mut self, _app: &Application) -> Result<(), ExtensionError> {
        info!("Total requests greeted: {}", self.handled);
        Ok(())
    }
}

fn get(path: &str) -> http::Request<Bytes> {
    http::Request::builder()
        .uri(path)
        .body(Bytes::new())
        .expect("static request")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    http_worker_ext::logging::init_tracing("info")?;

    let config = Config::builder()
        .setting("hello.greeting", "Hello from Rust!")
        .setting(HEALTH_PATH_KEY, "/healthz")
        .build();

    let mut stack = ExtensionStack::builder()
        .extension(HelloExtension::new())
        .extension(RequestLogExtension::new())
        .extension(HealthCheckExtension::new())
        .extension(ErrorResponseExtension::new())
        .resolve_dependencies(true)
        .build()?;
    info!("Extension order: {:?}", stack.names());

    let mut app = Application::new("hello").with_environment("local");
    let mut client = BufferedClient::new();

    stack.init(&mut app, &config)?;
    stack.before_loop(&app)?;

    for request in [get("/healthz"), get("/greet"), get("/broken")] {
        if stack.handle_request(&app, &mut client, &request)? {
            continue;
        }

        stack.before_request(&app, &request)?;

        if request.uri().path() == "/broken" {
            let failure: BoxError = "handler exploded".into();
            match stack.error(&app, &request, &failure)? {
                Some(ErrorOutcome::Response(response)) => client.respond(response)?,
                Some(ErrorOutcome::Error(e)) => client.error(&e.to_string())?,
                None => client.error(&failure.to_string())?,
            }
            continue;
        }

        stack.before_handle(&app, &request)?;
        let response = http::Response::new(Bytes::from_static(b"hi"));
        stack.after_handle(&app, &request, &response)?;
        stack.after_request(&app, &request, &response)?;
        client.respond(response)?;
    }

    stack.after_loop(&app)?;

    for response in client.responses() {
        info!("Relayed {}", response.status());
    }

    Ok(())
}

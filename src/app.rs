use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Service = Arc<dyn Any + Send + Sync>;

/// Handle to the framework application hosted by the worker.
///
/// Extensions register shared services here during `init` and look them up
/// from the other hooks.
pub struct Application {
    name: String,
    environment: String,
    services: HashMap<String, Service>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Application {
            name: name.into(),
            environment: "production".to_string(),
            services: HashMap::new(),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Registers `service` under `key`, replacing any previous binding.
    pub fn bind<T: Any + Send + Sync>(&mut self, key: impl Into<String>, service: T) {
        self.services.insert(key.into(), Arc::new(service));
    }

    /// Returns the service bound under `key` if it exists and has type `T`.
    pub fn resolve<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.services
            .get(key)
            .cloned()
            .and_then(|service| service.downcast::<T>().ok())
    }

    pub fn has(&self, key: &str) -> bool {
        self.services.contains_key(key)
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.services.keys().collect();
        keys.sort();

        f.debug_struct("Application")
            .field("name", &self.name)
            .field("environment", &self.environment)
            .field("services", &keys)
            .finish()
    }
}

pub mod builder;
pub mod dependency;
pub mod error;
pub mod error_response;
pub mod health;
pub mod outcome;
pub mod request_log;
pub mod stack;
pub mod traits;

pub use builder::ExtensionStackBuilder;
pub use dependency::{DependencyResolver, ExtensionDependency};
pub use error::{BoxError, ExtensionError};
pub use error_response::ErrorResponseExtension;
pub use health::{HealthCheckExtension, HealthService, HealthStatus};
pub use outcome::ErrorOutcome;
pub use request_log::RequestLogExtension;
pub use stack::ExtensionStack;
pub use traits::Extension;

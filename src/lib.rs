pub mod app;
pub mod client;
pub mod config;
pub mod extension;
pub mod logging;
pub mod message;

pub use app::Application;
pub use client::{BufferedClient, RelayClient};
pub use config::{Config, Settings};
pub use extension::{ErrorOutcome, Extension, ExtensionError, ExtensionStack};

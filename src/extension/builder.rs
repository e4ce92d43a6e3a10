use semver::Version;
use tracing::debug;

use crate::extension::{DependencyResolver, Extension, ExtensionError, ExtensionStack};

/// Collects extensions and freezes them into an `ExtensionStack`.
pub struct ExtensionStackBuilder {
    extensions: Vec<Box<dyn Extension>>,
    resolve_dependencies: bool,
}

impl ExtensionStackBuilder {
    pub fn new() -> Self {
        ExtensionStackBuilder {
            extensions: Vec::new(),
            resolve_dependencies: false,
        }
    }

    pub fn extension<E: Extension>(mut self, extension: E) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn boxed(mut self, extension: Box<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// When enabled, `build` moves each extension after the ones named in
    /// its `dependencies()`. Otherwise insertion order is kept as is.
    pub fn resolve_dependencies(mut self, enabled: bool) -> Self {
        self.resolve_dependencies = enabled;
        self
    }

    pub fn build(self) -> Result<ExtensionStack, ExtensionError> {
        if !self.resolve_dependencies {
            return Ok(ExtensionStack::new(self.extensions));
        }

        let mut resolver = DependencyResolver::new();
        for ext in &self.extensions {
            let version = Version::parse(ext.version()).map_err(|e| {
                ExtensionError::configuration(format!(
                    "Extension '{}' has an invalid version '{}': {}",
                    ext.name(),
                    ext.version(),
                    e
                ))
            })?;
            resolver.add_extension(ext.name(), version, ext.dependencies())?;
        }

        let order = resolver.resolve()?;

        let mut slots: Vec<Option<Box<dyn Extension>>> = self.extensions.into_iter().map(Some).collect();
        let ordered: Vec<Box<dyn Extension>> = order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect();

        let stack = ExtensionStack::new(ordered);
        debug!(order = ?stack.names(), "resolved extension order");
        Ok(stack)
    }
}

impl Default for ExtensionStackBuilder {
    fn default() -> Self {
        Self::new()
    }
}

use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::extension::ExtensionError;

/// Requirement of one extension on another, by name and minimum version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtensionDependency {
    pub name: String,
    pub version: Version,
}

impl ExtensionDependency {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        ExtensionDependency {
            name: name.into(),
            version,
        }
    }

    pub fn parse(name: impl Into<String>, version_str: &str) -> Result<Self, ExtensionError> {
        let version = Version::parse(version_str)?;
        Ok(Self::new(name, version))
    }

    pub fn satisfies(&self, other_version: &Version) -> bool {
        self.version <= *other_version
    }
}

impl fmt::Display for ExtensionDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// Orders extensions so that every dependency comes before its dependents.
/// Extensions without a constraint between them keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct DependencyResolver {
    extensions: Vec<ExtensionInfo>,
}

#[derive(Debug, Clone)]
struct ExtensionInfo {
    name: String,
    version: Version,
    dependencies: Vec<ExtensionDependency>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        DependencyResolver {
            extensions: Vec::new(),
        }
    }

    pub fn add_extension(
        &mut self,
        name: impl Into<String>,
        version: Version,
        dependencies: Vec<ExtensionDependency>,
    ) -> Result<(), ExtensionError> {
        let name = name.into();
        if self.position(&name).is_some() {
            return Err(ExtensionError::configuration(format!(
                "Duplicate extension name: {}",
                name
            )));
        }

        self.extensions.push(ExtensionInfo {
            name,
            version,
            dependencies,
        });
        Ok(())
    }

    /// Returns insertion indices in resolved order.
    pub fn resolve(&self) -> Result<Vec<usize>, ExtensionError> {
        let mut resolved = Vec::with_capacity(self.extensions.len());
        let mut visiting = HashSet::new();

        for index in 0..self.extensions.len() {
            self.resolve_extension(index, &mut resolved, &mut visiting)?;
        }

        Ok(resolved)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.extensions.iter().position(|e| e.name == name)
    }

    fn resolve_extension(
        &self,
        index: usize,
        resolved: &mut Vec<usize>,
        visiting: &mut HashSet<usize>,
    ) -> Result<(), ExtensionError> {
        if resolved.contains(&index) {
            return Ok(());
        }

        let ext = &self.extensions[index];

        if !visiting.insert(index) {
            return Err(ExtensionError::dependency(format!(
                "Circular dependency detected for extension: {}",
                ext.name
            )));
        }

        for dep in &ext.dependencies {
            let dep_index = self.position(&dep.name).ok_or_else(|| {
                ExtensionError::dependency(format!("Missing dependency: {} requires {}", ext.name, dep.name))
            })?;

            let dep_ext = &self.extensions[dep_index];
            if !dep.satisfies(&dep_ext.version) {
                return Err(ExtensionError::dependency(format!(
                    "Dependency version mismatch: {} requires {} {}, but found {}",
                    ext.name, dep.name, dep.version, dep_ext.version
                )));
            }

            self.resolve_extension(dep_index, resolved, visiting)?;
        }

        visiting.remove(&index);
        resolved.push(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_creation() {
        let dep = ExtensionDependency::parse("health", "1.0.0").unwrap();
        assert_eq!(dep.name, "health");
        assert_eq!(dep.version, Version::new(1, 0, 0));
        assert_eq!(dep.to_string(), "health:1.0.0");

        assert!(ExtensionDependency::parse("health", "one").is_err());
    }

    #[test]
    fn test_dependency_satisfies() {
        let dep = ExtensionDependency::parse("health", "1.0.0").unwrap();
        assert!(dep.satisfies(&Version::new(1, 0, 0)));
        assert!(dep.satisfies(&Version::new(1, 1, 0)));
        assert!(dep.satisfies(&Version::new(2, 0, 0)));
        assert!(!dep.satisfies(&Version::new(0, 9, 0)));
    }

    #[test]
    fn test_resolver_orders_dependencies_first() {
        let mut resolver = DependencyResolver::new();

        resolver
            .add_extension(
                "ext-c",
                Version::new(1, 0, 0),
                vec![
                    ExtensionDependency::parse("ext-a", "1.0.0").unwrap(),
                    ExtensionDependency::parse("ext-b", "1.0.0").unwrap(),
                ],
            )
            .unwrap();
        resolver
            .add_extension(
                "ext-b",
                Version::new(1, 0, 0),
                vec![ExtensionDependency::parse("ext-a", "1.0.0").unwrap()],
            )
            .unwrap();
        resolver.add_extension("ext-a", Version::new(1, 0, 0), vec![]).unwrap();

        assert_eq!(resolver.resolve().unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn test_resolver_keeps_insertion_order_without_constraints() {
        let mut resolver = DependencyResolver::new();
        for name in ["one", "two", "three"] {
            resolver.add_extension(name, Version::new(1, 0, 0), vec![]).unwrap();
        }

        assert_eq!(resolver.resolve().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_circular_dependency_detection() {
        let mut resolver = DependencyResolver::new();

        resolver
            .add_extension(
                "ext-a",
                Version::new(1, 0, 0),
                vec![ExtensionDependency::parse("ext-b", "1.0.0").unwrap()],
            )
            .unwrap();
        resolver
            .add_extension(
                "ext-b",
                Version::new(1, 0, 0),
                vec![ExtensionDependency::parse("ext-a", "1.0.0").unwrap()],
            )
            .unwrap();

        let err = resolver.resolve().unwrap_err();
        assert!(err.to_string().contains("Circular dependency"));
    }

    #[test]
    fn test_missing_and_mismatched_dependencies() {
        let mut resolver = DependencyResolver::new();
        resolver
            .add_extension(
                "ext-a",
                Version::new(1, 0, 0),
                vec![ExtensionDependency::parse("ext-z", "1.0.0").unwrap()],
            )
            .unwrap();
        assert!(resolver.resolve().unwrap_err().to_string().contains("Missing dependency"));

        let mut resolver = DependencyResolver::new();
        resolver.add_extension("ext-a", Version::new(1, 0, 0), vec![]).unwrap();
        resolver
            .add_extension(
                "ext-b",
                Version::new(1, 0, 0),
                vec![ExtensionDependency::parse("ext-a", "2.0.0").unwrap()],
            )
            .unwrap();
        assert!(resolver.resolve().unwrap_err().to_string().contains("version mismatch"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut resolver = DependencyResolver::new();
        resolver.add_extension("ext-a", Version::new(1, 0, 0), vec![]).unwrap();

        let result = resolver.add_extension("ext-a", Version::new(2, 0, 0), vec![]);
        assert!(matches!(result, Err(ExtensionError::ConfigurationError(_))));
    }
}

//! Environment value sources used by `env.` placeholders.

use std::collections::HashMap;
use std::env;

/// Trait for external lookups consulted by `%env.NAME%` placeholders.
pub trait EnvironmentSource: Send + Sync {
    /// Gets a value by name, or `None` if the name is not defined.
    fn get_env(&self, name: &str) -> Option<String>;

    /// Returns a human-readable name for this source.
    fn source_name(&self) -> &str;
}

/// Environment source backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvironmentSource for ProcessEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        // Names that cannot be represented in the environment are simply absent
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            return None;
        }
        env::var(name).ok()
    }

    fn source_name(&self) -> &str {
        "process environment"
    }
}

/// Environment source backed by an explicit map.
///
/// Values set here shadow the optional fallback source, which lets callers
/// define overrides without touching the process environment.
///
/// # Example
/// ```
/// use propstack::env::{EnvironmentSource, MapEnv};
///
/// let env = MapEnv::new().with_var("HOME", "/x");
/// assert_eq!(env.get_env("HOME").as_deref(), Some("/x"));
/// assert_eq!(env.get_env("USER"), None);
/// ```
#[derive(Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
    fallback: Option<Box<dyn EnvironmentSource>>,
}

impl MapEnv {
    /// Creates an empty map environment with no fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map environment that falls back to the process environment.
    pub fn over_process() -> Self {
        Self {
            vars: HashMap::new(),
            fallback: Some(Box::new(ProcessEnv)),
        }
    }

    /// Adds a variable and returns the updated source.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_var(name, value);
        self
    }

    /// Sets a variable.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Removes a variable, returning its previous value.
    pub fn remove_var(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }
}

impl std::fmt::Debug for MapEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapEnv")
            .field("vars", &self.vars)
            .field("fallback", &self.fallback.as_ref().map(|s| s.source_name()))
            .finish()
    }
}

impl EnvironmentSource for MapEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .cloned()
            .or_else(|| self.fallback.as_ref().and_then(|f| f.get_env(name)))
    }

    fn source_name(&self) -> &str {
        "environment map"
    }
}

impl<S: EnvironmentSource + ?Sized> EnvironmentSource for Box<S> {
    fn get_env(&self, name: &str) -> Option<String> {
        (**self).get_env(name)
    }

    fn source_name(&self) -> &str {
        (**self).source_name()
    }
}

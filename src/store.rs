//! The merged property store.

use crate::discovery::{ResolverChain, SourceResolver};
use crate::env::{EnvironmentSource, ProcessEnv};
use crate::error::{ConfigError, ConfigResult};
use crate::expander::Expander;
use crate::source::{FileSource, PropertySource, SearchPath};
use std::collections::HashMap;

/// Merged mapping of property names to raw values, with expansion on lookup.
///
/// A store is built by one or more [`merge`](Self::merge) calls and then
/// queried. Later sources override earlier ones for the same name. Lookups
/// through [`get`](Self::get) expand `%name%` and `%env.NAME%` placeholders
/// every time they are called.
///
/// Merging needs `&mut self`, so a store shared between threads is built
/// first and then shared read-only (for example behind an `Arc`).
///
/// # Example
/// ```
/// use propstack::{MapSource, PropertyStore};
///
/// let a = MapSource::new("a").with("hostname", "betty");
/// let b = MapSource::new("b")
///     .with("hostname", "wilma")
///     .with("msg", "The hostname is %hostname% and port is {0}.");
///
/// let mut store = PropertyStore::new();
/// store.merge(&[&a, &b]).unwrap();
///
/// assert_eq!(store.get("hostname").unwrap(), "wilma");
/// assert_eq!(
///     store.get_with_args("msg", &["1776"]).unwrap(),
///     "The hostname is wilma and port is 1776."
/// );
/// ```
pub struct PropertyStore {
    /// Raw values by name
    properties: HashMap<String, String>,

    /// Lookup for `env.` placeholders
    env: Box<dyn EnvironmentSource>,
}

impl PropertyStore {
    /// Creates an empty store resolving `env.` placeholders from the process
    /// environment.
    pub fn new() -> Self {
        Self::with_env(ProcessEnv)
    }

    /// Creates an empty store resolving `env.` placeholders through `env`.
    pub fn with_env(env: impl EnvironmentSource + 'static) -> Self {
        Self {
            properties: HashMap::new(),
            env: Box::new(env),
        }
    }

    /// Creates a store by merging `sources` in order.
    pub fn from_sources(sources: &[&dyn PropertySource]) -> ConfigResult<Self> {
        let mut store = Self::new();
        store.merge(sources)?;
        Ok(store)
    }

    /// Creates a store from the files named by the default resolver chain.
    ///
    /// See [`ResolverChain::standard`] for the strategies tried.
    pub fn discover() -> ConfigResult<Self> {
        let mut store = Self::new();
        store.merge_resolved(&ResolverChain::standard(), &SearchPath::standard())?;
        Ok(store)
    }

    /// Merges `sources` in order, later sources overriding earlier ones.
    ///
    /// A source reporting `SourceNotFound` is skipped. Any other failure
    /// aborts the merge; entries merged from earlier sources stay in place.
    ///
    /// # Returns
    /// The number of sources merged, skipped ones excluded.
    pub fn merge(&mut self, sources: &[&dyn PropertySource]) -> ConfigResult<usize> {
        let mut merged = 0;

        for source in sources {
            let entries = match source.load() {
                Ok(entries) => entries,
                Err(ConfigError::SourceNotFound { source_name }) => {
                    tracing::debug!(source = %source_name, "source not found, skipping");
                    continue;
                }
                Err(e) => return Err(e),
            };

            tracing::debug!(
                source = source.source_name(),
                entries = entries.len(),
                "merging source"
            );
            self.properties.extend(entries);
            merged += 1;
        }

        Ok(merged)
    }

    /// Merges files by name, each located along `search_path`.
    pub fn merge_files<I, P>(&mut self, names: I, search_path: &SearchPath) -> ConfigResult<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<std::path::Path>,
    {
        let sources: Vec<FileSource> = names
            .into_iter()
            .map(|name| FileSource::with_search_path(name, search_path.clone()))
            .collect();
        let sources: Vec<&dyn PropertySource> =
            sources.iter().map(|s| s as &dyn PropertySource).collect();

        self.merge(&sources)
    }

    /// Merges the files named by `resolver`, located along `search_path`.
    ///
    /// Nothing is merged when the resolver yields no list.
    pub fn merge_resolved(
        &mut self,
        resolver: &dyn SourceResolver,
        search_path: &SearchPath,
    ) -> ConfigResult<usize> {
        match resolver.resolve()? {
            Some(names) => self.merge_files(names, search_path),
            None => Ok(0),
        }
    }

    /// Returns the raw value of `name` without expansion.
    ///
    /// # Errors
    /// * `ConfigError::MissingProperty` - `name` is not defined
    pub fn get_raw(&self, name: &str) -> ConfigResult<&str> {
        self.properties
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::missing_property(name))
    }

    /// Same as [`get_raw`](Self::get_raw).
    pub fn get_unexpanded(&self, name: &str) -> ConfigResult<&str> {
        self.get_raw(name)
    }

    /// Returns the value of `name` with every placeholder expanded.
    ///
    /// # Errors
    /// * `ConfigError::MissingProperty` - `name`, a referenced property or a
    ///   referenced environment value is not defined
    /// * `ConfigError::MalformedSubstitution` - a raw value has an unmatched `%`
    /// * `ConfigError::CyclicSubstitution` - a property refers back to itself
    pub fn get(&self, name: &str) -> ConfigResult<String> {
        self.expander().expand(name)
    }

    /// Returns the expanded value of `name` with `{0}`, `{1}`, ... replaced
    /// by `args`.
    ///
    /// Expansion always happens first; argument markers are only seen in the
    /// fully expanded text.
    pub fn get_with_args<S: AsRef<str>>(&self, name: &str, args: &[S]) -> ConfigResult<String> {
        self.expander().expand_with_args(name, args)
    }

    /// Returns all defined names, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.properties.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns true if `name` is defined.
    pub fn contains_key(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Returns the number of defined names.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if no names are defined.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Logs every raw property at debug level, sorted by name.
    pub fn dump(&self) {
        for key in self.keys() {
            tracing::debug!(name = %key, value = %self.properties[&key], "property");
        }
    }

    fn expander(&self) -> Expander<'_> {
        Expander::new(&self.properties, self.env.as_ref())
    }
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyStore")
            .field("properties", &self.properties)
            .field("env", &self.env.source_name())
            .finish()
    }
}

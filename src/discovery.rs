//! Strategies for choosing which source files to merge.
//!
//! A [`SourceResolver`] produces an ordered list of source names, or `None`
//! when its strategy does not apply. [`ResolverChain::standard`] tries, in
//! order:
//!
//! 1. the `CONFIG_PROPERTIES_FILES` environment value, a comma-separated list
//! 2. a `config-properties.toml` manifest with a `files = [...]` array
//! 3. the single default file `config.properties`
//!
//! ```toml
//! # config-properties.toml
//! files = ["base.properties", "site.properties"]
//! ```

use crate::env::{EnvironmentSource, ProcessEnv};
use crate::error::{ConfigError, ConfigResult, ConfigResultExt};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment value holding a comma-separated source list.
pub const FILES_VAR: &str = "CONFIG_PROPERTIES_FILES";

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "config-properties.toml";

/// Default source file name.
pub const DEFAULT_FILE: &str = "config.properties";

/// Trait for strategies producing an ordered list of source names.
pub trait SourceResolver: Send + Sync {
    /// Returns the source names in merge order, or `None` if this strategy
    /// does not apply.
    fn resolve(&self) -> ConfigResult<Option<Vec<String>>>;

    /// Returns a human-readable name for this strategy.
    fn name(&self) -> &str;
}

/// Reads a comma-separated list of names from an environment value.
pub struct ListVarResolver {
    var: String,
    env: Box<dyn EnvironmentSource>,
}

impl ListVarResolver {
    /// Creates a resolver reading `var` from the process environment.
    pub fn new(var: impl Into<String>) -> Self {
        Self::with_env(var, ProcessEnv)
    }

    /// Creates a resolver reading `var` through `env`.
    pub fn with_env(var: impl Into<String>, env: impl EnvironmentSource + 'static) -> Self {
        Self {
            var: var.into(),
            env: Box::new(env),
        }
    }
}

impl SourceResolver for ListVarResolver {
    fn resolve(&self) -> ConfigResult<Option<Vec<String>>> {
        Ok(self.env.get_env(&self.var).map(|list| split_list(&list)))
    }

    fn name(&self) -> &str {
        &self.var
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Contents of a source manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceManifest {
    /// Source names in merge order
    #[serde(default)]
    pub files: Vec<String>,
}

impl SourceManifest {
    /// Parses a manifest from TOML text.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::resource_read("manifest", e.to_string()))
    }
}

/// Reads the source list from a TOML manifest file.
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    path: PathBuf,
    name: String,
}

impl ManifestResolver {
    /// Creates a resolver reading the manifest at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl SourceResolver for ManifestResolver {
    fn resolve(&self) -> ConfigResult<Option<Vec<String>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::resource_read(&self.name, e.to_string()))?;
        let manifest = SourceManifest::from_toml(&content).with_source_name(&self.name)?;

        Ok(Some(manifest.files))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Always yields one fixed file name.
#[derive(Debug, Clone)]
pub struct DefaultFileResolver {
    file: String,
}

impl DefaultFileResolver {
    /// Creates a resolver yielding `file`.
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

impl Default for DefaultFileResolver {
    fn default() -> Self {
        Self::new(DEFAULT_FILE)
    }
}

impl SourceResolver for DefaultFileResolver {
    fn resolve(&self) -> ConfigResult<Option<Vec<String>>> {
        Ok(Some(vec![self.file.clone()]))
    }

    fn name(&self) -> &str {
        "default file"
    }
}

/// Tries resolvers in order and returns the first list produced.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn SourceResolver>>,
}

impl ResolverChain {
    /// Creates an empty chain, which never resolves.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the standard chain: [`FILES_VAR`] from the process
    /// environment, then [`MANIFEST_FILE`], then [`DEFAULT_FILE`].
    pub fn standard() -> Self {
        Self::new()
            .with(ListVarResolver::new(FILES_VAR))
            .with(ManifestResolver::new(MANIFEST_FILE))
            .with(DefaultFileResolver::default())
    }

    /// Appends a resolver and returns the updated chain.
    pub fn with(mut self, resolver: impl SourceResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Returns the resolver names in the order they are tried.
    pub fn resolver_names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }
}

impl SourceResolver for ResolverChain {
    fn resolve(&self) -> ConfigResult<Option<Vec<String>>> {
        for resolver in &self.resolvers {
            if let Some(names) = resolver.resolve()? {
                tracing::debug!(resolver = resolver.name(), files = ?names, "resolved sources");
                return Ok(Some(names));
            }
        }
        Ok(None)
    }

    fn name(&self) -> &str {
        "resolver chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use tempfile::TempDir;

    #[test]
    fn test_list_var_resolver() {
        let env = MapEnv::new().with_var(FILES_VAR, "a.properties, b.properties,,");
        let resolver = ListVarResolver::with_env(FILES_VAR, env);

        assert_eq!(
            resolver.resolve().unwrap(),
            Some(vec!["a.properties".to_string(), "b.properties".to_string()])
        );
        assert_eq!(resolver.name(), FILES_VAR);
    }

    #[test]
    fn test_list_var_resolver_absent() {
        let resolver = ListVarResolver::with_env(FILES_VAR, MapEnv::new());
        assert_eq!(resolver.resolve().unwrap(), None);
    }

    #[test]
    fn test_manifest_resolver() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MANIFEST_FILE);
        fs::write(&path, "files = [\"base.properties\", \"site.ini\"]\n").unwrap();

        let resolver = ManifestResolver::new(&path);
        assert_eq!(
            resolver.resolve().unwrap(),
            Some(vec!["base.properties".to_string(), "site.ini".to_string()])
        );
    }

    #[test]
    fn test_manifest_resolver_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = ManifestResolver::new(temp_dir.path().join(MANIFEST_FILE));
        assert_eq!(resolver.resolve().unwrap(), None);
    }

    #[test]
    fn test_manifest_resolver_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MANIFEST_FILE);
        fs::write(&path, "files = [unterminated").unwrap();

        match ManifestResolver::new(&path).resolve() {
            Err(ConfigError::ResourceRead { source_name, .. }) => {
                assert!(source_name.contains(MANIFEST_FILE));
            }
            other => panic!("Expected ResourceRead error, got {other:?}"),
        }
    }

    #[test]
    fn test_manifest_resolver_directory_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MANIFEST_FILE);
        fs::create_dir(&path).unwrap();

        let err = ManifestResolver::new(&path).resolve().unwrap_err();
        assert!(err.is_resource_read());
    }

    #[test]
    fn test_manifest_parsing_and_defaults() {
        let manifest = SourceManifest::from_toml("files = [\"a.properties\"]\n").unwrap();
        assert_eq!(manifest.files, vec!["a.properties"]);

        // A manifest without a list names no files
        assert_eq!(SourceManifest::from_toml("").unwrap(), SourceManifest::default());
    }

    #[test]
    fn test_default_file_resolver() {
        assert_eq!(
            DefaultFileResolver::default().resolve().unwrap(),
            Some(vec![DEFAULT_FILE.to_string()])
        );
    }

    #[test]
    fn test_chain_first_match_wins() {
        let temp_dir = TempDir::new().unwrap();
        let manifest = temp_dir.path().join(MANIFEST_FILE);
        fs::write(&manifest, "files = [\"from-manifest.properties\"]\n").unwrap();

        let chain = ResolverChain::new()
            .with(ListVarResolver::with_env(FILES_VAR, MapEnv::new()))
            .with(ManifestResolver::new(&manifest))
            .with(DefaultFileResolver::default());

        assert_eq!(
            chain.resolve().unwrap(),
            Some(vec!["from-manifest.properties".to_string()])
        );

        let chain = ResolverChain::new()
            .with(ListVarResolver::with_env(
                FILES_VAR,
                MapEnv::new().with_var(FILES_VAR, "from-env.properties"),
            ))
            .with(ManifestResolver::new(&manifest));

        assert_eq!(
            chain.resolve().unwrap(),
            Some(vec!["from-env.properties".to_string()])
        );
    }

    #[test]
    fn test_empty_chain_does_not_resolve() {
        assert_eq!(ResolverChain::new().resolve().unwrap(), None);
    }

    #[test]
    fn test_standard_chain_order() {
        let chain = ResolverChain::standard();
        assert_eq!(
            chain.resolver_names(),
            vec![FILES_VAR, MANIFEST_FILE, "default file"]
        );
    }
}

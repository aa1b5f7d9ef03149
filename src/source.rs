//! Key/value sources merged into a property store.

use crate::error::{ConfigError, ConfigResult, ConfigResultExt};
use crate::parser::{detect_parser_by_extension, SourceParser};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for sources that produce a flat name to raw value map.
pub trait PropertySource: Send + Sync {
    /// Loads the source.
    ///
    /// # Errors
    /// * `ConfigError::SourceNotFound` - The source does not exist; merging skips it
    /// * `ConfigError::ResourceRead` - The source exists but could not be read or parsed
    fn load(&self) -> ConfigResult<HashMap<String, String>>;

    /// Returns a human-readable name for this source.
    fn source_name(&self) -> &str;
}

/// Ordered list of directories searched for bare source names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Creates a search path holding only the working directory.
    pub fn working_dir() -> Self {
        Self {
            dirs: vec![PathBuf::from(".")],
        }
    }

    /// Creates a search path from explicit directories.
    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates the standard search path: the working directory, then the
    /// user's configuration directory when one exists.
    pub fn standard() -> Self {
        let mut search_path = Self::working_dir();
        if let Some(config_dir) = dirs::config_dir() {
            search_path.push(config_dir);
        }
        search_path
    }

    /// Appends a directory to search after the existing ones.
    pub fn push(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    /// Returns the directories in search order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Locates `name`.
    ///
    /// A name with a directory component is used as given. A bare name is
    /// joined to each directory in order and the first existing entry wins.
    /// A directory with the source's name is located too; reading it fails.
    pub fn locate(&self, name: &Path) -> Option<PathBuf> {
        let has_parent = name
            .parent()
            .is_some_and(|parent| !parent.as_os_str().is_empty());

        if has_parent || name.is_absolute() {
            return name.exists().then(|| name.to_path_buf());
        }

        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.exists())
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::working_dir()
    }
}

/// Source backed by a file located through a [`SearchPath`].
pub struct FileSource {
    /// Name as given, possibly bare
    name: PathBuf,
    /// Directories searched for a bare name
    search_path: SearchPath,
    /// Explicit parser; chosen from the extension when absent
    parser: Option<Box<dyn SourceParser>>,
    /// Source name for error reporting
    source_name: String,
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("name", &self.name)
            .field("search_path", &self.search_path)
            .field("parser", &self.parser.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl FileSource {
    /// Creates a file source searched for in the working directory.
    pub fn new<P: AsRef<Path>>(name: P) -> Self {
        Self::with_search_path(name, SearchPath::working_dir())
    }

    /// Creates a file source searched for along `search_path`.
    pub fn with_search_path<P: AsRef<Path>>(name: P, search_path: SearchPath) -> Self {
        let name = name.as_ref().to_path_buf();
        let source_name = name.display().to_string();
        Self {
            name,
            search_path,
            parser: None,
            source_name,
        }
    }

    /// Uses `parser` regardless of the file extension.
    pub fn with_parser(mut self, parser: Box<dyn SourceParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Returns the file name as given.
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// Returns the search path used for bare names.
    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Resolves the file that [`load`](PropertySource::load) would read.
    pub fn locate(&self) -> Option<PathBuf> {
        self.search_path.locate(&self.name)
    }
}

impl PropertySource for FileSource {
    fn load(&self) -> ConfigResult<HashMap<String, String>> {
        let path = self
            .locate()
            .ok_or_else(|| ConfigError::source_not_found(&self.source_name))?;

        let bytes = fs::read(&path)
            .map_err(|e| ConfigError::resource_read(path.display().to_string(), e.to_string()))?;
        let content = decode(bytes);

        let detected;
        let parser = match &self.parser {
            Some(parser) => parser.as_ref(),
            None => {
                detected = detect_parser_by_extension(path.extension().and_then(|e| e.to_str()));
                detected.as_ref()
            }
        };

        parser
            .parse(&content)
            .with_source_name(path.display().to_string())
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }
}

/// Decodes file contents as UTF-8, falling back to ISO-8859-1.
fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        err.into_bytes()
            .into_iter()
            .map(char::from)
            .collect()
    })
}

/// In-memory source holding an explicit mapping.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    name: String,
    data: HashMap<String, String>,
}

impl MapSource {
    /// Creates an empty named source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: HashMap::new(),
        }
    }

    /// Adds an entry and returns the updated source.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Creates a named source from `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PropertySource for MapSource {
    fn load(&self) -> ConfigResult<HashMap<String, String>> {
        Ok(self.data.clone())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

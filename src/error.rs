//! Error types and utilities for property store operations.

use std::fmt;

/// Result type alias for property store operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where a failed property lookup was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOrigin {
    /// The merged property map
    Store,
    /// The external environment value source (`env.` placeholders)
    Environment,
}

impl fmt::Display for LookupOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOrigin::Store => f.write_str("property map"),
            LookupOrigin::Environment => f.write_str("environment"),
        }
    }
}

/// Error types for loading, expanding and formatting properties.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A requested property has no value
    #[error("Property '{name}' not found in {origin}")]
    MissingProperty { name: String, origin: LookupOrigin },

    /// A raw value contains an odd number of unescaped delimiters
    #[error("The value for property '{name}' has unmatched '%': '{value}'")]
    MalformedSubstitution { name: String, value: String },

    /// A property refers back to itself, directly or through a chain
    #[error("Cyclic substitution: {}", .chain.join(" -> "))]
    CyclicSubstitution { chain: Vec<String> },

    /// Positional argument formatting failed
    #[error("Format error: {0}")]
    Format(String),

    /// A located source could not be read or parsed
    #[error("Failed to read {source_name}: {message}")]
    ResourceRead {
        source_name: String,
        message: String,
    },

    /// A source could not be located at any search location
    #[error("Source not found: {source_name}")]
    SourceNotFound { source_name: String },
}

impl ConfigError {
    /// Creates a missing property error for a store lookup.
    pub fn missing_property(name: impl Into<String>) -> Self {
        Self::MissingProperty {
            name: name.into(),
            origin: LookupOrigin::Store,
        }
    }

    /// Creates a missing property error for an environment lookup.
    pub fn missing_env(name: impl Into<String>) -> Self {
        Self::MissingProperty {
            name: name.into(),
            origin: LookupOrigin::Environment,
        }
    }

    /// Creates a malformed substitution error.
    pub fn malformed_substitution(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedSubstitution {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Creates a resource read error with context.
    pub fn resource_read(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResourceRead {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a source not found error.
    pub fn source_not_found(source_name: impl Into<String>) -> Self {
        Self::SourceNotFound {
            source_name: source_name.into(),
        }
    }

    /// Returns true if this error is a missing property, from either origin.
    pub fn is_missing_property(&self) -> bool {
        matches!(self, ConfigError::MissingProperty { .. })
    }

    /// Returns true if this error is an unmatched delimiter.
    pub fn is_malformed_substitution(&self) -> bool {
        matches!(self, ConfigError::MalformedSubstitution { .. })
    }

    /// Returns true if this error is a substitution cycle.
    pub fn is_cyclic_substitution(&self) -> bool {
        matches!(self, ConfigError::CyclicSubstitution { .. })
    }

    /// Returns true if this error came from argument formatting.
    pub fn is_format_error(&self) -> bool {
        matches!(self, ConfigError::Format(_))
    }

    /// Returns true if a located source failed to load.
    pub fn is_resource_read(&self) -> bool {
        matches!(self, ConfigError::ResourceRead { .. })
    }

    /// Returns true if a source could not be located.
    pub fn is_source_not_found(&self) -> bool {
        matches!(self, ConfigError::SourceNotFound { .. })
    }
}

/// Extension trait for adding context to Results.
pub trait ConfigResultExt<T> {
    /// Adds context to a ResourceRead error if the result is an error.
    fn with_context<F>(self, f: F) -> ConfigResult<T>
    where
        F: FnOnce() -> String;

    /// Replaces the source named by a ResourceRead error.
    fn with_source_name(self, source_name: impl Into<String>) -> ConfigResult<T>;
}

impl<T> ConfigResultExt<T> for ConfigResult<T> {
    fn with_context<F>(self, f: F) -> ConfigResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| match err {
            ConfigError::ResourceRead {
                source_name,
                message,
            } => ConfigError::ResourceRead {
                source_name,
                message: format!("{}: {}", f(), message),
            },
            other => other,
        })
    }

    fn with_source_name(self, source_name: impl Into<String>) -> ConfigResult<T> {
        self.map_err(|err| match err {
            ConfigError::ResourceRead { message, .. } => ConfigError::ResourceRead {
                source_name: source_name.into(),
                message,
            },
            other => other,
        })
    }
}

//! Recursive placeholder expansion.
//!
//! A raw value may name other properties between pairs of unescaped `%`
//! characters. Expanding a property replaces every such placeholder with the
//! referenced property's own expanded value:
//!
//! ```text
//! p1=blee
//! p2=p1 value is %p1%.        ->  "p1 value is blee."
//! home=%env.HOME%             ->  value of HOME in the environment source
//! ```
//!
//! Escaped delimiters (`\%`) are left in the text as written, escape
//! character included.

use crate::env::EnvironmentSource;
use crate::error::{ConfigError, ConfigResult};
use crate::format::format_message;
use crate::scanner;
use std::collections::HashMap;

/// The character delimiting a placeholder.
pub const SUBSTITUTION_TOKEN: char = '%';

/// Placeholder prefix selecting the environment source instead of the store.
pub const ENV_PREFIX: &str = "env.";

/// Resolves placeholders against a raw property map and an environment source.
///
/// Nothing is cached: every call re-expands from the raw values.
pub struct Expander<'a> {
    properties: &'a HashMap<String, String>,
    env: &'a dyn EnvironmentSource,
}

impl<'a> Expander<'a> {
    /// Creates an expander over `properties`, resolving `env.` placeholders
    /// through `env`.
    pub fn new(properties: &'a HashMap<String, String>, env: &'a dyn EnvironmentSource) -> Self {
        Self { properties, env }
    }

    /// Expands the property `name`.
    ///
    /// # Errors
    /// * `ConfigError::MissingProperty` - `name` or a name it references is undefined
    /// * `ConfigError::MalformedSubstitution` - a raw value has an unmatched `%`
    /// * `ConfigError::CyclicSubstitution` - a property refers back to itself
    pub fn expand(&self, name: &str) -> ConfigResult<String> {
        let mut chain = Vec::new();
        self.expand_in_chain(name, &mut chain)
    }

    /// Expands `name`, then substitutes `{0}`, `{1}`, ... with `args`.
    pub fn expand_with_args<S: AsRef<str>>(&self, name: &str, args: &[S]) -> ConfigResult<String> {
        let expanded = self.expand(name)?;
        format_message(&expanded, args)
    }

    fn expand_in_chain(&self, name: &str, chain: &mut Vec<String>) -> ConfigResult<String> {
        if chain.iter().any(|visited| visited == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(ConfigError::CyclicSubstitution { chain: cycle });
        }

        let raw = self
            .properties
            .get(name)
            .ok_or_else(|| ConfigError::missing_property(name))?;

        let delimiters = scanner::indices(raw, SUBSTITUTION_TOKEN);
        if delimiters.len() % 2 != 0 {
            return Err(ConfigError::malformed_substitution(name, raw.as_str()));
        }
        if delimiters.is_empty() {
            return Ok(raw.clone());
        }

        chain.push(name.to_string());
        let mut expanded = raw.clone();

        for span in delimiters.chunks_exact(2) {
            let inner = &raw[span[0] + 1..span[1]];
            let value = match inner.strip_prefix(ENV_PREFIX) {
                Some(env_name) => self
                    .env
                    .get_env(env_name)
                    .ok_or_else(|| ConfigError::missing_env(env_name))?,
                None => self.expand_in_chain(inner, chain)?,
            };
            tracing::trace!(property = name, placeholder = inner, "substituting placeholder");

            let token = format!("{SUBSTITUTION_TOKEN}{inner}{SUBSTITUTION_TOKEN}");
            expanded = expanded.replace(&token, &value);
        }

        chain.pop();
        Ok(expanded)
    }
}

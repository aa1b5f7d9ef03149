//! # propstack
//!
//! Layered key/value configuration properties with recursive placeholder
//! expansion.
//!
//! Properties are read from one or more flat key/value sources and merged
//! into a single [`PropertyStore`]. When the same name is defined by several
//! sources, the source merged last wins.
//!
//! ## Placeholders
//!
//! A value may refer to another property by surrounding its name with `%`:
//!
//! ```text
//! p1=blee
//! p2=p1 value is %p1%.
//! ```
//!
//! `get("p2")` returns `"p1 value is blee."`. Substitutions nest to any depth
//! and are resolved on every lookup. A name starting with `env.` is looked up
//! in the environment source instead: `home=%env.HOME%`.
//!
//! A `%` preceded by a backslash is not a delimiter and is returned as
//! written. A value with an unmatched `%` fails with
//! [`ConfigError::MalformedSubstitution`], and a property that refers back to
//! itself fails with [`ConfigError::CyclicSubstitution`].
//!
//! ## Arguments
//!
//! After expansion, `{0}`, `{1}`, ... markers can be filled in per call:
//!
//! ```rust
//! use propstack::{MapSource, PropertyStore};
//!
//! let source = MapSource::new("messages")
//!     .with("msg", "The day is {0} and month is {1}.");
//! let store = PropertyStore::from_sources(&[&source]).unwrap();
//!
//! let text = store.get_with_args("msg", &["Monday", "April"]).unwrap();
//! assert_eq!(text, "The day is Monday and month is April.");
//! ```
//!
//! ## Sources
//!
//! ```rust,no_run
//! use propstack::{FileSource, PropertyStore, SearchPath};
//!
//! let mut search_path = SearchPath::working_dir();
//! search_path.push("/etc/myapp");
//!
//! let base = FileSource::with_search_path("base.properties", search_path.clone());
//! let site = FileSource::with_search_path("site.properties", search_path);
//!
//! let mut store = PropertyStore::new();
//! store.merge(&[&base, &site]).unwrap();
//! ```
//!
//! A source that cannot be found is skipped; a source that is found but
//! cannot be read or parsed aborts the merge. [`PropertyStore::discover`]
//! picks the file list through the strategies in [`discovery`].
//!
//! ## Error Handling
//!
//! ```rust
//! use propstack::{ConfigError, PropertyStore};
//!
//! let store = PropertyStore::new();
//! match store.get("nonexistent") {
//!     Ok(value) => println!("Value: {}", value),
//!     Err(ConfigError::MissingProperty { name, .. }) => println!("'{}' not found", name),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

pub mod discovery;
pub mod env;
pub mod error;
pub mod expander;
pub mod format;
pub mod parser;
pub mod scanner;
pub mod source;
pub mod store;

// Re-export main types for convenience
pub use discovery::{ResolverChain, SourceResolver};
pub use env::{EnvironmentSource, MapEnv, ProcessEnv};
pub use error::{ConfigError, ConfigResult, LookupOrigin};
pub use expander::Expander;
pub use source::{FileSource, MapSource, PropertySource, SearchPath};
pub use store::PropertyStore;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

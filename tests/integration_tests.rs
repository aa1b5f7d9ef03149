//! Integration tests for propstack
//!
//! These tests merge real files from a temporary directory and check lookups
//! through the public store API.

use propstack::discovery::{
    DefaultFileResolver, ListVarResolver, ManifestResolver, ResolverChain, FILES_VAR,
    MANIFEST_FILE,
};
use propstack::{
    ConfigError, FileSource, LookupOrigin, MapEnv, MapSource, PropertySource, PropertyStore,
    SearchPath,
};
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const FILE1: &str = r#"# First file in the list
hostname=betty
com.example.config.arg_test=The month is {0} and the day is {1}.
com.example.config.ENV_TEST=%env.com.example.config.ENV_TEST%
"#;

const FILE2: &str = r#"# Overrides and additions
hostname=wilma
port=1776
msg=The hostname is %hostname% and port is %port%.
"#;

/// Test helper to create a temporary source file
fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write test source file");
    path
}

/// Test helper to set environment variables and clean them up
struct EnvVarGuard {
    vars: Vec<String>,
}

impl EnvVarGuard {
    fn new() -> Self {
        Self { vars: Vec::new() }
    }

    fn set(&mut self, key: &str, value: &str) {
        env::set_var(key, value);
        self.vars.push(key.to_string());
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            env::remove_var(var);
        }
    }
}

#[test]
fn test_single_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let file1 = create_temp_file(&temp_dir, "FILE1.properties", FILE1);

    let env = MapEnv::new().with_var("com.example.config.ENV_TEST", "fred");
    let mut store = PropertyStore::with_env(env);
    store.merge(&[&FileSource::new(&file1)]).unwrap();

    assert!(!store.is_empty());
    assert_eq!(store.get("hostname").unwrap(), "betty");
    assert_eq!(
        store
            .get_with_args("com.example.config.arg_test", &["June", "Monday"])
            .unwrap(),
        "The month is June and the day is Monday."
    );
    assert_eq!(store.get("com.example.config.ENV_TEST").unwrap(), "fred");
}

#[test]
fn test_multiple_files_merge_in_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let file1 = FileSource::new(create_temp_file(&temp_dir, "FILE1.properties", FILE1));
    let file2 = FileSource::new(create_temp_file(&temp_dir, "FILE2.properties", FILE2));

    let mut store = PropertyStore::with_env(MapEnv::new());
    assert_eq!(store.merge(&[&file1, &file2]).unwrap(), 2);

    assert_eq!(store.get("hostname").unwrap(), "wilma");
    assert_eq!(
        store.get("msg").unwrap(),
        "The hostname is wilma and port is 1776."
    );

    // Reversed order: FILE1's hostname wins, FILE2's other names remain
    let mut store = PropertyStore::with_env(MapEnv::new());
    store.merge(&[&file2, &file1]).unwrap();

    assert_eq!(store.get("hostname").unwrap(), "betty");
    assert_eq!(
        store.get("msg").unwrap(),
        "The hostname is betty and port is 1776."
    );
}

#[test]
fn test_keys_are_union_of_sources() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let file1 = FileSource::new(create_temp_file(&temp_dir, "FILE1.properties", FILE1));
    let file2 = FileSource::new(create_temp_file(&temp_dir, "FILE2.properties", FILE2));

    let store = PropertyStore::from_sources(&[&file1, &file2]).unwrap();

    assert_eq!(
        store.keys(),
        vec![
            "com.example.config.ENV_TEST",
            "com.example.config.arg_test",
            "hostname",
            "msg",
            "port",
        ]
    );
}

#[test]
fn test_missing_env_value_fails_lookup() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let file1 = FileSource::new(create_temp_file(&temp_dir, "FILE1.properties", FILE1));

    let mut store = PropertyStore::with_env(MapEnv::new());
    store.merge(&[&file1]).unwrap();

    match store.get("com.example.config.ENV_TEST") {
        Err(ConfigError::MissingProperty { name, origin }) => {
            assert_eq!(name, "com.example.config.ENV_TEST");
            assert_eq!(origin, LookupOrigin::Environment);
        }
        other => panic!("Expected MissingProperty, got {other:?}"),
    }
}

#[test]
fn test_process_environment_placeholder() {
    let mut env_guard = EnvVarGuard::new();
    env_guard.set("PROPSTACK_IT_HOME", "/x");

    let source = MapSource::new("s").with("home", "%env.PROPSTACK_IT_HOME%/data");
    let store = PropertyStore::from_sources(&[&source]).unwrap();

    assert_eq!(store.get("home").unwrap(), "/x/data");
}

#[test]
fn test_missing_and_found_sources_mixed() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    create_temp_file(&temp_dir, "FILE2.properties", FILE2);

    let search_path = SearchPath::from_dirs([temp_dir.path()]);
    let mut store = PropertyStore::with_env(MapEnv::new());
    let merged = store
        .merge_files(["absent.properties", "FILE2.properties"], &search_path)
        .unwrap();

    assert_eq!(merged, 1);
    assert_eq!(store.get("port").unwrap(), "1776");
}

#[test]
fn test_unreadable_source_aborts_merge() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let good = FileSource::new(create_temp_file(&temp_dir, "good.properties", "a=1\n"));
    let bad = FileSource::new(create_temp_file(&temp_dir, "bad.properties", "b=\\u00zz\n"));
    let later = MapSource::new("later").with("c", "3");

    let sources: [&dyn PropertySource; 3] = [&good, &bad, &later];
    let mut store = PropertyStore::new();
    let err = store.merge(&sources).unwrap_err();

    assert!(err.is_resource_read());
    assert!(err.to_string().contains("bad.properties"));
    assert_eq!(store.get("a").unwrap(), "1");
    assert!(!store.contains_key("c"));
}

#[test]
fn test_ini_and_properties_sources_together() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let ini = FileSource::new(create_temp_file(
        &temp_dir,
        "app.ini",
        "[db]\nhost = db.local\nport = 5432\n",
    ));
    let props = FileSource::new(create_temp_file(
        &temp_dir,
        "app.properties",
        "db.url=postgres://%db.host%:%db.port%/app\n",
    ));

    let store = PropertyStore::from_sources(&[&ini, &props]).unwrap();
    assert_eq!(store.get("db.url").unwrap(), "postgres://db.local:5432/app");
}

#[test]
fn test_escaped_percent_from_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    // Two backslashes in the file load as one in the raw value
    let file = FileSource::new(create_temp_file(
        &temp_dir,
        "esc.properties",
        "literal=a\\\\%b\\\\%c\nrate=100\\\\% of %literal%\n",
    ));

    let store = PropertyStore::from_sources(&[&file]).unwrap();

    assert_eq!(store.get_raw("literal").unwrap(), r"a\%b\%c");
    assert_eq!(store.get("literal").unwrap(), r"a\%b\%c");
    assert_eq!(store.get("rate").unwrap(), r"100\% of a\%b\%c");
}

#[test]
fn test_cycle_through_files_is_reported() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let a = FileSource::new(create_temp_file(&temp_dir, "a.properties", "a=%b%\n"));
    let b = FileSource::new(create_temp_file(&temp_dir, "b.properties", "b=%a%\n"));

    let store = PropertyStore::from_sources(&[&a, &b]).unwrap();
    assert!(store.get("a").unwrap_err().is_cyclic_substitution());
}

#[test]
fn test_resolved_from_manifest() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    create_temp_file(&temp_dir, "FILE1.properties", FILE1);
    create_temp_file(&temp_dir, "FILE2.properties", FILE2);
    let manifest = create_temp_file(
        &temp_dir,
        MANIFEST_FILE,
        "files = [\"FILE1.properties\", \"FILE2.properties\"]\n",
    );

    let chain = ResolverChain::new()
        .with(ListVarResolver::with_env(FILES_VAR, MapEnv::new()))
        .with(ManifestResolver::new(&manifest))
        .with(DefaultFileResolver::default());

    let mut store = PropertyStore::with_env(MapEnv::new());
    let merged = store
        .merge_resolved(&chain, &SearchPath::from_dirs([temp_dir.path()]))
        .unwrap();

    assert_eq!(merged, 2);
    assert_eq!(store.get("hostname").unwrap(), "wilma");
}

#[test]
fn test_resolved_default_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let chain = ResolverChain::new().with(DefaultFileResolver::default());
    let search_path = SearchPath::from_dirs([temp_dir.path()]);

    // No default file yet: nothing to merge
    let mut store = PropertyStore::new();
    assert_eq!(store.merge_resolved(&chain, &search_path).unwrap(), 0);
    assert!(store.keys().is_empty());

    create_temp_file(&temp_dir, "config.properties", "hostname=Betty");
    let mut store = PropertyStore::new();
    assert_eq!(store.merge_resolved(&chain, &search_path).unwrap(), 1);
    assert_eq!(store.get("hostname").unwrap(), "Betty");
}

#[test]
fn test_discover_from_files_var() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let file1 = create_temp_file(&temp_dir, "FILE1.properties", FILE1);
    let file2 = create_temp_file(&temp_dir, "FILE2.properties", FILE2);

    let mut env_guard = EnvVarGuard::new();
    env_guard.set(
        FILES_VAR,
        &format!("{},{}", file1.display(), file2.display()),
    );

    let store = PropertyStore::discover().unwrap();
    assert_eq!(store.get("hostname").unwrap(), "wilma");
    assert_eq!(
        store.get("msg").unwrap(),
        "The hostname is wilma and port is 1776."
    );
}

#[test]
fn test_store_shared_read_only_across_threads() {
    let source = MapSource::new("s")
        .with("host", "wilma")
        .with("url", "http://%host%/");
    let store = std::sync::Arc::new(PropertyStore::from_sources(&[&source]).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || store.get("url").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "http://wilma/");
    }
}

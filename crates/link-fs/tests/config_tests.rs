use link_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestConfig {
    tree: Vec<String>,
    concurrency: usize,
}

#[test]
fn test_load_toml() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join(".wtlink.toml");
    fs::write(
        &file_path,
        r#"tree = ["conf"]
concurrency = 8"#,
    )
    .unwrap();

    let store = ConfigStore::new();
    let path = NormalizedPath::new(&file_path);
    let config: TestConfig = store.load(&path).unwrap();

    assert_eq!(config.tree, vec!["conf"]);
    assert_eq!(config.concurrency, 8);
}

#[test]
fn test_load_json() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("config.json");
    fs::write(&file_path, r#"{"tree": ["conf"], "concurrency": 8}"#).unwrap();

    let store = ConfigStore::new();
    let path = NormalizedPath::new(&file_path);
    let config: TestConfig = store.load(&path).unwrap();

    assert_eq!(config.concurrency, 8);
}

#[test]
fn test_load_optional_missing_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("absent.toml"));

    let loaded: Option<TestConfig> = ConfigStore::new().load_optional(&path).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_load_reports_parse_errors_with_path() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("broken.toml");
    fs::write(&file_path, "tree = [").unwrap();

    let path = NormalizedPath::new(&file_path);
    let err = ConfigStore::new().load::<TestConfig>(&path).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("TOML"), "got: {message}");
    assert!(message.contains("broken.toml"), "got: {message}");
}

#[test]
fn test_unsupported_format() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("config.yaml");
    fs::write(&file_path, "tree: []").unwrap();

    let store = ConfigStore::new();
    let path = NormalizedPath::new(&file_path);
    let result: link_fs::Result<TestConfig> = store.load(&path);

    assert!(matches!(
        result,
        Err(link_fs::Error::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_roundtrip_toml() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("config.toml");
    let path = NormalizedPath::new(&file_path);

    let original = TestConfig {
        tree: vec!["conf".into(), ".vscode".into()],
        concurrency: 16,
    };
    let store = ConfigStore::new();

    store.save(&path, &original).unwrap();
    let loaded: TestConfig = store.load(&path).unwrap();

    assert_eq!(original, loaded);
}

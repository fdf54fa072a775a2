//! Persistence round-trip and edge case tests.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::persistence::{ensure_dir, load_json, save_json, save_json_fsync};

#[tokio::test]
async fn test_save_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("test.json");

    let data = serde_json::json!({"key": "value", "count": 3});
    save_json(&file_path, &data).await.unwrap();

    let loaded: serde_json::Value = load_json(&file_path).await.unwrap();
    assert_eq!(loaded, data);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir
        .path()
        .join("deeply")
        .join("nested")
        .join("path")
        .join("test.json");

    let data = serde_json::json!({"key": "value"});

    let result = save_json(&nested_path, &data).await;
    assert!(result.is_ok());
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/config.json");

    let result: Result<serde_json::Value, _> = load_json(&file_path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_ensure_dir_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let new_dir = temp_dir.path().join("new_directory");

    assert!(!new_dir.exists());
    ensure_dir(&new_dir).await.unwrap();
    assert!(new_dir.exists());
    assert!(new_dir.is_dir());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("test_dir");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.exists());
}

#[tokio::test]
async fn test_load_json_with_unknown_fields_is_preserved_as_value() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("extra_fields.json");

    let json = r#"{
        "known_field": "value",
        "unknown_field_1": "value1",
        "unknown_field_2": 12345,
        "nested_unknown": {"key": "value"}
    }"#;
    tokio::fs::write(&file_path, json).await.unwrap();

    let loaded: serde_json::Value = load_json(&file_path).await.unwrap();
    assert_eq!(loaded["unknown_field_2"], 12345);
    assert_eq!(loaded["nested_unknown"]["key"], "value");
}

#[tokio::test]
async fn test_atomic_write_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("atomic.json");

    let data = serde_json::json!({"a": 1});
    save_json(&file_path, &data).await.unwrap();

    let temp_path = file_path.with_extension("json.tmp");
    assert!(!temp_path.exists());
    assert!(file_path.exists());
}

#[tokio::test]
async fn test_fsync_write_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("fsynced.json");

    let data = serde_json::json!({"a": 1});
    save_json_fsync(&file_path, &data).await.unwrap();

    let temp_path = file_path.with_extension("json.tmp");
    assert!(!temp_path.exists());

    let loaded: serde_json::Value = load_json(&file_path).await.unwrap();
    assert_eq!(loaded, data);
}

#[tokio::test]
async fn test_unicode_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("unicode.json");

    let data = serde_json::json!({"label": "🚀 emoji test 日本語 中文"});
    save_json(&file_path, &data).await.unwrap();

    let loaded: serde_json::Value = load_json(&file_path).await.unwrap();
    assert_eq!(loaded["label"], "🚀 emoji test 日本語 中文");
}

//! Integration tests for the logger facade
//!
//! These tests verify:
//! - Namespace filtering through the public API
//! - Value sanitization of logged payloads
//! - Engine reuse across loggers
//! - Transport resolution with failing sinks
//! - File rotation and archive cleanup
//! - Environment configuration loading

use rust_logger_facade::appenders::FileAppender;
use rust_logger_facade::config::{load_config, AppInfo, BaseFields, EnvSource};
use rust_logger_facade::core::{CollectingDiagnostics, LogLevel, LogValue, Record};
use rust_logger_facade::rotate::{RotationConfig, RotationManager};
use rust_logger_facade::sanitize::{prepare, SanitizeOptions};
use rust_logger_facade::transports::{TransportDescriptor, TransportKind, TransportRegistry};
use rust_logger_facade::{is_namespace_enabled, EngineCache, Logger, TransportResolver};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn test_cache() -> Arc<EngineCache> {
    Arc::new(EngineCache::new(
        Record::new(),
        Arc::new(CollectingDiagnostics::new()),
    ))
}

fn read_lines(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("Failed to read log file")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Log line should be JSON"))
        .collect()
}

#[test]
fn test_namespace_filter_semantics() {
    assert!(is_namespace_enabled(Some("anything"), None));
    assert!(is_namespace_enabled(Some("app:http"), Some("app:*")));
    assert!(!is_namespace_enabled(Some("app:db"), Some("app:*,-app:db")));
    assert!(!is_namespace_enabled(Some("app:db"), Some("-app:db,*")));
    assert!(is_namespace_enabled(None, Some("*")));
    assert!(!is_namespace_enabled(None, Some("foo")));
}

#[test]
fn test_filtered_logger_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("filtered.log");

    let appender = FileAppender::new(&log_file).expect("Failed to create appender");
    let logger = Logger::builder()
        .namespace("app:db")
        .appender(appender, LogLevel::Trace)
        .debug("app:*,-app:db")
        .cache(test_cache())
        .build()
        .expect("Failed to build logger");

    logger.fatal("should not appear");
    logger.flush().expect("Failed to flush");

    assert_eq!(fs::read_to_string(&log_file).unwrap_or_default(), "");
}

#[test]
fn test_long_string_is_truncated() {
    let options = SanitizeOptions::default().with_max_string_length(100);
    let long = "a".repeat(150);

    match prepare(&LogValue::from(long.as_str()), &options) {
        LogValue::String(s) => {
            assert_eq!(s.len(), 100 + "...".len());
            assert!(s.starts_with(&"a".repeat(100)));
            assert!(s.ends_with("..."));
        }
        other => panic!("Expected a string, got {:?}", other),
    }
}

#[test]
fn test_logged_payload_is_sanitized() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("sanitized.log");

    let appender = FileAppender::new(&log_file).expect("Failed to create appender");
    let logger = Logger::builder()
        .appender(appender, LogLevel::Info)
        .sanitize(
            SanitizeOptions::default()
                .with_max_string_length(5)
                .with_truncation_marker("~"),
        )
        .cache(test_cache())
        .build()
        .expect("Failed to build logger");

    logger.info((json!({"token": "abcdefghij"}), "message text"));
    logger.flush().expect("Failed to flush");

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["token"], "abcde~");
    assert_eq!(lines[0]["msg"], "messa~");
}

#[tokio::test]
async fn test_identical_configs_construct_one_engine() {
    let cache = test_cache();
    let resolver = TransportResolver::new(
        TransportRegistry::with_defaults(AppInfo::default(), BaseFields::default()),
        Arc::new(CollectingDiagnostics::new()),
    );
    let descriptors = vec![
        TransportDescriptor::new(TransportKind::Pretty, LogLevel::Debug),
        TransportDescriptor::new(TransportKind::Simple, LogLevel::Warn),
    ];

    let first = resolver.resolve(&descriptors).await;
    let second = resolver.resolve(&descriptors).await;

    let a = cache.get_or_create(&first).expect("Failed to build engine");
    let b = cache.get_or_create(&second).expect("Failed to build engine");

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.constructions(), 1);
}

#[tokio::test]
async fn test_unwritable_file_sink_falls_back_to_console() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = temp_dir.path().join("regular-file");
    fs::write(&blocker, b"not a directory").expect("Failed to write blocker");

    let diagnostics = CollectingDiagnostics::new();
    let resolver = TransportResolver::new(
        TransportRegistry::with_defaults(AppInfo::default(), BaseFields::default()),
        Arc::new(diagnostics.clone()),
    );
    let descriptor = TransportDescriptor::new(TransportKind::File, LogLevel::Error)
        .with_option("folder", blocker.join("logs").to_string_lossy().into_owned());

    let config = resolver.resolve(&[descriptor]).await;

    assert_eq!(config.sinks.len(), 1);
    assert_eq!(config.sinks[0].stream_name().as_deref(), Some("simple"));
    assert_eq!(config.global_level, LogLevel::Info);

    let warnings = diagnostics.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Failed to create transport of type \"file\""));
}

#[tokio::test]
async fn test_unknown_transport_is_dropped() {
    let diagnostics = CollectingDiagnostics::new();
    let resolver = TransportResolver::new(
        TransportRegistry::with_defaults(AppInfo::default(), BaseFields::default()),
        Arc::new(diagnostics.clone()),
    );

    let config = resolver
        .resolve(&[
            TransportDescriptor::new(TransportKind::parse("carrier-pigeon"), LogLevel::Info),
            TransportDescriptor::new(TransportKind::Simple, LogLevel::Debug),
        ])
        .await;

    assert_eq!(config.sinks.len(), 1);
    assert_eq!(config.global_level, LogLevel::Debug);
    assert!(diagnostics.warnings()[0].contains("Unknown transport type: \"carrier-pigeon\""));
}

#[tokio::test]
async fn test_rotation_at_max_size() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");
    fs::write(&log_file, vec![b'x'; 2048]).expect("Failed to seed log file");

    let config = RotationConfig {
        log_folder: temp_dir.path().to_path_buf(),
        max_size: 1024,
        max_files: 5,
        compress: false,
    };
    let rotated = RotationManager::new()
        .check_and_rotate(&log_file, &config)
        .await
        .expect("Rotation failed");

    assert!(rotated);
    assert_eq!(fs::metadata(&log_file).expect("Original should exist").len(), 0);

    let archives: Vec<String> = fs::read_dir(temp_dir.path())
        .expect("Failed to list folder")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("app.log.") && name.ends_with('Z'))
        .collect();
    assert_eq!(archives.len(), 1);
    assert_eq!(
        fs::metadata(temp_dir.path().join(&archives[0])).unwrap().len(),
        2048
    );
}

#[tokio::test]
async fn test_cleanup_removes_oldest_archive() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let names = [
        "app.log.2025-01-03T00-00-00-000Z",
        "app.log.2025-01-01T00-00-00-000Z",
        "app.log.2025-01-02T00-00-00-000Z",
    ];
    for name in names {
        fs::write(temp_dir.path().join(name), b"archived").expect("Failed to seed archive");
    }

    let config = RotationConfig {
        log_folder: temp_dir.path().to_path_buf(),
        max_size: 1024,
        max_files: 2,
        compress: false,
    };
    let deleted = RotationManager::new()
        .cleanup_old_archives(temp_dir.path(), &config)
        .await
        .expect("Cleanup failed");

    assert_eq!(deleted, vec![temp_dir.path().join("app.log.2025-01-01T00-00-00-000Z")]);
    assert!(temp_dir.path().join(names[0]).exists());
    assert!(temp_dir.path().join(names[2]).exists());
}

#[test]
fn test_load_config_numbered_transports() {
    let env = EnvSource::from([
        ("TRANSPORT1", "pretty"),
        ("TRANSPORT1_LEVEL", "debug"),
        ("TRANSPORT2", "file"),
        ("TRANSPORT2_LEVEL", "warn"),
        ("TRANSPORT2_FOLDER", "/var/log/app"),
    ]);
    let options = load_config(&env).expect("Config should load");

    assert_eq!(options.transports.len(), 2);
    assert_eq!(options.transports[0].kind, TransportKind::Pretty);
    assert_eq!(options.transports[0].level, LogLevel::Debug);
    assert_eq!(options.transports[1].kind, TransportKind::File);
    assert_eq!(options.transports[1].level, LogLevel::Warn);
    assert_eq!(options.transports[1].options["folder"], "/var/log/app");
}

#[test]
fn test_child_logger_writes_merged_bindings() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("child.log");

    let appender = FileAppender::new(&log_file).expect("Failed to create appender");
    let logger = Logger::builder()
        .namespace("api")
        .appender(appender, LogLevel::Info)
        .cache(test_cache())
        .build()
        .expect("Failed to build logger");

    let child = logger.child(json!({"request_id": "r-1", "region": "eu"}));
    let grandchild = child.child(json!({"region": "us"}));
    grandchild.info(("served %d bytes", 512));
    logger.flush().expect("Failed to flush");

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["namespace"], "api");
    assert_eq!(lines[0]["request_id"], "r-1");
    assert_eq!(lines[0]["region"], "us");
    assert_eq!(lines[0]["msg"], "served 512 bytes");
    assert!(lines[0]["time"].is_i64());
}

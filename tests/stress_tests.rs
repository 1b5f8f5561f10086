//! Stress tests for shared engines and concurrent logging
//!
//! These tests verify:
//! - Concurrent logger creation against one cache stays consistent
//! - Fan-out delivers every record under concurrent load
//! - Runtime debug spec changes are safe while other threads log

use rust_logger_facade::appenders::{ConsoleWriter, FileAppender, SimpleAppender};
use rust_logger_facade::config::EnvSource;
use rust_logger_facade::core::{CollectingDiagnostics, LogLevel, Record};
use rust_logger_facade::{create_logger_with, DebugSpec, EngineCache, EnvContext, Logger};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn test_cache() -> Arc<EngineCache> {
    Arc::new(EngineCache::new(
        Record::new(),
        Arc::new(CollectingDiagnostics::new()),
    ))
}

/// Many threads creating loggers for the same configuration end up sharing
/// one cached engine
#[test]
fn test_concurrent_logger_creation() {
    let cache = test_cache();
    let env = Arc::new(EnvSource::from([
        ("TRANSPORT1", "simple"),
        ("TRANSPORT1_LEVEL", "warn"),
        ("TRANSPORT2", "pretty"),
        ("TRANSPORT2_LEVEL", "error"),
    ]));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let env = Arc::clone(&env);
            thread::spawn(move || {
                let context = EnvContext::new(cache);
                let namespace = format!("worker:{}", i);
                tokio_test::block_on(create_logger_with(Some(&namespace), &env, &context))
                    .expect("Failed to create logger")
            })
        })
        .collect();

    let loggers: Vec<Logger> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();

    assert_eq!(cache.len(), 1);
    assert!(cache.constructions() >= 1);
    let first = loggers[0].engine();
    for logger in &loggers {
        assert!(Arc::ptr_eq(first, logger.engine()));
        assert_eq!(logger.level(), LogLevel::Warn);
    }
}

/// Every record from every thread reaches both sinks of a fan-out engine
#[test]
fn test_fan_out_under_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let all_file = temp_dir.path().join("all.log");
    let errors_file = temp_dir.path().join("errors.log");

    let logger = Arc::new(
        Logger::builder()
            .namespace("load")
            .appender(FileAppender::new(&all_file).expect("appender"), LogLevel::Info)
            .appender(FileAppender::new(&errors_file).expect("appender"), LogLevel::Error)
            .cache(test_cache())
            .build()
            .expect("Failed to build logger"),
    );
    assert!(!logger.engine().is_direct());

    let threads = 8;
    let per_thread = 250;
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..per_thread {
                    if i % 10 == 0 {
                        logger.error(("thread %d error %d", t, i));
                    } else {
                        logger.info(("thread %d message %d", t, i));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    logger.flush().expect("Failed to flush");

    let all = std::fs::read_to_string(&all_file).expect("Failed to read log file");
    let errors = std::fs::read_to_string(&errors_file).expect("Failed to read log file");

    let unique: HashSet<&str> = all.lines().collect();
    assert_eq!(all.lines().count(), threads * per_thread);
    assert_eq!(unique.len(), threads * per_thread);
    assert_eq!(errors.lines().count(), threads * per_thread / 10);

    let metrics = logger.engine().metrics();
    assert_eq!(metrics.failed_count(), 0);
}

/// Toggling the debug spec while other threads log never panics and the
/// final spec is honored
#[test]
fn test_debug_spec_toggle_during_logging() {
    let spec = DebugSpec::new(Some("svc"));
    let logger = Arc::new(
        Logger::builder()
            .namespace("svc")
            .appender(
                SimpleAppender::with_writer(false, ConsoleWriter::buffer()),
                LogLevel::Info,
            )
            .debug_spec(spec.clone())
            .cache(test_cache())
            .build()
            .expect("Failed to build logger"),
    );

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..500 {
                    logger.info(("tick %d", i));
                }
            })
        })
        .collect();

    for i in 0..200 {
        spec.set(Some(if i % 2 == 0 { "-svc" } else { "svc" }));
    }
    spec.set(Some("-svc"));

    for writer in writers {
        writer.join().expect("Thread panicked");
    }
    assert!(!logger.is_level_enabled(LogLevel::Fatal));
}

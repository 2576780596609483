use std::io::Write;

use bithist_core::{BitHistError, ModelConfig};

#[test]
fn test_config_defaults() {
    let config = ModelConfig::default();
    assert_eq!(config.capacity, 32_768);
    assert_eq!(config.throttle_percent, 90);
}

#[test]
fn test_config_load_partial_file() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "capacity = 64").unwrap();
    let config = ModelConfig::load(f.path()).unwrap();
    assert_eq!(config.capacity, 64);
    assert_eq!(config.throttle_percent, 90, "missing keys keep defaults");
}

#[test]
fn test_config_rejects_zero_capacity() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "capacity = 0").unwrap();
    match ModelConfig::load(f.path()) {
        Err(BitHistError::Config(msg)) => assert!(msg.contains("capacity")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_config_rejects_overlarge_throttle() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "throttle_percent = 200").unwrap();
    assert!(ModelConfig::load(f.path()).is_err());
}

#[test]
fn test_config_missing_file_is_io_error() {
    match ModelConfig::load(std::path::Path::new("/nonexistent/bithist.toml")) {
        Err(BitHistError::Io(_)) => {}
        other => panic!("expected i/o error, got {:?}", other),
    }
}

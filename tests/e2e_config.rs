//! E2E tests for persistent configuration
//!
//! Tests config round-trip, defaults, backward compatibility,
//! and how the settings reach a remote.

use std::path::PathBuf;
use std::time::Duration;
use vmremote::config::LIBRARY_DIR_ENV;
use vmremote::discovery::{library_file_name, library_path};
use vmremote::{Remote, RemoteConfig, SettleStrategy};

#[test]
fn test_defaults() {
    let config = RemoteConfig::default();
    assert_eq!(config.poll_interval_ms, vmremote::DEFAULT_POLL_INTERVAL_MS);
    assert_eq!(config.settle_delay_ms, vmremote::DEFAULT_SETTLE_DELAY_MS);
    assert_eq!(config.settle(), SettleStrategy::Fixed(Duration::from_millis(200)));
    assert!(config.library_dir.is_none());
    assert!(!config.refresh_devices_on_connect);
}

#[test]
fn test_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = RemoteConfig {
        library_dir: Some(PathBuf::from(r"D:\VB\Voicemeeter")),
        poll_interval_ms: 25,
        settle_delay_ms: 0,
        refresh_devices_on_connect: true,
    };
    config.save(&path).unwrap();

    let loaded = RemoteConfig::load_from(&path);
    assert_eq!(loaded, config);
    assert_eq!(loaded.settle(), SettleStrategy::Immediate);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "settle_delay_ms": 50 }"#).unwrap();

    let loaded = RemoteConfig::load_from(&path);
    assert_eq!(loaded.settle_delay_ms, 50);
    assert_eq!(loaded.poll_interval_ms, vmremote::DEFAULT_POLL_INTERVAL_MS);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = RemoteConfig::load_from(&dir.path().join("absent.json"));
    assert_eq!(loaded, RemoteConfig::default());
}

#[test]
fn test_remote_uses_configured_settle() {
    let config = RemoteConfig {
        settle_delay_ms: 75,
        ..Default::default()
    };
    let remote = Remote::new(config);
    assert_eq!(
        remote.settle_strategy(),
        SettleStrategy::Fixed(Duration::from_millis(75))
    );
}

#[test]
fn test_configured_library_dir_resolves_dll() {
    let config = RemoteConfig {
        library_dir: Some(PathBuf::from("/opt/voicemeeter")),
        ..Default::default()
    };
    let path = library_path(&config).unwrap();
    assert_eq!(path, PathBuf::from("/opt/voicemeeter").join(library_file_name()));
    assert!(!LIBRARY_DIR_ENV.is_empty());
}

#[test]
fn test_initialise_with_missing_library_stays_unbound() {
    let dir = tempfile::tempdir().unwrap();
    let config = RemoteConfig {
        library_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let remote = Remote::new(config);
    assert!(remote.initialise().is_err());
    assert_eq!(remote.state(), vmremote::ConnectionState::Uninitialised);
}

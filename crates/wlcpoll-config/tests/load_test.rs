#![allow(clippy::unwrap_used)]
// Config file loading against real files in a temp dir.

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use wlcpoll_config::{Config, ConfigError, load_config_from, save_config_to};

const SAMPLE: &str = r#"
[controller]
host = "10.0.0.2"
community_env = "WLC_COMMUNITY"
timeout_secs = 3

[poll]
interval_secs = 30

[storage]
database = "/var/lib/wlcpoll/wifi.db"
"#;

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.controller.host, "10.0.0.2");
    assert_eq!(cfg.controller.port, 161);
    assert_eq!(cfg.controller.timeout_secs, 3);
    assert_eq!(cfg.controller.community_env.as_deref(), Some("WLC_COMMUNITY"));
    assert_eq!(cfg.poll.interval_secs, 30);
    assert!(cfg.poll.groups.is_empty());
    assert_eq!(cfg.storage.database, PathBuf::from("/var/lib/wlcpoll/wifi.db"));
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg, Config::default());
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.controller.host = "wlc.example.net".into();
    cfg.poll.groups = vec![".1.3.6.1.4.1.14179.2.1.4.1.1".into()];
    save_config_to(&path, &cfg).unwrap();

    assert_eq!(load_config_from(&path).unwrap(), cfg);
}

#[test]
fn malformed_file_is_a_figment_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[poll]\ninterval_secs = \"soon\"\n").unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)), "{err:?}");
}

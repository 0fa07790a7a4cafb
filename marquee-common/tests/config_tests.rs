//! Configuration resolution tests
//!
//! Covers file loading, missing-file degradation and the
//! CLI > environment > TOML > default priority order.
//!
//! Tests touching process environment variables are marked #[serial].

use marquee_common::config::{
    resolve_config, resolve_config_with, ConfigOverrides, TomlConfig, ENV_AGGREGATOR_API_KEY,
    ENV_CONFIG_PATH, ENV_PORT,
};
use marquee_common::{Decorations, Error};
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_explicit_file_is_loaded() {
    let file = write_config(
        r#"
        port = 8123

        [upstream]
        aggregator_api_key = "from-file"

        [regions]
        home_countries = ["Japan"]
        home_region = "JP"
        away_region = "US"

        [decorations.genres]
        Western = "🤠"
        "#,
    );

    let overrides = ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = resolve_config_with(&overrides, |_| None).unwrap();

    assert_eq!(config.port, 8123);
    assert_eq!(config.upstream.aggregator_api_key, "from-file");
    assert_eq!(config.regions.home_region, "JP");

    let decorations = Decorations::with_overrides(&config.decorations);
    assert_eq!(decorations.genre_emoji("Western"), "🤠");
}

#[test]
fn test_explicit_missing_file_is_error() {
    let overrides = ConfigOverrides {
        config_path: Some(PathBuf::from("/nonexistent/marquee/marquee.toml")),
        ..Default::default()
    };
    let err = resolve_config_with(&overrides, |_| None).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_priority_cli_over_env_over_file() {
    let file = write_config("port = 8000\n");
    let path = file.path().to_string_lossy().to_string();

    let overrides = ConfigOverrides {
        port: Some(9000),
        ..Default::default()
    };
    let config = resolve_config_with(&overrides, |key| match key {
        ENV_CONFIG_PATH => Some(path.clone()),
        ENV_PORT => Some("8500".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.port, 9000);

    let config = resolve_config_with(&ConfigOverrides::default(), |key| match key {
        ENV_CONFIG_PATH => Some(path.clone()),
        ENV_PORT => Some("8500".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.port, 8500);
}

#[test]
#[serial]
fn test_process_environment_is_read() {
    let file = write_config("");
    std::env::set_var(ENV_CONFIG_PATH, file.path());
    std::env::set_var(ENV_AGGREGATOR_API_KEY, "from-env");

    let config = resolve_config(&ConfigOverrides::default()).unwrap();

    std::env::remove_var(ENV_CONFIG_PATH);
    std::env::remove_var(ENV_AGGREGATOR_API_KEY);

    assert_eq!(config.upstream.aggregator_api_key, "from-env");
    assert_eq!(config.port, TomlConfig::default().port);
}

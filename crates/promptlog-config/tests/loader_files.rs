use promptlog_config::{load_config, ConfigLoader};
use std::time::Duration;

#[test]
fn later_files_override_earlier_ones() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.toml");
    let second = dir.path().join("second.toml");
    std::fs::write(
        &first,
        "[search]\ndebounce_ms = 500\nlimit = 10\n[notifications]\nduration_ms = 1000\n",
    )
    .unwrap();
    std::fs::write(&second, "[search]\nlimit = 40\n").unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_from_file(&first).unwrap();
    loader.load_from_file(&second).unwrap();
    assert_eq!(loader.config_paths().len(), 2);

    let config = loader.build();
    assert_eq!(config.search_debounce(), Duration::from_millis(500));
    assert_eq!(config.search_limit(), 40);
    assert_eq!(config.notification_duration(), Duration::from_millis(1000));
}

#[test]
fn missing_file_is_skipped_but_malformed_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = ConfigLoader::new();
    loader.load_from_file(dir.path().join("absent.toml")).unwrap();
    assert!(loader.config_paths().is_empty());

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[search\nlimit = ").unwrap();
    let err = loader.load_from_file(&broken).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

use aria_changelog::config::Config;
use aria_changelog::github::DEFAULT_API_URL;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let config = Config::load_from(&temp_dir.path().join("config.toml")).expect("defaults");

    assert_eq!(config.llm.model, "gemini-2.5-flash");
    assert!((config.llm.temperature - 0.2).abs() < f64::EPSILON);
    assert_eq!(config.github.api_url, DEFAULT_API_URL);
    assert_eq!(config.auto_generation.interval(), Duration::from_secs(300));
    assert!(config.llm.api_key.is_empty());
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        "[llm]\napi_key = \"file-key\"\nmodel = \"gemini-2.5-pro\"\n\n[auto_generation]\ninterval_seconds = 60\n",
    )
    .expect("write config");

    let config = Config::load_from(&path).expect("valid config");
    assert_eq!(config.llm.api_key, "file-key");
    assert_eq!(config.llm.model, "gemini-2.5-pro");
    assert_eq!(config.llm.timeout_seconds, 60);
    assert_eq!(config.auto_generation.interval_seconds, 60);
    assert_eq!(config.github.timeout_seconds, 30);
}

#[test]
fn test_invalid_toml_is_reported() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[llm\nmodel = ").expect("write config");

    let err = Config::load_from(&path).expect_err("broken toml");
    assert!(err.to_string().contains("Invalid configuration file format"));
}

#[test]
fn test_env_key_overrides_and_is_never_saved() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.apply_env_overrides(|name| (name == "API_KEY").then(|| "env-key".to_string()));
    assert_eq!(config.llm.api_key, "env-key");
    assert!(config.api_key_from_env);

    config.save_to(&path).expect("save");
    let saved = Config::load_from(&path).expect("reload");
    assert!(saved.llm.api_key.is_empty());
}

#[test]
fn test_saving_with_env_key_keeps_file_key() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[llm]\napi_key = \"file-key\"\n").expect("write config");

    let mut config = Config::load_from(&path).expect("valid config");
    config.apply_env_overrides(|name| (name == "GEMINI_API_KEY").then(|| "env-key".to_string()));
    assert_eq!(config.llm.api_key, "env-key");

    config.update(None, Some("gemini-2.5-pro".to_string()), None, None, None, None);
    config.save_to(&path).expect("save");

    let saved = Config::load_from(&path).expect("reload");
    assert_eq!(saved.llm.api_key, "file-key");
    assert_eq!(saved.llm.model, "gemini-2.5-pro");
    assert!(!fs::read_to_string(&path).expect("read").contains("env-key"));
}

#[test]
fn test_first_env_var_wins() {
    let mut config = Config::default();
    config.apply_env_overrides(|name| match name {
        "GEMINI_API_KEY" => Some("gemini".to_string()),
        "API_KEY" => Some("generic".to_string()),
        _ => None,
    });
    assert_eq!(config.llm.api_key, "gemini");
}

#[test]
fn test_update_and_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.update(
        Some("typed-key".to_string()),
        None,
        Some(0.7),
        Some(90),
        Some("https://ghe.example.com/api/v3".to_string()),
        Some(120),
    );
    config.save_to(&path).expect("save");

    let loaded = Config::load_from(&path).expect("reload");
    assert_eq!(loaded.llm.api_key, "typed-key");
    assert_eq!(loaded.llm.model, "gemini-2.5-flash");
    assert_eq!(loaded.llm.timeout(), Duration::from_secs(90));
    assert_eq!(loaded.github.api_url, "https://ghe.example.com/api/v3");
    assert_eq!(loaded.auto_generation.interval_seconds, 120);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_validate_requires_key_and_sane_temperature() {
    let mut config = Config::default();
    assert!(config.validate().is_err());

    config.llm.api_key = "k".to_string();
    config.llm.temperature = 3.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_out_of_range_temperature_blocks_provider() {
    let mut config = Config::default();
    config.llm.api_key = "k".to_string();
    config.llm.temperature = 7.5;

    assert!(config.validate_settings().is_err());
    assert!(aria_changelog::llm::create_provider(&config).is_err());

    config.llm.temperature = 1.0;
    assert!(config.validate_settings().is_ok());
    assert!(aria_changelog::llm::create_provider(&config).is_ok());
}

#[test]
fn test_data_dir_override() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let config = Config {
        data_dir: Some(temp_dir.path().to_path_buf()),
        ..Config::default()
    };
    assert_eq!(config.storage_dir().expect("dir"), temp_dir.path());
}

//! Unit tests for configuration and root folder resolution
//!
//! Tests that manipulate CURRICULUM_ROOT_FOLDER are marked with #[serial]
//! so they do not race on the process environment.

use curriculum_common::config::{
    load_config_from, load_toml_config, write_toml_config, CompiledDefaults, ConfigSource,
    ImportConfig, LoggingConfig, RootFolderInitializer, RootFolderResolver, TomlConfig,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.root_folder.to_string_lossy().contains("curriculum"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new().resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/curriculum-env-root");

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/curriculum-toml-root")),
        ..Default::default()
    };
    let root_folder = RootFolderResolver::new().with_toml_config(toml).resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(root_folder, PathBuf::from("/tmp/curriculum-env-root"));
}

#[test]
#[serial]
fn test_resolver_cli_arg_beats_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/curriculum-env-root");

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(Some(PathBuf::from("/tmp/curriculum-cli-root")))
        .resolve();

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(root_folder, PathBuf::from("/tmp/curriculum-cli-root"));
}

#[test]
#[serial]
fn test_resolver_toml_used_without_env() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/curriculum-toml-root")),
        ..Default::default()
    };
    let root_folder = RootFolderResolver::new().with_toml_config(toml).resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/curriculum-toml-root"));
}

#[test]
fn test_toml_defaults_for_missing_sections() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = \"/data/curriculum\"\n").unwrap();

    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/data/curriculum")));
    assert_eq!(config.logging, LoggingConfig::default());
    assert_eq!(config.import.max_concurrent_jobs, 1);
    assert_eq!(config.import.max_lock_wait_ms, 5000);
}

#[test]
fn test_toml_write_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sub").join("config.toml");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/srv/curriculum")),
        logging: LoggingConfig {
            level: "debug".to_string(),
            file: None,
        },
        import: ImportConfig {
            max_concurrent_jobs: 4,
            max_lock_wait_ms: 1000,
        },
    };
    write_toml_config(&config, &path).unwrap();

    assert_eq!(load_toml_config(&path).unwrap(), config);
}

#[test]
fn test_malformed_toml_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [unterminated").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
fn test_malformed_platform_config_falls_back_with_reason() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [unterminated").unwrap();

    let loaded = load_config_from(Some(&path));

    assert_eq!(loaded.config, TomlConfig::default());
    match loaded.source {
        ConfigSource::Rejected { path: rejected, reason } => {
            assert_eq!(rejected, path);
            assert!(!reason.is_empty());
        }
        other => panic!("expected rejected config, got {:?}", other),
    }
}

#[test]
fn test_config_source_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = \"/data/curriculum\"\n").unwrap();

    let loaded = load_config_from(Some(&path));
    assert_eq!(loaded.source, ConfigSource::File(path.clone()));
    assert_eq!(loaded.config.root_folder, Some(PathBuf::from("/data/curriculum")));

    assert_eq!(load_config_from(None).source, ConfigSource::Defaults);
}

#[test]
fn test_initializer_creates_folder_and_database_path() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("root");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("curriculum.db"));
}

#[test]
fn test_initializer_rejects_file_as_root() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();

    assert!(RootFolderInitializer::new(file).ensure_directory_exists().is_err());
}

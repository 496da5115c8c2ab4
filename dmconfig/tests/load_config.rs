use dmconfig::Config;
use serde_yaml::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn load_creates_config_file_with_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();

    assert_eq!(config.get_http_port(), 3000);
    let written = fs::read_to_string(dir.path().join("config.yaml")).unwrap();
    assert!(written.contains("http_port"));
    assert!(written.contains("timeout_secs"));
}

#[test]
fn load_merges_existing_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.yaml"),
        "host:\n  http_port: 5050\naccounts:\n  spotify:\n    client_id: abc\n",
    )
    .unwrap();

    let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
    assert_eq!(config.get_http_port(), 5050);
    assert_eq!(
        config.get_string(&["accounts", "spotify", "client_id"]),
        Some("abc".to_string())
    );
    assert_eq!(config.get_resolver_timeout_secs().unwrap(), 15);
}

#[test]
fn setters_persist_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_str().unwrap().to_string();

    let config = Config::load_config(&path).unwrap();
    config.set_http_port(6060).unwrap();
    config
        .set_value(&["accounts", "applemusic", "storefront"], Value::String("fr".into()))
        .unwrap();

    let reloaded = Config::load_config(&path).unwrap();
    assert_eq!(reloaded.get_http_port(), 6060);
    assert_eq!(
        reloaded.get_string(&["accounts", "applemusic", "storefront"]),
        Some("fr".to_string())
    );
}

#[test]
fn load_rejects_file_as_directory() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, "x").unwrap();

    assert!(Config::load_config(file.to_str().unwrap()).is_err());
}

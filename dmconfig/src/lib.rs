//! # DMConfig
//!
//! YAML configuration shared by every DisMusic crate. The embedded
//! `dismusic.yaml` holds the defaults; `config.yaml` in the configuration
//! directory overrides them, and `DISMUSIC_CONFIG__SECTION__KEY` variables
//! override both. The merged tree is written back so that a fresh install
//! ends up with a complete, editable file.
//!
//! Provider crates (`dmspotify`, `dmapplemusic`, `dmyoutube`) extend [`Config`]
//! with their own extension traits instead of adding getters here.
//!
//! ## Usage
//!
//! ```no_run
//! use dmconfig::get_config;
//!
//! let cfg = get_config();
//! let timeout = cfg.get_resolver_timeout_secs()?;
//! println!("listening on {}:{} (timeout {}s)", cfg.get_bind_address(), cfg.get_http_port(), timeout);
//!
//! cfg.set_http_port(4000)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{info, warn};

pub mod encryption;

// Valeurs par défaut embarquées dans le binaire
const DEFAULT_CONFIG: &str = include_str!("dismusic.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(
        Config::load_config("").expect("DisMusic configuration directory is unusable")
    );
}

const ENV_CONFIG_DIR: &str = "DISMUSIC_CONFIG";
const ENV_PREFIX: &str = "DISMUSIC_CONFIG__";
const LOCAL_CONFIG_DIR: &str = ".dismusic";

const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_LOG_BUFFER_CAPACITY: usize = 1000;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;
const DEFAULT_RESOLVER_TIMEOUT_SECS: usize = 15;

/// Generates a getter/setter pair for an unsigned value with a default.
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            match self.get_value($path) {
                Ok(Value::Number(n)) => Ok(n.as_u64().map(|v| v as usize).unwrap_or($default)),
                Ok(Value::String(s)) => Ok(s.trim().parse().unwrap_or($default)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: usize) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Generates a getter/setter pair for a boolean value with a default.
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Configuration tree
///
/// The YAML tree lives behind a mutex; every setter writes the whole tree
/// back to `config.yaml`. A configuration built with [`Config::from_yaml_str`]
/// has no backing file and is never written.
///
/// # Examples
///
/// ```no_run
/// use dmconfig::get_config;
///
/// let origins = get_config().get_cors_origins();
/// assert!(!origins.is_empty());
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: Option<String>,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let tree = self.lock().clone();
        Self {
            path: self.path.clone(),
            config_dir: self.config_dir.clone(),
            data: Mutex::new(tree),
        }
    }
}

impl Config {
    fn locate(explicit: &str) -> String {
        if !explicit.is_empty() {
            return explicit.to_string();
        }
        if let Ok(from_env) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, dir = %from_env, "Configuration directory from environment");
            return from_env;
        }
        if Path::new(LOCAL_CONFIG_DIR).exists() {
            return LOCAL_CONFIG_DIR.to_string();
        }
        home_dir()
            .map(|home| home.join(LOCAL_CONFIG_DIR))
            .filter(|dir| dir.exists())
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_else(|| LOCAL_CONFIG_DIR.to_string())
    }

    /// Resolves the configuration directory and makes sure it is writable
    ///
    /// Lookup order: `explicit` when non-empty, `$DISMUSIC_CONFIG`,
    /// `./.dismusic`, `~/.dismusic`. When none exists `./.dismusic` is created.
    pub fn config_dir(explicit: &str) -> Result<String> {
        let dir = Self::locate(explicit);
        let path = Path::new(&dir);
        fs::create_dir_all(path)?;
        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }
        let probe = path.join(".dismusic_probe");
        fs::write(&probe, b"ok")?;
        fs::remove_file(&probe)?;
        Ok(dir)
    }

    /// Defaults, then `config.yaml`, then environment; the result is saved
    pub fn load_config(explicit: &str) -> Result<Self> {
        let config_dir = Self::config_dir(explicit)?;
        let file = Path::new(&config_dir)
            .join("config.yaml")
            .to_string_lossy()
            .into_owned();

        let mut tree: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        match fs::read(&file) {
            Ok(bytes) => {
                let user: Value = serde_yaml::from_slice(&bytes)?;
                merge_into(&mut tree, &user);
                info!(file = %file, "Configuration loaded");
            }
            Err(_) => info!(file = %file, "No config.yaml yet, starting from defaults"),
        }

        let mut tree = lowercase_keys(tree);
        apply_env_overrides(&mut tree, env::vars());

        let config = Config {
            config_dir,
            path: Some(file),
            data: Mutex::new(tree),
        };
        config.save()?;
        Ok(config)
    }

    /// Builds an in-memory configuration: the embedded defaults merged with
    /// `yaml`. Environment overrides are not applied and nothing is saved.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut tree: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if !yaml.trim().is_empty() {
            merge_into(&mut tree, &serde_yaml::from_str(yaml)?);
        }

        Ok(Config {
            config_dir: String::new(),
            path: None,
            data: Mutex::new(lowercase_keys(tree)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Value> {
        // Un panic pendant un set ne laisse jamais l'arbre à moitié écrit
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The directory holding `config.yaml` (empty for in-memory configs).
    pub fn directory(&self) -> &str {
        &self.config_dir
    }

    /// Writes the tree to `config.yaml`; no-op for in-memory configs
    pub fn save(&self) -> Result<()> {
        if let Some(file) = &self.path {
            let yaml = serde_yaml::to_string(&*self.lock())?;
            fs::write(file, yaml)?;
        }
        Ok(())
    }

    /// Stores `value` under `path` (e.g. `&["accounts", "spotify", "market"]`)
    /// and saves. Missing intermediate sections are created.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        insert_at(&mut self.lock(), path, value)?;
        self.save()
    }

    /// Value under `path`; an error when a section or the key is missing
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        lookup_at(&self.lock(), path)
    }

    /// Gets a string value, `None` when missing, empty or not a scalar.
    pub fn get_string(&self, path: &[&str]) -> Option<String> {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Ok(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// `host.http_port`, 3000 when missing or not a valid port
    pub fn get_http_port(&self) -> u16 {
        let port = match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Ok(Value::String(s)) => s.trim().parse::<u16>().ok(),
            Ok(_) => None,
            Err(_) => return DEFAULT_HTTP_PORT,
        };
        port.unwrap_or_else(|| {
            warn!("host.http_port is not a valid port, using {}", DEFAULT_HTTP_PORT);
            DEFAULT_HTTP_PORT
        })
    }

    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "http_port"], Value::Number(Number::from(port)))
    }

    /// Address the HTTP server binds to (`0.0.0.0` by default).
    pub fn get_bind_address(&self) -> String {
        self.get_string(&["host", "bind_address"])
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
    }

    /// Origins allowed by the CORS layer. `"*"` means any origin.
    ///
    /// A single string is accepted as a one-element list.
    pub fn get_cors_origins(&self) -> Vec<String> {
        match self.get_value(&["host", "cors_origins"]) {
            Ok(Value::Sequence(seq)) => seq
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    _ => None,
                })
                .collect(),
            Ok(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
            _ => vec!["*".to_string()],
        }
    }

    impl_usize_config!(
        get_log_cache_size,
        set_log_cache_size,
        &["host", "logger", "buffer_capacity"],
        DEFAULT_LOG_BUFFER_CAPACITY
    );

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    impl_usize_config!(
        get_resolver_timeout_secs,
        set_resolver_timeout_secs,
        &["resolver", "timeout_secs"],
        DEFAULT_RESOLVER_TIMEOUT_SECS
    );

    /// Minimum log level (`TRACE`, `DEBUG`, `INFO`, `WARN`, `ERROR`)
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_uppercase()),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }
}

/// Process-wide configuration, loaded on first use
///
/// # Panics
///
/// On first use, when the configuration directory cannot be created or a
/// YAML file is malformed.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

fn insert_at(tree: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, sections)) = path.split_last() else {
        *tree = value;
        return Ok(());
    };

    let mut node = tree;
    for section in sections {
        let Value::Mapping(map) = node else {
            return Err(anyhow!("{} is not a section", path.join(".")));
        };
        node = map
            .entry(Value::String(section.to_lowercase()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !node.is_mapping() {
            *node = Value::Mapping(Mapping::new());
        }
    }

    match node {
        Value::Mapping(map) => {
            map.insert(Value::String(last.to_lowercase()), value);
            Ok(())
        }
        _ => Err(anyhow!("{} is not a section", path.join("."))),
    }
}

fn lookup_at(tree: &Value, path: &[&str]) -> Result<Value> {
    path.iter()
        .try_fold(tree, |node, key| {
            node.as_mapping()
                .and_then(|map| map.get(Value::String(key.to_lowercase())))
        })
        .cloned()
        .ok_or_else(|| anyhow!("{} is not set", path.join(".")))
}

/// Applies `DISMUSIC_CONFIG__SECTION__KEY=value` overrides; values are parsed as YAML.
fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let key_path = rest
            .split("__")
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();
        if key_path.is_empty() {
            continue;
        }
        let yaml_value =
            serde_yaml::from_str::<Value>(&value).unwrap_or_else(|_| Value::String(value.clone()));
        if let Err(err) = insert_at(config, &key_path, yaml_value) {
            warn!(env_var = %key, "Ignoring config override: {}", err);
        }
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, child)| {
                    let key = match key {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (key, lowercase_keys(child))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// Sections merge key by key; any other `overlay` value replaces the base
fn merge_into(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

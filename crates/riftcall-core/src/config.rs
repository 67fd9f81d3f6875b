// Configuration loading and parsing (settings.toml, credentials.toml).

use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Value shipped in the credentials template; treated the same as no key.
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "OPENAI_MODEL";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub lcu: LcuConfig,
    pub ready_check: ReadyCheckConfig,
    pub llm: LlmConfig,
    pub archive: ArchiveConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire settings.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    lcu: LcuConfig,
    #[serde(default)]
    ready_check: ReadyCheckConfig,
    #[serde(default)]
    llm: LlmConfig,
    #[serde(default)]
    archive: ArchiveConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LcuConfig {
    /// Extra directories searched for the client lockfile, ahead of the
    /// standard install locations.
    pub install_dirs: Vec<PathBuf>,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for LcuConfig {
    fn default() -> Self {
        LcuConfig {
            install_dirs: Vec::new(),
            poll_interval_ms: 2000,
            request_timeout_ms: 5000,
        }
    }
}

impl LcuConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadyCheckConfig {
    pub enabled: bool,
    pub accept_delay_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for ReadyCheckConfig {
    fn default() -> Self {
        ReadyCheckConfig {
            enabled: true,
            accept_delay_secs: 5,
            poll_interval_ms: 1000,
        }
    }
}

impl ReadyCheckConfig {
    pub fn accept_delay(&self) -> Duration {
        Duration::from_secs(self.accept_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_url: String,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            model: "gpt-4o-mini".to_string(),
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            max_tokens: 800,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub sessions_dir: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        ArchiveConfig {
            sessions_dir: PathBuf::from("sessions"),
        }
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub openai_api_key: Option<String>,
}

impl Config {
    /// The API key to use, or a validation error when none is set or the
    /// template placeholder was left in place.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.credentials.openai_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && key != PLACEHOLDER_API_KEY => Ok(key),
            Some(key) if key == PLACEHOLDER_API_KEY => Err(ConfigError::ValidationError {
                field: "credentials.openai_api_key".into(),
                message: format!("placeholder value; set {API_KEY_ENV} or edit credentials.toml"),
            }),
            _ => Err(ConfigError::ValidationError {
                field: "credentials.openai_api_key".into(),
                message: format!("not set; set {API_KEY_ENV} or add it to credentials.toml"),
            }),
        }
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in
    /// production; tests pass a closure.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.credentials.openai_api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.llm.model = model;
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/settings.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults or read the environment; `load_config()` does both.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- settings.toml (required) ---
    let settings_path = config_dir.join("settings.toml");
    let settings_text = read_file(&settings_path)?;
    let settings: SettingsFile =
        toml::from_str(&settings_text).map_err(|e| ConfigError::ParseError {
            path: settings_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        lcu: settings.lcu,
        ready_check: settings.ready_check,
        llm: settings.llm,
        archive: settings.archive,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` from `defaults/`: every default file without a counterpart
/// in `config/` is copied over. `*.example` templates are never copied, and
/// files the user already has are never touched. Returns the seeded paths in
/// file-name order.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, false) => {
            return Err(copy_error(format!(
                "no defaults/ or config/ directory under {}; start riftcall from its install directory",
                base_dir.display()
            )))
        }
        (false, true) => return Ok(Vec::new()),
        (true, _) => {}
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut sources: Vec<PathBuf> = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && !is_template(path))
        .collect();
    sources.sort();

    let mut seeded = Vec::new();
    for source in sources {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if seed_file(&source, &target)? {
            info!("Created {} from defaults", target.display());
            seeded.push(target);
        }
    }
    Ok(seeded)
}

fn is_template(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "example")
}

/// Copy `source` to `target` unless `target` exists. `create_new` makes the
/// existence check and the create one step, so a file created concurrently
/// is left alone.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    let content = std::fs::read(source)
        .map_err(|e| copy_error(format!("cannot read {}: {e}", source.display())))?;
    dest.write_all(&content)
        .map_err(|e| copy_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Loads config relative to the current working directory: copies defaults,
/// reads the files, then applies environment overrides.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    let mut config = load_config_from(&cwd)?;
    config.apply_env_overrides(|name| std::env::var(name).ok());
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let positive: &[(&str, u64)] = &[
        ("lcu.poll_interval_ms", config.lcu.poll_interval_ms),
        ("lcu.request_timeout_ms", config.lcu.request_timeout_ms),
        ("ready_check.poll_interval_ms", config.ready_check.poll_interval_ms),
    ];
    for (name, val) in positive {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "llm.model".into(),
            message: "must not be empty".into(),
        });
    }

    if !config.llm.api_url.starts_with("http://") && !config.llm.api_url.starts_with("https://") {
        return Err(ConfigError::ValidationError {
            field: "llm.api_url".into(),
            message: format!("must be an http(s) URL, got {:?}", config.llm.api_url),
        });
    }

    if config.llm.max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.max_tokens".into(),
            message: "must be > 0".into(),
        });
    }

    if config.archive.sessions_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "archive.sessions_dir".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: the workspace root holding `defaults/`, found by walking up
    /// from wherever `cargo test` was started.
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        cwd.ancestors()
            .find(|dir| dir.join("defaults/settings.toml").exists())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| panic!("Cannot locate defaults/ directory from CWD {:?}", cwd))
    }

    /// Helper: fresh `<tmp>/config` with the default settings.toml copied in.
    fn temp_base(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::copy(
            project_root().join("defaults/settings.toml"),
            tmp.join("config/settings.toml"),
        )
        .unwrap();
        tmp
    }

    fn expect_field(result: Result<Config, ConfigError>, expected: &str) {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, expected),
            Err(other) => panic!("expected ValidationError, got: {other}"),
            Ok(_) => panic!("expected ValidationError for {expected}"),
        }
    }

    #[test]
    fn load_default_settings() {
        let tmp = temp_base("riftcall_config_defaults");
        let config = load_config_from(&tmp).expect("should load default settings");

        assert_eq!(config.lcu.poll_interval(), Duration::from_millis(2000));
        assert!(config.ready_check.enabled);
        assert_eq!(config.ready_check.accept_delay(), Duration::from_secs(5));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!(config.llm.api_url.starts_with("https://"));
        assert_eq!(config.archive.sessions_dir, PathBuf::from("sessions"));
        assert!(config.credentials.openai_api_key.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn empty_settings_fall_back_to_defaults() {
        let tmp = temp_base("riftcall_config_empty");
        fs::write(tmp.join("config/settings.toml"), "").unwrap();
        let config = load_config_from(&tmp).expect("empty settings are valid");
        assert_eq!(config.lcu.poll_interval_ms, 2000);
        assert_eq!(config.ready_check.accept_delay_secs, 5);
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_settings_is_file_not_found() {
        let tmp = std::env::temp_dir().join("riftcall_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        match load_config_from(&tmp) {
            Err(ConfigError::FileNotFound { path }) => assert!(path.ends_with("settings.toml")),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn malformed_settings_is_parse_error() {
        let tmp = temp_base("riftcall_config_malformed");
        fs::write(tmp.join("config/settings.toml"), "[lcu\npoll_interval_ms = ").unwrap();
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ParseError { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let tmp = temp_base("riftcall_config_zero_poll");
        fs::write(tmp.join("config/settings.toml"), "[lcu]\npoll_interval_ms = 0\n").unwrap();
        expect_field(load_config_from(&tmp), "lcu.poll_interval_ms");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_non_http_api_url() {
        let tmp = temp_base("riftcall_config_bad_url");
        fs::write(tmp.join("config/settings.toml"), "[llm]\napi_url = \"ftp://x\"\n").unwrap();
        expect_field(load_config_from(&tmp), "llm.api_url");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn credentials_toml_with_api_key() {
        let tmp = temp_base("riftcall_config_creds");
        fs::write(
            tmp.join("config/credentials.toml"),
            "openai_api_key = \"sk-test-key\"\n",
        )
        .unwrap();
        let config = load_config_from(&tmp).expect("should load with credentials.toml");
        assert_eq!(config.api_key().unwrap(), "sk-test-key");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_or_placeholder_key_is_rejected() {
        let tmp = temp_base("riftcall_config_placeholder");
        let config = load_config_from(&tmp).unwrap();
        assert!(matches!(
            config.api_key(),
            Err(ConfigError::ValidationError { .. })
        ));

        fs::write(
            tmp.join("config/credentials.toml"),
            format!("openai_api_key = \"{PLACEHOLDER_API_KEY}\"\n"),
        )
        .unwrap();
        let config = load_config_from(&tmp).unwrap();
        match config.api_key() {
            Err(ConfigError::ValidationError { message, .. }) => {
                assert!(message.contains("placeholder"))
            }
            other => panic!("expected placeholder rejection, got {other:?}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn env_overrides_win_over_files() {
        let tmp = temp_base("riftcall_config_env");
        fs::write(
            tmp.join("config/credentials.toml"),
            "openai_api_key = \"from-file\"\n",
        )
        .unwrap();
        let mut config = load_config_from(&tmp).unwrap();
        config.apply_env_overrides(|name| match name {
            API_KEY_ENV => Some("from-env".to_string()),
            MODEL_ENV => Some("gpt-4o".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key().unwrap(), "from-env");
        assert_eq!(config.llm.model, "gpt-4o");

        // Blank variables are ignored.
        config.apply_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.llm.model, "gpt-4o");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_and_skips_examples() {
        let tmp = std::env::temp_dir().join("riftcall_config_ensure");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults/settings.toml"), "[lcu]\n").unwrap();
        fs::write(tmp.join("defaults/credentials.toml.example"), "x").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, vec![tmp.join("config/settings.toml")]);
        assert!(!tmp.join("config/credentials.toml.example").exists());

        // Existing files are left alone.
        fs::write(tmp.join("config/settings.toml"), "# edited\n").unwrap();
        assert!(ensure_config_files(&tmp).unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(tmp.join("config/settings.toml")).unwrap(),
            "# edited\n"
        );
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_ignores_subdirectories_and_sorts() {
        let tmp = std::env::temp_dir().join("riftcall_config_seed_order");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults/nested")).unwrap();
        fs::write(tmp.join("defaults/settings.toml"), "").unwrap();
        fs::write(tmp.join("defaults/champions.toml"), "").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(
            copied,
            vec![
                tmp.join("config/champions.toml"),
                tmp.join("config/settings.toml")
            ]
        );
        assert!(!tmp.join("config/nested").exists());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_with_config_only_is_a_noop() {
        let tmp = std::env::temp_dir().join("riftcall_config_seed_noop");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        assert!(ensure_config_files(&tmp).unwrap().is_empty());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_without_any_dirs_fails() {
        let tmp = std::env::temp_dir().join("riftcall_config_nodirs");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        assert!(matches!(
            ensure_config_files(&tmp),
            Err(ConfigError::DefaultsCopyError { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }
}

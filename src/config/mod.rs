mod defaults;
mod io;
mod types;
mod validation;

pub use defaults::*;
pub use io::*;
pub use types::*;
pub use validation::*;

use crate::providers::jitsi::{
    PARAM_EXTERNAL_AUTH_SECRET, PARAM_INTERNAL_AUTH_SECRET, PARAM_SERVICE_URL,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level connector configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    /// State directory for persistent data.
    #[serde(skip)]
    pub state_dir: PathBuf,
}

impl Config {
    /// Load configuration from file, environment, and defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(find_config_file);

        let mut config = match config_path {
            Some(ref p) if p.exists() => {
                info!("Loading config from {}", p.display());
                load_config_file(p)?
            }
            Some(ref p) => anyhow::bail!("Config file '{}' not found", p.display()),
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        };

        config.apply_env_overrides();
        config.state_dir = resolve_state_dir();

        Ok(config)
    }

    /// Write default configuration to a file.
    pub fn write_default(path: &str) -> Result<()> {
        let config = Config::default();
        write_config_file(Path::new(path), &serde_json::to_value(&config)?)
    }

    /// Location of the SQLite settings database.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| self.state_dir.join(DEFAULT_STORE_FILE))
    }

    /// Apply environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("JITSI_CONNECTOR_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(bind) = std::env::var("JITSI_CONNECTOR_BIND") {
            if let Ok(mode) = bind.parse() {
                self.server.bind = mode;
            }
        }

        if let Ok(backend) = std::env::var("JITSI_CONNECTOR_STORE") {
            if let Ok(backend) = backend.parse() {
                self.store.backend = backend;
            }
        }

        if let Ok(token) = std::env::var("JITSI_CONNECTOR_ADMIN_TOKEN") {
            self.apply_admin_token(&token);
        }

        let params = &mut self.providers.jitsi.params;
        for (var, name) in [
            ("JITSI_INTERNAL_AUTH_SECRET", PARAM_INTERNAL_AUTH_SECRET),
            ("JITSI_EXTERNAL_AUTH_SECRET", PARAM_EXTERNAL_AUTH_SECRET),
            ("JITSI_SERVICE_URL", PARAM_SERVICE_URL),
        ] {
            if let Ok(value) = std::env::var(var) {
                params.insert(name.to_string(), value);
            }
        }
    }

    /// Copy with tokens and provider secrets masked, for display.
    pub fn redacted(&self) -> Self {
        const MASK: &str = "********";
        let mut config = self.clone();
        for user in &mut config.auth.users {
            user.token = MASK.to_string();
        }
        for name in [PARAM_INTERNAL_AUTH_SECRET, PARAM_EXTERNAL_AUTH_SECRET] {
            if let Some(value) = config.providers.jitsi.params.get_mut(name) {
                *value = MASK.to_string();
            }
        }
        config
    }

    /// Set the token of the built-in `root` administrator, adding it if absent.
    pub fn apply_admin_token(&mut self, token: &str) {
        match self.auth.users.iter_mut().find(|u| u.user_id == "root") {
            Some(user) => user.token = token.to_string(),
            None => self.auth.users.push(AuthUserConfig {
                user_id: "root".to_string(),
                token: token.to_string(),
                roles: vec![ADMIN_ROLE.to_string()],
            }),
        }
    }
}

/// Find the configuration file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let candidates = ["json", "json5", "yaml", "yml", "toml"]
        .map(|ext| PathBuf::from(format!("{CONFIG_FILE_STEM}.{ext}")));

    for path in &candidates {
        if path.exists() {
            return Some(path.clone());
        }
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(STATE_DIR_NAME).join("config.json");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}

/// Resolve the state directory for persistent data.
fn resolve_state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("JITSI_CONNECTOR_STATE_DIR") {
        return PathBuf::from(dir);
    }

    dirs::home_dir()
        .map(|h| h.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR_NAME))
}

/// Load configuration from a file path.
fn load_config_file(path: &Path) -> Result<Config> {
    let value = read_config_file(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("Invalid configuration in '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
        assert_eq!(config.server.bind, BindMode::Loopback);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert!(config.providers.jitsi.enabled);
        assert!(config.auth.users.is_empty());
    }

    #[test]
    fn load_full_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("jitsi-connector.json");
        fs::write(
            &file,
            r#"{
                "server": { "port": 9000, "bind": "lan" },
                "auth": { "users": [{ "userId": "root", "token": "t0k", "roles": ["administrators"] }] },
                "store": { "backend": "memory" },
                "providers": { "jitsi": {
                    "params": {
                        "internal-auth-secret": "a",
                        "external-auth-secret": "b",
                        "service-url": "https://meet.example.com"
                    },
                    "configuration": { "logEnabled": true }
                } },
                "logging": { "level": "debug", "format": "json" }
            }"#,
        )
        .unwrap();

        let config = load_config_file(&file).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind, BindMode::Lan);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.auth.users[0].is_admin());
        assert_eq!(
            config.providers.jitsi.params.get(PARAM_SERVICE_URL).map(String::as_str),
            Some("https://meet.example.com")
        );
        assert_eq!(
            config.providers.jitsi.configuration.map(|s| s.log_enabled),
            Some(true)
        );
        assert_eq!(config.logging.level, LoggingLevel::Debug);
        assert_eq!(config.logging.format, LoggingFormat::Json);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = Config::load(Some("/nonexistent/jitsi-connector.json"));
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn admin_token_adds_or_replaces_root() {
        let mut config = Config::default();
        config.apply_admin_token("first");
        config.apply_admin_token("second");
        assert_eq!(config.auth.users.len(), 1);
        assert_eq!(config.auth.users[0].token, "second");
        assert!(config.auth.users[0].is_admin());
    }

    #[test]
    fn redacted_masks_secrets_only() {
        let mut config = Config::default();
        config.apply_admin_token("very-secret");
        let params = &mut config.providers.jitsi.params;
        params.insert(PARAM_INTERNAL_AUTH_SECRET.to_string(), "int".to_string());
        params.insert(PARAM_EXTERNAL_AUTH_SECRET.to_string(), "ext".to_string());
        params.insert(PARAM_SERVICE_URL.to_string(), "https://meet.example.com".to_string());

        let shown = serde_json::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("very-secret"));
        assert!(!shown.contains("\"int\""));
        assert!(!shown.contains("\"ext\""));
        assert!(shown.contains("https://meet.example.com"));
        assert_eq!(config.auth.users[0].token, "very-secret");
    }

    #[test]
    fn store_path_defaults_under_state_dir() {
        let mut config = Config::default();
        config.state_dir = PathBuf::from("/var/lib/jitsi");
        assert_eq!(config.store_path(), PathBuf::from("/var/lib/jitsi/settings.db"));

        config.store.path = Some(PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.store_path(), PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn write_default_round_trips() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("out.json");
        Config::write_default(file.to_str().unwrap()).unwrap();
        let config = load_config_file(&file).unwrap();
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
    }
}

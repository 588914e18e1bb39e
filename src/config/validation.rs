use super::{BindMode, Config};
use crate::providers::ProviderConfig;

use anyhow::Result;
use std::collections::HashSet;
use tracing::warn;

/// Validation errors for configuration.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate a configuration object.
pub fn validate_config(config: &Config) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ConfigValidationError {
            path: "server.port".to_string(),
            message: "Port must be greater than 0".to_string(),
        });
    }

    if config.server.bind == BindMode::Custom && config.server.custom_bind_host.is_none() {
        errors.push(ConfigValidationError {
            path: "server.customBindHost".to_string(),
            message: "Custom bind mode requires a host".to_string(),
        });
    }

    let mut tokens = HashSet::new();
    for (i, user) in config.auth.users.iter().enumerate() {
        if user.user_id.trim().is_empty() {
            errors.push(ConfigValidationError {
                path: format!("auth.users[{i}].userId"),
                message: "User id is required".to_string(),
            });
        }
        if user.token.trim().is_empty() {
            errors.push(ConfigValidationError {
                path: format!("auth.users[{i}].token"),
                message: "Token is required".to_string(),
            });
        } else if !tokens.insert(user.token.as_str()) {
            errors.push(ConfigValidationError {
                path: format!("auth.users[{i}].token"),
                message: "Token is already assigned to another user".to_string(),
            });
        }
    }

    if !config.auth.users.iter().any(|u| u.is_admin()) {
        warn!("No administrator configured; the settings endpoint will reject every caller");
    }

    let jitsi = &config.providers.jitsi;
    if jitsi.enabled {
        if let Err(e) = ProviderConfig::from_params(&jitsi.params) {
            errors.push(ConfigValidationError {
                path: "providers.jitsi.params".to_string(),
                message: e.to_string(),
            });
        }
    }

    errors
}

/// Validate configuration and return Result.
pub fn validate_config_object(config: &Config) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::bail!("Configuration validation failed:\n{}", messages.join("\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthUserConfig, ADMIN_ROLE};
    use crate::providers::jitsi::{
        PARAM_EXTERNAL_AUTH_SECRET, PARAM_INTERNAL_AUTH_SECRET, PARAM_SERVICE_URL,
    };

    fn valid_config() -> Config {
        let mut config = Config::default();
        let params = &mut config.providers.jitsi.params;
        params.insert(PARAM_INTERNAL_AUTH_SECRET.to_string(), "a".to_string());
        params.insert(PARAM_EXTERNAL_AUTH_SECRET.to_string(), "b".to_string());
        params.insert(PARAM_SERVICE_URL.to_string(), "https://meet.example.com".to_string());
        config.auth.users.push(AuthUserConfig {
            user_id: "root".to_string(),
            token: "secret".to_string(),
            roles: vec![ADMIN_ROLE.to_string()],
        });
        config
    }

    fn paths(errors: &[ConfigValidationError]) -> Vec<&str> {
        errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_config(&valid_config()).is_empty());
        assert!(validate_config_object(&valid_config()).is_ok());
    }

    #[test]
    fn zero_port_rejected() {
        let mut config = valid_config();
        config.server.port = 0;
        assert_eq!(paths(&validate_config(&config)), vec!["server.port"]);
    }

    #[test]
    fn custom_bind_requires_host() {
        let mut config = valid_config();
        config.server.bind = BindMode::Custom;
        assert_eq!(paths(&validate_config(&config)), vec!["server.customBindHost"]);
    }

    #[test]
    fn blank_jitsi_param_rejected() {
        let mut config = valid_config();
        config
            .providers
            .jitsi
            .params
            .insert(PARAM_SERVICE_URL.to_string(), " ".to_string());
        let errors = validate_config(&config);
        assert_eq!(paths(&errors), vec!["providers.jitsi.params"]);
        assert!(errors[0].message.contains(PARAM_SERVICE_URL));
    }

    #[test]
    fn disabled_provider_skips_param_checks() {
        let mut config = valid_config();
        config.providers.jitsi.enabled = false;
        config.providers.jitsi.params.clear();
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn duplicate_and_empty_tokens_rejected() {
        let mut config = valid_config();
        config.auth.users.push(AuthUserConfig {
            user_id: "john".to_string(),
            token: "secret".to_string(),
            roles: vec![],
        });
        config.auth.users.push(AuthUserConfig {
            user_id: "".to_string(),
            token: "".to_string(),
            roles: vec![],
        });
        assert_eq!(
            paths(&validate_config(&config)),
            vec!["auth.users[1].token", "auth.users[2].userId", "auth.users[2].token"]
        );
    }

    #[test]
    fn error_message_lists_every_problem() {
        let mut config = valid_config();
        config.server.port = 0;
        config.providers.jitsi.params.clear();
        let message = validate_config_object(&config).unwrap_err().to_string();
        assert!(message.contains("server.port"));
        assert!(message.contains("providers.jitsi.params"));
    }
}

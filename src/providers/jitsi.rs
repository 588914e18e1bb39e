//! Jitsi provider: startup parameters and persisted runtime settings.

use super::{CallProvider, ClientSettings, Configurable, ProviderError, Settings};
use crate::store::{Context, Scope, SettingsStore};

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Provider type key.
pub const TYPE: &str = "jitsi";

/// Human-readable provider title.
pub const TITLE: &str = "Jitsi";

/// Provider version reported to clients.
pub const VERSION: &str = "1.0.0";

/// Settings store scope for Jitsi settings.
pub const SETTINGS_SCOPE: &str = "webconferencing.jitsi";

/// Settings store key for Jitsi settings.
pub const SETTINGS_KEY: &str = "jitsi-settings";

pub const PARAM_INTERNAL_AUTH_SECRET: &str = "internal-auth-secret";
pub const PARAM_EXTERNAL_AUTH_SECRET: &str = "external-auth-secret";
pub const PARAM_SERVICE_URL: &str = "service-url";

/// Named startup parameters.
pub type InitParams = HashMap<String, String>;

// ============================================================================
// ProviderConfig
// ============================================================================

/// Fixed infrastructure parameters of the Jitsi deployment.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    internal_auth_secret: String,
    external_auth_secret: String,
    service_url: String,
}

impl ProviderConfig {
    /// Build from named parameters. Values are trimmed; every parameter is
    /// required and must be non-empty.
    pub fn from_params(params: &InitParams) -> Result<Self, ProviderError> {
        Ok(Self {
            internal_auth_secret: required(params, PARAM_INTERNAL_AUTH_SECRET)?,
            external_auth_secret: required(params, PARAM_EXTERNAL_AUTH_SECRET)?,
            service_url: required(params, PARAM_SERVICE_URL)?,
        })
    }

    pub fn internal_auth_secret(&self) -> &str {
        &self.internal_auth_secret
    }

    pub fn external_auth_secret(&self) -> &str {
        &self.external_auth_secret
    }

    /// Base URL of the Jitsi call service.
    pub fn service_url(&self) -> &str {
        &self.service_url
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("internal_auth_secret", &"<redacted>")
            .field("external_auth_secret", &"<redacted>")
            .field("service_url", &self.service_url)
            .finish()
    }
}

fn required(params: &InitParams, name: &str) -> Result<String, ProviderError> {
    match params.get(name).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ProviderError::Configuration(format!(
            "{name} required and should be non empty"
        ))),
    }
}

// ============================================================================
// Persisted settings
// ============================================================================

/// Outcome of reading settings from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistedSettings {
    Found(Settings),
    /// Nothing stored yet.
    Missing,
    /// Something is stored but it could not be used.
    Unreadable,
}

// ============================================================================
// JitsiProvider
// ============================================================================

/// The Jitsi call provider.
pub struct JitsiProvider {
    config: ProviderConfig,
    store: Arc<dyn SettingsStore>,
    scope: Scope,
    settings: RwLock<Settings>,
    /// Held across persist + swap so the store and memory agree.
    update_lock: Mutex<()>,
}

impl JitsiProvider {
    /// Validate `params` and load persisted settings.
    ///
    /// Settings fall back to `default` (or `logEnabled = false`) when nothing
    /// usable is stored. A store failure here is logged, not returned.
    pub fn initialize(
        params: &InitParams,
        store: Arc<dyn SettingsStore>,
        default: Option<Settings>,
    ) -> Result<Self, ProviderError> {
        let config = ProviderConfig::from_params(params)?;
        let scope = Scope::global(SETTINGS_SCOPE);

        let settings = match read_persisted(store.as_ref(), &scope) {
            PersistedSettings::Found(settings) => settings,
            PersistedSettings::Missing | PersistedSettings::Unreadable => {
                default.unwrap_or_default()
            }
        };

        info!(
            service_url = %config.service_url,
            log_enabled = settings.log_enabled,
            "Jitsi provider initialized"
        );

        Ok(Self {
            config,
            store,
            scope,
            settings: RwLock::new(settings),
            update_lock: Mutex::new(()),
        })
    }

    pub fn internal_auth_secret(&self) -> &str {
        self.config.internal_auth_secret()
    }

    pub fn external_auth_secret(&self) -> &str {
        self.config.external_auth_secret()
    }

    pub fn service_url(&self) -> &str {
        self.config.service_url()
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> Settings {
        *self.settings.read()
    }

    /// Persist `settings`, then make them current.
    pub fn update_settings(&self, settings: Settings) -> Result<(), ProviderError> {
        let _guard = self.update_lock.lock();

        let text = serde_json::to_string(&settings.to_json())?;
        self.store
            .set(&Context::Global, &self.scope, SETTINGS_KEY, &text)?;

        *self.settings.write() = settings;
        log_remote_log_enabled(settings);
        Ok(())
    }

    /// Read whatever is currently persisted, without touching the in-memory
    /// settings.
    pub fn load_persisted(&self) -> PersistedSettings {
        read_persisted(self.store.as_ref(), &self.scope)
    }

    pub fn serialize(settings: &Settings) -> serde_json::Value {
        settings.to_json()
    }

    pub fn deserialize(value: &serde_json::Value) -> Settings {
        Settings::from_json(value)
    }
}

impl CallProvider for JitsiProvider {
    fn provider_type(&self) -> &str {
        TYPE
    }

    fn title(&self) -> &str {
        TITLE
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn is_log_enabled(&self) -> bool {
        self.settings().log_enabled
    }

    fn client_settings(&self) -> ClientSettings {
        let settings = self.settings();
        ClientSettings {
            provider_type: TYPE.to_string(),
            supported_types: self.supported_types(),
            title: TITLE.to_string(),
            version: VERSION.to_string(),
            log_enabled: settings.log_enabled,
            url: Some(self.config.service_url.clone()),
            configuration: Some(settings),
        }
    }

    fn configurable(&self) -> Option<&dyn Configurable> {
        Some(self)
    }
}

impl Configurable for JitsiProvider {
    fn settings(&self) -> Settings {
        JitsiProvider::settings(self)
    }

    fn update_settings(&self, settings: Settings) -> Result<(), ProviderError> {
        JitsiProvider::update_settings(self, settings)
    }
}

fn read_persisted(store: &dyn SettingsStore, scope: &Scope) -> PersistedSettings {
    let raw = match store.get(&Context::Global, scope, SETTINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return PersistedSettings::Missing,
        Err(e) => {
            error!("Error reading Jitsi settings: {}", e);
            return PersistedSettings::Unreadable;
        }
    };

    if !raw.starts_with('{') {
        warn!("Cannot parse saved Jitsi settings: {}", raw);
        return PersistedSettings::Unreadable;
    }

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => PersistedSettings::Found(Settings::from_json(&value)),
        Err(e) => {
            error!("Error parsing saved Jitsi settings: {}", e);
            PersistedSettings::Unreadable
        }
    }
}

fn log_remote_log_enabled(settings: Settings) {
    if settings.log_enabled {
        info!("Remote diagnostic log enabled for Jitsi connector");
    } else {
        info!("Remote diagnostic log disabled for Jitsi connector");
    }
}

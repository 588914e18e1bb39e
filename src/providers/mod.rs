//! Call providers and their registry.

pub mod jitsi;
mod settings;

pub use jitsi::{InitParams, JitsiProvider, PersistedSettings, ProviderConfig};
pub use settings::Settings;

use crate::store::StoreError;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("settings store error: {0}")]
    Store(#[from] StoreError),

    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// Types
// ============================================================================

/// Instant-messaging identity a user profile exposes for a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImInfo {
    #[serde(rename = "type")]
    pub im_type: String,
    pub id: String,
}

/// Provider description handed to call clients. Never carries secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub supported_types: Vec<String>,
    pub title: String,
    pub version: String,
    pub log_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Settings>,
}

// ============================================================================
// Traits
// ============================================================================

/// A pluggable call backend registered under a type key.
pub trait CallProvider: Send + Sync {
    fn provider_type(&self) -> &str;

    fn supported_types(&self) -> Vec<String> {
        vec![self.provider_type().to_string()]
    }

    fn title(&self) -> &str;

    fn version(&self) -> &str;

    /// Whether clients should ship diagnostic logs for this provider.
    fn is_log_enabled(&self) -> bool;

    fn im_info(&self, im_id: &str) -> ImInfo {
        ImInfo {
            im_type: self.provider_type().to_string(),
            id: im_id.to_string(),
        }
    }

    fn client_settings(&self) -> ClientSettings;

    /// Runtime settings management, for providers that have any.
    fn configurable(&self) -> Option<&dyn Configurable> {
        None
    }
}

/// Read and replace a provider's runtime [`Settings`].
pub trait Configurable: Send + Sync {
    /// A copy of the current settings.
    fn settings(&self) -> Settings;

    /// Persist `settings`, then make them current. On error the current
    /// settings are left as they were.
    fn update_settings(&self, settings: Settings) -> Result<(), ProviderError>;
}

// ============================================================================
// Registry
// ============================================================================

/// Registered providers, keyed by every type they support.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn CallProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under each of its supported types.
    pub fn register(&self, provider: Arc<dyn CallProvider>) {
        for provider_type in provider.supported_types() {
            info!(
                provider_type = %provider_type,
                title = provider.title(),
                version = provider.version(),
                "Registered call provider"
            );
            self.providers.insert(provider_type, Arc::clone(&provider));
        }
    }

    pub fn get(&self, provider_type: &str) -> Option<Arc<dyn CallProvider>> {
        self.providers
            .get(provider_type)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Client views of all providers, one per registration key.
    pub fn list(&self) -> Vec<ClientSettings> {
        let mut list: Vec<ClientSettings> = self
            .providers
            .iter()
            .map(|entry| entry.value().client_settings())
            .collect();
        list.sort_by(|a, b| a.provider_type.cmp(&b.provider_type));
        list
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

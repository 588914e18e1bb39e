//! Key/value settings storage.
//!
//! Values are opaque strings addressed by a [`Context`], a [`Scope`] and a
//! key. The scope is always passed explicitly on each call.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemorySettingsStore;
pub use sqlite::SqliteSettingsStore;

use std::fmt;

// ============================================================================
// Addressing
// ============================================================================

/// Who a setting belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Context {
    /// Platform-wide settings.
    Global,
}

impl Context {
    /// Stable identifier used as a storage column.
    pub fn id(&self) -> &'static str {
        match self {
            Context::Global => "GLOBAL",
        }
    }
}

/// Namespace a setting lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    id: String,
}

impl Scope {
    /// The global scope narrowed to a named section, e.g. `webconferencing.jitsi`.
    pub fn global(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Stable identifier used as a storage column.
    pub fn key(&self) -> String {
        format!("GLOBAL:{}", self.id)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

// ============================================================================
// Store
// ============================================================================

/// Errors raised by a settings store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// Abstract key/value persistence for provider settings.
///
/// Calls are synchronous and are not retried; a failure is returned to the
/// caller immediately.
pub trait SettingsStore: Send + Sync {
    /// Fetch the raw value, or `None` when nothing is stored under the key.
    fn get(&self, context: &Context, scope: &Scope, key: &str)
        -> Result<Option<String>, StoreError>;

    /// Store `value`, replacing any previous value.
    fn set(&self, context: &Context, scope: &Scope, key: &str, value: &str)
        -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_keys_are_distinct() {
        assert_eq!(Scope::global("webconferencing.jitsi").key(), "GLOBAL:webconferencing.jitsi");
        assert_ne!(
            Scope::global("webconferencing").key(),
            Scope::global("webconferencing.jitsi").key()
        );
    }

    #[test]
    fn context_ids() {
        assert_eq!(Context::Global.id(), "GLOBAL");
    }
}

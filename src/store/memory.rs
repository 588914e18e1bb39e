use dashmap::DashMap;

use super::{Context, Scope, SettingsStore, StoreError};

/// Process-local settings store. Nothing survives a restart.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: DashMap<(String, String, String), String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_key(context: &Context, scope: &Scope, key: &str) -> (String, String, String) {
        (context.id().to_string(), scope.key(), key.to_string())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(
        &self,
        context: &Context,
        scope: &Scope,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        Ok(self
            .values
            .get(&Self::entry_key(context, scope, key))
            .map(|entry| entry.value().clone()))
    }

    fn set(
        &self,
        context: &Context,
        scope: &Scope,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        self.values
            .insert(Self::entry_key(context, scope, key), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_then_set() {
        let store = MemorySettingsStore::new();
        let scope = Scope::global("webconferencing.jitsi");

        assert_eq!(store.get(&Context::Global, &scope, "k").unwrap(), None);
        store.set(&Context::Global, &scope, "k", "v").unwrap();
        assert_eq!(store.get(&Context::Global, &scope, "k").unwrap().as_deref(), Some("v"));
        store.set(&Context::Global, &scope, "k", "w").unwrap();
        assert_eq!(store.get(&Context::Global, &scope, "k").unwrap().as_deref(), Some("w"));
    }
}

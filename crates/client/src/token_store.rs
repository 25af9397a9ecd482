//! In-memory holder of the session credential.

use std::sync::{Arc, PoisonError, RwLock};

/// Process-local credential cell.
///
/// Never persisted: a fresh process starts with no credential. Clones share
/// the same cell, so one store can be handed to the API client and the
/// session controller while tests still build isolated instances.
#[derive(Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the credential (`None` clears it).
    pub fn set(&self, token: Option<String>) {
        // A poisoned cell still holds a valid `Option<String>`.
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = token;
    }

    pub fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.set(None);
    }

    pub fn is_present(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl core::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenStore")
            .field("present", &self.is_present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_empty() {
        assert_eq!(TokenStore::new().get(), None);
    }

    #[test]
    fn clones_share_the_cell() {
        let a = TokenStore::new();
        let b = a.clone();
        a.set(Some("t".to_string()));
        assert_eq!(b.get().as_deref(), Some("t"));
        b.clear();
        assert!(!a.is_present());
    }

    #[test]
    fn separate_instances_are_isolated() {
        let a = TokenStore::new();
        let b = TokenStore::new();
        a.set(Some("t".to_string()));
        assert!(!b.is_present());
    }

    #[test]
    fn debug_does_not_leak_token() {
        let store = TokenStore::new();
        store.set(Some("secret-token".to_string()));
        assert!(!format!("{store:?}").contains("secret-token"));
    }

    proptest! {
        #[test]
        fn get_returns_last_set(values in proptest::collection::vec(proptest::option::of("[a-z0-9]{1,16}"), 1..16)) {
            let store = TokenStore::new();
            for v in &values {
                store.set(v.clone());
            }
            prop_assert_eq!(store.get(), values.last().cloned().flatten());
        }
    }
}

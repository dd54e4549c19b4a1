//! In-memory cache store for testing.

use super::{CacheDocument, CacheStore};
use crate::error::CacheError;
use std::sync::RwLock;

/// In-memory cache store
///
/// Shared between several `ResultCache` instances it behaves like one
/// on-disk document used by separate invocations.
#[derive(Default)]
pub struct InMemoryStore {
    document: RwLock<CacheDocument>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for InMemoryStore {
    fn load(&self) -> Result<CacheDocument, CacheError> {
        let document = self.document.read().map_err(|_| CacheError::Poisoned)?;
        Ok(document.clone())
    }

    fn save(&self, document: &CacheDocument) -> Result<(), CacheError> {
        let mut stored = self.document.write().map_err(|_| CacheError::Poisoned)?;
        *stored = document.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fingerprint::Fingerprint;

    #[test]
    fn new_store_is_empty() {
        let document = InMemoryStore::new().load().unwrap();
        assert!(document.is_empty());
    }

    #[test]
    fn save_replaces_document() {
        let store = InMemoryStore::new();
        let mut document = CacheDocument::default();
        document
            .fingerprints
            .insert("1".to_string(), Fingerprint::from_raw(42));

        store.save(&document).unwrap();

        assert_eq!(store.load().unwrap(), document);
    }
}

//! # Cache Module
//!
//! Persists fingerprints and similarity scores across runs.
//!
//! ## Keys
//! - Fingerprints: xxh3 of the normalized path
//! - Similarities: the two path hashes, smaller first, so (A, B) and
//!   (B, A) reach the same entry
//!
//! Identity is by path: a moved or renamed file is simply a new key.
//!
//! ## Saving
//! Each save reloads the store, merges the batch into it (the batch wins
//! by default) and rewrites the whole document. Separate invocations
//! touching different keys keep each other's entries; two invocations
//! racing on the same keys end with whichever wrote last.
//!
//! ## Backends
//! - `JsonFileStore` - One JSON document on disk
//! - `InMemoryStore` - For testing

mod json;
mod memory;
mod traits;

pub use json::{default_cache_path, JsonFileStore};
pub use memory::InMemoryStore;
pub use traits::CacheStore;

use crate::core::comparator::ScoredPair;
use crate::core::fingerprint::Fingerprint;
use crate::core::scanner::normalize_path;
use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use xxhash_rust::xxh3::xxh3_64;

/// The persisted document: two string-keyed mappings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    /// Path hash -> fingerprint
    #[serde(default)]
    pub fingerprints: BTreeMap<String, Fingerprint>,
    /// "low high" path-hash pair -> similarity score
    #[serde(default)]
    pub similarities: BTreeMap<String, f64>,
}

impl CacheDocument {
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty() && self.similarities.is_empty()
    }
}

/// Stable hash of a normalized path
///
/// Hashes the raw OS bytes, so names that are not valid UTF-8 keep
/// distinct keys.
pub fn path_key(path: &Path) -> u64 {
    let normalized = normalize_path(path).unwrap_or_else(|_| path.to_path_buf());
    xxh3_64(normalized.as_os_str().as_encoded_bytes())
}

/// Order-independent key of an image pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    low: u64,
    high: u64,
}

impl PairKey {
    pub fn new(a: u64, b: u64) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn for_paths(a: &Path, b: &Path) -> Self {
        Self::new(path_key(a), path_key(b))
    }

    pub fn low(&self) -> u64 {
        self.low
    }

    pub fn high(&self) -> u64 {
        self.high
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.low, self.high)
    }
}

/// Which side wins when a batch is merged into the reloaded store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Newly computed entries replace stored ones
    #[default]
    PreferIncoming,
    /// Stored entries are kept; only new keys are added
    PreferStored,
}

impl MergeStrategy {
    fn merge<V>(self, stored: &mut BTreeMap<String, V>, incoming: BTreeMap<String, V>) {
        match self {
            MergeStrategy::PreferIncoming => stored.extend(incoming),
            MergeStrategy::PreferStored => {
                for (key, value) in incoming {
                    stored.entry(key).or_insert(value);
                }
            }
        }
    }
}

/// Memoizes fingerprints and similarity scores on top of a [`CacheStore`]
///
/// Lookups read the snapshot taken at open (or at the last save); saves
/// go through reload-merge-rewrite.
pub struct ResultCache {
    store: Box<dyn CacheStore>,
    snapshot: CacheDocument,
    merge: MergeStrategy,
}

impl ResultCache {
    /// Load the store into a fresh cache
    pub fn open(store: Box<dyn CacheStore>) -> Result<Self, CacheError> {
        let snapshot = store.load()?;
        info!(
            store = %store.describe(),
            fingerprints = snapshot.fingerprints.len(),
            similarities = snapshot.similarities.len(),
            "cache loaded"
        );
        Ok(Self {
            store,
            snapshot,
            merge: MergeStrategy::default(),
        })
    }

    /// Cache with nothing persisted
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(InMemoryStore::new()),
            snapshot: CacheDocument::default(),
            merge: MergeStrategy::default(),
        }
    }

    pub fn with_merge_strategy(mut self, merge: MergeStrategy) -> Self {
        self.merge = merge;
        self
    }

    /// The document as last loaded or saved
    pub fn snapshot(&self) -> &CacheDocument {
        &self.snapshot
    }

    pub fn get_fingerprint(&self, path: &Path) -> Option<Fingerprint> {
        self.snapshot
            .fingerprints
            .get(&path_key(path).to_string())
            .copied()
    }

    pub fn save_fingerprints(&mut self, batch: &[(PathBuf, Fingerprint)]) -> Result<(), CacheError> {
        if batch.is_empty() {
            return Ok(());
        }

        let incoming = batch
            .iter()
            .map(|(path, fingerprint)| (path_key(path).to_string(), *fingerprint))
            .collect();

        let mut document = self.store.load()?;
        self.merge.merge(&mut document.fingerprints, incoming);
        self.store.save(&document)?;
        self.snapshot = document;
        Ok(())
    }

    pub fn get_similarity(&self, a: &Path, b: &Path) -> Option<f64> {
        self.snapshot
            .similarities
            .get(&PairKey::for_paths(a, b).to_string())
            .copied()
    }

    pub fn save_similarities(&mut self, batch: &[ScoredPair]) -> Result<(), CacheError> {
        if batch.is_empty() {
            return Ok(());
        }

        let incoming = batch
            .iter()
            .map(|pair| {
                (
                    PairKey::for_paths(&pair.first, &pair.second).to_string(),
                    pair.score,
                )
            })
            .collect();

        let mut document = self.store.load()?;
        self.merge.merge(&mut document.similarities, incoming);
        self.store.save(&document)?;
        self.snapshot = document;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Lets two caches share one store, like two invocations sharing a file
    struct SharedStore(Arc<InMemoryStore>);

    impl CacheStore for SharedStore {
        fn load(&self) -> Result<CacheDocument, CacheError> {
            self.0.load()
        }

        fn save(&self, document: &CacheDocument) -> Result<(), CacheError> {
            self.0.save(document)
        }

        fn describe(&self) -> String {
            self.0.describe()
        }
    }

    fn shared(store: &Arc<InMemoryStore>) -> ResultCache {
        ResultCache::open(Box::new(SharedStore(store.clone()))).unwrap()
    }

    #[test]
    fn pair_key_is_order_independent() {
        let a = Path::new("/photos/a.jpg");
        let b = Path::new("/photos/b.jpg");

        assert_eq!(PairKey::for_paths(a, b), PairKey::for_paths(b, a));
        let key = PairKey::for_paths(a, b);
        assert!(key.low() < key.high());
    }

    #[test]
    fn pair_key_display_is_low_then_high() {
        assert_eq!(PairKey::new(9, 3).to_string(), "3 9");
    }

    #[test]
    fn path_key_ignores_dot_segments() {
        assert_eq!(
            path_key(Path::new("/photos/./x/../a.jpg")),
            path_key(Path::new("/photos/a.jpg"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_keep_distinct_keys() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let ff = Path::new(OsStr::from_bytes(b"/photos/\xff.jpg"));
        let fe = Path::new(OsStr::from_bytes(b"/photos/\xfe.jpg"));

        assert_ne!(path_key(ff), path_key(fe));
        let key = PairKey::for_paths(ff, fe);
        assert!(key.low() < key.high());

        let mut cache = ResultCache::in_memory();
        cache
            .save_fingerprints(&[(ff.to_path_buf(), Fingerprint::from_raw(1))])
            .unwrap();
        assert_eq!(cache.get_fingerprint(ff), Some(Fingerprint::from_raw(1)));
        assert_eq!(cache.get_fingerprint(fe), None);
    }

    #[test]
    fn fingerprint_miss_is_not_stored() {
        let cache = ResultCache::in_memory();

        assert_eq!(cache.get_fingerprint(Path::new("/a.jpg")), None);
        assert!(cache.snapshot().is_empty());
    }

    #[test]
    fn fingerprint_survives_reload() {
        let store = Arc::new(InMemoryStore::new());
        let fingerprint = Fingerprint::of_thumbnail(b"thumb");

        let mut first_run = shared(&store);
        first_run
            .save_fingerprints(&[(PathBuf::from("/a.jpg"), fingerprint)])
            .unwrap();

        let second_run = shared(&store);
        assert_eq!(
            second_run.get_fingerprint(Path::new("/a.jpg")),
            Some(fingerprint)
        );
    }

    #[test]
    fn similarity_reached_from_both_orders() {
        let mut cache = ResultCache::in_memory();
        cache
            .save_similarities(&[ScoredPair::new("/b.jpg", "/a.jpg", 0.83)])
            .unwrap();

        let forward = cache.get_similarity(Path::new("/a.jpg"), Path::new("/b.jpg"));
        let backward = cache.get_similarity(Path::new("/b.jpg"), Path::new("/a.jpg"));

        assert_eq!(forward, Some(0.83));
        assert_eq!(forward, backward);
    }

    #[test]
    fn stored_keys_are_canonical() {
        let mut cache = ResultCache::in_memory();
        cache
            .save_similarities(&[
                ScoredPair::new("/z.jpg", "/a.jpg", 0.5),
                ScoredPair::new("/a.jpg", "/m.jpg", 0.6),
            ])
            .unwrap();

        for key in cache.snapshot().similarities.keys() {
            let hashes: Vec<u64> = key.split(' ').map(|h| h.parse().unwrap()).collect();
            assert_eq!(hashes.len(), 2);
            assert!(hashes[0] < hashes[1]);
        }
    }

    #[test]
    fn non_overlapping_saves_from_two_invocations_both_survive() {
        let store = Arc::new(InMemoryStore::new());
        let mut run_a = shared(&store);
        let mut run_b = shared(&store);

        run_a
            .save_fingerprints(&[(PathBuf::from("/a.jpg"), Fingerprint::from_raw(1))])
            .unwrap();
        // run_b still holds its stale snapshot, but saving reloads first
        run_b
            .save_fingerprints(&[(PathBuf::from("/b.jpg"), Fingerprint::from_raw(2))])
            .unwrap();

        let after = shared(&store);
        assert_eq!(after.get_fingerprint(Path::new("/a.jpg")), Some(Fingerprint::from_raw(1)));
        assert_eq!(after.get_fingerprint(Path::new("/b.jpg")), Some(Fingerprint::from_raw(2)));
    }

    #[test]
    fn overlapping_saves_keep_last_writer() {
        let store = Arc::new(InMemoryStore::new());
        let mut run_a = shared(&store);
        let mut run_b = shared(&store);
        let pair = |score| [ScoredPair::new("/a.jpg", "/b.jpg", score)];

        run_a.save_similarities(&pair(0.7)).unwrap();
        run_b.save_similarities(&pair(0.9)).unwrap();

        let after = shared(&store);
        assert_eq!(
            after.get_similarity(Path::new("/a.jpg"), Path::new("/b.jpg")),
            Some(0.9)
        );
    }

    #[test]
    fn prefer_stored_keeps_existing_entries() {
        let store = Arc::new(InMemoryStore::new());
        let mut run_a = shared(&store);
        let mut run_b = shared(&store).with_merge_strategy(MergeStrategy::PreferStored);

        run_a
            .save_fingerprints(&[(PathBuf::from("/a.jpg"), Fingerprint::from_raw(1))])
            .unwrap();
        run_b
            .save_fingerprints(&[
                (PathBuf::from("/a.jpg"), Fingerprint::from_raw(5)),
                (PathBuf::from("/c.jpg"), Fingerprint::from_raw(3)),
            ])
            .unwrap();

        assert_eq!(run_b.get_fingerprint(Path::new("/a.jpg")), Some(Fingerprint::from_raw(1)));
        assert_eq!(run_b.get_fingerprint(Path::new("/c.jpg")), Some(Fingerprint::from_raw(3)));
    }

    #[test]
    fn empty_batch_does_not_touch_store() {
        let store = Arc::new(InMemoryStore::new());
        let mut cache = shared(&store);

        cache.save_fingerprints(&[]).unwrap();
        cache.save_similarities(&[]).unwrap();

        assert!(store.load().unwrap().is_empty());
    }
}

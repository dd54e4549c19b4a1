//! Cache store trait definition.

use super::CacheDocument;
use crate::error::CacheError;

/// Whole-document storage behind the result cache
///
/// Stores never merge; they hand out and accept complete documents.
pub trait CacheStore: Send + Sync {
    /// Load the current document; a store that does not exist yet is empty
    fn load(&self) -> Result<CacheDocument, CacheError>;

    /// Replace the stored document
    fn save(&self, document: &CacheDocument) -> Result<(), CacheError>;

    /// Human-readable location for diagnostics
    fn describe(&self) -> String;
}

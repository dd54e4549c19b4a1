//! # Duplicate Image Finder
//!
//! Finds visually duplicate photos in a collection without comparing every
//! pair of images.
//!
//! ## How It Works
//! - **Fingerprint** every image from a tiny two-tone thumbnail
//! - **Bucket** images sharing a fingerprint into candidate clusters
//! - **Verify** each pair inside a cluster with a structural similarity score
//! - **Cache** both fingerprints and scores across runs
//!
//! ## Architecture
//! - `core` - The matching engine (UI-agnostic)
//! - `events` - Progress reporting over channels
//! - `error` - Error types
//!
//! Pixel work is delegated to external tools behind the traits in
//! [`core::tools`], so the engine can run against canned collaborators.

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DuplicateFinderError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG`
/// wins when set; otherwise `verbose` selects `debug` over `warn`.
pub fn init_tracing(verbose: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if verbose {
            "duplicate_image_finder=debug"
        } else {
            "warn"
        })
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}

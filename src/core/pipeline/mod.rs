//! # Pipeline Module
//!
//! Orchestrates the matching workflow.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Expand input paths into image references
//! 2. **Fingerprint** - Pooled batch, cache consulted first
//! 3. **Bucket** - Clusters and candidate pairs (in process, cheap)
//! 4. **Verify** - Pooled batch, cache consulted first
//!
//! ## Parallelism
//! A dedicated rayon pool sized to the hardware. Stage 4 starts only
//! after stage 2 has fully finished and its results are cached.

mod executor;
mod pool;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
pub use pool::{default_workers, WorkerPool};

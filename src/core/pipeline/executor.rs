//! Pipeline execution implementation.

use super::pool::{default_workers, WorkerPool};
use crate::core::cache::ResultCache;
use crate::core::comparator::{
    bucket_by_fingerprint, generate_pairs, CandidateCluster, CandidatePair, ScoredPair,
};
use crate::core::fingerprint::{Fingerprint, FingerprintExtractor, DEFAULT_THUMBNAIL_SIZE};
use crate::core::scanner::{InputExpander, ScanConfig};
use crate::core::tools::Toolkit;
use crate::core::verifier::SimilarityVerifier;
use crate::error::DuplicateFinderError;
use crate::events::{
    null_sender, CompareEvent, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
    StageEvent, StageTracker,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Result of pipeline execution
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// Images that passed the extension filter
    pub files: Vec<PathBuf>,
    /// Fingerprints computed in this run
    pub fingerprints_computed: usize,
    /// Fingerprints served from the cache
    pub fingerprints_cached: usize,
    /// Candidate clusters (size >= 2)
    pub clusters: Vec<CandidateCluster>,
    /// Candidate pairs generated from the clusters
    pub pair_count: usize,
    /// Similarities computed in this run
    pub similarities_computed: usize,
    /// Similarities served from the cache
    pub similarities_cached: usize,
    /// Every candidate pair with its score, in no particular order
    pub scored: Vec<ScoredPair>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Number of distinct images that share a fingerprint with another
    pub fn candidate_images(&self) -> usize {
        self.clusters.iter().map(|c| c.len()).sum()
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Files and directories to examine
    pub paths: Vec<PathBuf>,
    /// Input expansion configuration
    pub scan_config: ScanConfig,
    /// Side of the fingerprint thumbnail
    pub thumbnail_size: u32,
    /// Worker pool size
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            scan_config: ScanConfig::default(),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            workers: default_workers(),
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    cache: Option<ResultCache>,
    tools: Option<Toolkit>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            cache: None,
            tools: None,
        }
    }

    /// Files and directories to examine
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.paths = paths;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Descend into nested directories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.scan_config.recursive = recursive;
        self
    }

    /// Include hidden directory entries
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan_config.include_hidden = include;
        self
    }

    /// Side of the fingerprint thumbnail
    pub fn thumbnail_size(mut self, size: u32) -> Self {
        self.config.thumbnail_size = size;
        self
    }

    /// Worker pool size
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the result cache
    pub fn cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the image collaborators
    pub fn tools(mut self, tools: Toolkit) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Build the pipeline; fails on an unusable worker count
    pub fn build(self) -> Result<Pipeline, DuplicateFinderError> {
        if self.config.thumbnail_size == 0 {
            return Err(DuplicateFinderError::Config(
                "thumbnail size must be at least 1".to_string(),
            ));
        }

        Ok(Pipeline {
            pool: WorkerPool::new(self.config.workers)?,
            config: self.config,
            cache: self.cache.unwrap_or_else(ResultCache::in_memory),
            tools: self.tools.unwrap_or_default(),
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The two-stage matching pipeline
///
/// Fingerprinting and verification each run as one pooled batch with a
/// full barrier in between. The cache is read before each dispatch and
/// written once after each batch, never during it.
pub struct Pipeline {
    config: PipelineConfig,
    cache: ResultCache,
    tools: Toolkit,
    pool: WorkerPool,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Collaborators used by this pipeline, e.g. for the report builder
    pub fn tools(&self) -> &Toolkit {
        &self.tools
    }

    /// The result cache
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Run the pipeline without events
    pub fn run(&mut self) -> Result<PipelineResult, DuplicateFinderError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &mut self,
        events: &EventSender,
    ) -> Result<PipelineResult, DuplicateFinderError> {
        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Scanning
        phase(events, PipelinePhase::Scanning);
        let scanner = InputExpander::new(self.config.scan_config.clone());
        let files = scanner.expand_with_events(&self.config.paths, events)?;
        info!(files = files.len(), "inputs expanded");

        // Phase 2: Fingerprinting
        phase(events, PipelinePhase::Fingerprinting);
        let (fingerprints, fingerprints_computed, fingerprints_cached) =
            self.fingerprint_stage(&files, events)?;

        // Phase 3: Bucketing
        phase(events, PipelinePhase::Bucketing);
        let clusters = bucket_by_fingerprint(&fingerprints);
        let pairs = generate_pairs(&clusters);
        let candidate_images = clusters.iter().map(|c| c.len()).sum();
        events.send(Event::Compare(CompareEvent::Completed {
            clusters: clusters.len(),
            candidate_images,
            pairs: pairs.len(),
        }));
        info!(
            clusters = clusters.len(),
            candidate_images,
            pairs = pairs.len(),
            "candidates bucketed"
        );

        // Phase 4: Verifying
        phase(events, PipelinePhase::Verifying);
        let (scored, similarities_computed, similarities_cached) =
            self.verify_stage(&pairs, events)?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files: files.len(),
                candidate_images,
                scored_pairs: scored.len(),
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            files,
            fingerprints_computed,
            fingerprints_cached,
            pair_count: pairs.len(),
            clusters,
            similarities_computed,
            similarities_cached,
            scored,
            duration_ms,
        })
    }

    /// Returns all fingerprints plus computed and cached counts
    fn fingerprint_stage(
        &mut self,
        files: &[PathBuf],
        events: &EventSender,
    ) -> Result<(Vec<(PathBuf, Fingerprint)>, usize, usize), DuplicateFinderError> {
        let mut outputs = Vec::with_capacity(files.len());
        let mut todo = Vec::new();
        for file in files {
            match self.cache.get_fingerprint(file) {
                Some(fingerprint) => outputs.push((file.clone(), fingerprint)),
                None => todo.push(file.clone()),
            }
        }
        let cached = outputs.len();

        events.send(Event::Fingerprint(StageEvent::Started {
            to_compute: todo.len(),
            cached,
        }));

        let extractor = FingerprintExtractor::new(self.tools.transform.clone())
            .thumbnail_size(self.config.thumbnail_size);
        let tracker = StageTracker::new(events, Event::Fingerprint, todo.len());

        let computed = self.pool.run_batch(&todo, |path| {
            let result = extractor.extract(path)?;
            tracker.task_done(path);
            Ok::<_, DuplicateFinderError>(result)
        })?;

        self.cache.save_fingerprints(&computed)?;
        events.send(Event::Fingerprint(StageEvent::Completed {
            computed: computed.len(),
        }));

        let computed_count = computed.len();
        outputs.extend(computed);
        Ok((outputs, computed_count, cached))
    }

    /// Returns all scored pairs plus computed and cached counts
    fn verify_stage(
        &mut self,
        pairs: &[CandidatePair],
        events: &EventSender,
    ) -> Result<(Vec<ScoredPair>, usize, usize), DuplicateFinderError> {
        let mut outputs = Vec::with_capacity(pairs.len());
        let mut todo = Vec::new();
        for pair in pairs {
            match self.cache.get_similarity(&pair.first, &pair.second) {
                Some(score) => outputs.push(ScoredPair::new(
                    pair.first.clone(),
                    pair.second.clone(),
                    score,
                )),
                None => todo.push(pair.clone()),
            }
        }
        let cached = outputs.len();

        events.send(Event::Verify(StageEvent::Started {
            to_compute: todo.len(),
            cached,
        }));

        let verifier = SimilarityVerifier::new(&self.tools);
        let tracker = StageTracker::new(events, Event::Verify, todo.len());

        let computed = self.pool.run_batch(&todo, |pair| {
            let scored = verifier.verify(pair)?;
            tracker.task_done(&pair.first);
            Ok::<_, DuplicateFinderError>(scored)
        })?;

        self.cache.save_similarities(&computed)?;
        events.send(Event::Verify(StageEvent::Completed {
            computed: computed.len(),
        }));

        let computed_count = computed.len();
        outputs.extend(computed);
        Ok((outputs, computed_count, cached))
    }
}

fn phase(events: &EventSender, phase: PipelinePhase) {
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tools::CannedToolkit;
    use std::fs::File;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn builder_rejects_zero_workers() {
        let result = Pipeline::builder().workers(0).build();
        assert!(matches!(result, Err(DuplicateFinderError::Config(_))));
    }

    #[test]
    fn builder_rejects_zero_thumbnail() {
        let result = Pipeline::builder().thumbnail_size(0).build();
        assert!(matches!(result, Err(DuplicateFinderError::Config(_))));
    }

    #[test]
    fn empty_directory_yields_empty_result() {
        let temp_dir = TempDir::new().unwrap();
        let tools = Arc::new(CannedToolkit::new());

        let mut pipeline = Pipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .tools(Toolkit::canned(tools.clone()))
            .workers(2)
            .build()
            .unwrap();

        let result = pipeline.run().unwrap();

        assert!(result.files.is_empty());
        assert!(result.clusters.is_empty());
        assert!(result.scored.is_empty());
        assert_eq!(tools.transform_calls(), 0);
    }

    #[test]
    fn second_run_is_served_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let a = touch(&temp_dir, "a.jpg");
        let b = touch(&temp_dir, "b.jpg");
        let tools = Arc::new(
            CannedToolkit::new()
                .with_thumbnail(&a, b"same")
                .with_thumbnail(&b, b"same")
                .with_score(&a, 0.97)
                .with_score(&b, 0.97),
        );

        let mut pipeline = Pipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .tools(Toolkit::canned(tools.clone()))
            .workers(2)
            .build()
            .unwrap();

        let first = pipeline.run().unwrap();
        assert_eq!(first.fingerprints_computed, 2);
        assert_eq!(first.similarities_computed, 1);

        let second = pipeline.run().unwrap();
        assert_eq!(second.fingerprints_computed, 0);
        assert_eq!(second.fingerprints_cached, 2);
        assert_eq!(second.similarities_computed, 0);
        assert_eq!(second.similarities_cached, 1);
        assert_eq!(second.scored[0].score, 0.97);

        assert_eq!(tools.transform_calls(), 2);
        assert_eq!(tools.metric_calls(), 1);
    }

    #[test]
    fn fingerprint_failure_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        let a = touch(&temp_dir, "a.jpg");
        touch(&temp_dir, "broken.jpg");
        let tools = Arc::new(CannedToolkit::new().with_thumbnail(&a, b"x"));

        let mut pipeline = Pipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .tools(Toolkit::canned(tools))
            .workers(2)
            .build()
            .unwrap();

        let result = pipeline.run();

        assert!(matches!(result, Err(DuplicateFinderError::Tool(_))));
        // Nothing from the failed batch reaches the cache
        assert!(pipeline.cache().snapshot().fingerprints.is_empty());
    }
}

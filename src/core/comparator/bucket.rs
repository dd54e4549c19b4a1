//! Groups images into candidate clusters by fingerprint equality.

use super::CandidateCluster;
use crate::core::fingerprint::Fingerprint;
use std::collections::HashMap;
use std::path::PathBuf;

/// Cluster images whose fingerprints are equal.
///
/// Fingerprints seen once are dropped, so every cluster has at least two
/// members and each image lands in at most one cluster. The fingerprint
/// value itself is not exposed.
pub fn bucket_by_fingerprint(fingerprints: &[(PathBuf, Fingerprint)]) -> Vec<CandidateCluster> {
    let mut buckets: HashMap<Fingerprint, Vec<PathBuf>> = HashMap::new();
    for (path, fingerprint) in fingerprints {
        buckets.entry(*fingerprint).or_default().push(path.clone());
    }

    let mut clusters: Vec<CandidateCluster> = buckets
        .into_values()
        .filter(|members| members.len() >= 2)
        .map(|mut members| {
            // Sort by path for deterministic ordering
            members.sort();
            members.dedup();
            CandidateCluster { members }
        })
        .filter(|cluster| cluster.len() >= 2)
        .collect();

    clusters.sort_by(|a, b| a.members.cmp(&b.members));
    clusters
}

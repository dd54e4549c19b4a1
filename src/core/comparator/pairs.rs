//! Expands candidate clusters into candidate pairs.

use super::{CandidateCluster, CandidatePair};

/// All unordered pairs of distinct members within each cluster.
///
/// No pair ever spans two clusters.
pub fn generate_pairs(clusters: &[CandidateCluster]) -> Vec<CandidatePair> {
    let mut pairs = Vec::with_capacity(clusters.iter().map(|c| c.pair_count()).sum());

    for cluster in clusters {
        let members = cluster.members();
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                pairs.push(CandidatePair::new(members[i].clone(), members[j].clone()));
            }
        }
    }

    pairs
}

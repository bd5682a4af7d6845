//! Evidence retrieval: rank, cluster, deduplicate.
//!
//! The evidence pool for a document set can be far larger than the chat
//! model's context. Selection narrows it in two steps: cosine ranking
//! against the question keeps the top-K (the evidence budget), then a
//! centroid clustering pass collapses near-duplicate chunks (the same
//! table reached through two chunkings, restated passages) down to one
//! representative per cluster while preserving topical coverage.
//!
//! Budget, cluster count, iteration cap, and the optional projection
//! dimension are all configuration; nothing here assumes a library
//! default.

use crate::config::PipelineConfig;
use crate::types::EvidenceChunk;

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Deterministic sign for the random-projection matrix.
fn projection_sign(row: usize, col: usize) -> f32 {
    let mut x = (row as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(col as u64 + 1);
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    if x & 1 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Project a vector to `dim` dimensions with a fixed sign matrix.
///
/// The matrix is a pure function of the indices, so the projection is
/// stable across runs and processes.
pub fn project(vector: &[f32], dim: usize) -> Vec<f32> {
    let scale = (vector.len() as f32).sqrt();
    (0..dim)
        .map(|col| {
            vector
                .iter()
                .enumerate()
                .map(|(row, value)| value * projection_sign(row, col))
                .sum::<f32>()
                / scale
        })
        .collect()
}

fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return vector.to_vec();
    }
    vector.iter().map(|x| x / norm).collect()
}

/// Spherical k-means assignment over unit vectors.
///
/// Centroids are seeded from the first `k` vectors (the ranking's top
/// chunks), so the pass is deterministic. Returns the cluster index for
/// each input vector.
pub fn kmeans_assign(vectors: &[Vec<f32>], k: usize, iters: usize) -> Vec<usize> {
    assert!(k >= 1 && vectors.len() >= k);

    let unit: Vec<Vec<f32>> = vectors.iter().map(|v| normalize(v)).collect();
    let mut centroids: Vec<Vec<f32>> = unit[..k].to_vec();
    let mut assignment = vec![0usize; unit.len()];

    for _ in 0..iters {
        let mut changed = false;
        for (i, vector) in unit.iter().enumerate() {
            let mut best = 0;
            let mut best_dot = f32::NEG_INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let dot: f32 = vector.iter().zip(centroid).map(|(x, y)| x * y).sum();
                if dot > best_dot {
                    best_dot = dot;
                    best = c;
                }
            }
            if assignment[i] != best {
                assignment[i] = best;
                changed = true;
            }
        }

        for (c, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<&Vec<f32>> = unit
                .iter()
                .zip(&assignment)
                .filter(|(_, a)| **a == c)
                .map(|(v, _)| v)
                .collect();
            if members.is_empty() {
                continue; // keep the previous centroid
            }
            let dim = members[0].len();
            let mut mean = vec![0.0f32; dim];
            for member in &members {
                for (m, value) in mean.iter_mut().zip(member.iter()) {
                    *m += value;
                }
            }
            for value in &mut mean {
                *value /= members.len() as f32;
            }
            *centroid = normalize(&mean);
        }

        if !changed {
            break;
        }
    }
    assignment
}

/// Select the evidence subset handed to the answer prompt.
///
/// Chunks must already be embedded. Returns representatives in
/// similarity-descending order. An empty pool yields an empty selection;
/// a pool no larger than the cluster count skips clustering and returns
/// the full ranking.
pub fn select_evidence(
    question_embedding: &[f32],
    chunks: Vec<EvidenceChunk>,
    budget: usize,
    config: &PipelineConfig,
) -> Vec<EvidenceChunk> {
    if chunks.is_empty() || budget == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f32, EvidenceChunk)> = chunks
        .into_iter()
        .map(|chunk| {
            let score = cosine_similarity(question_embedding, &chunk.embedding);
            (score, chunk)
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(budget);

    if config.cluster_count == 0 || scored.len() <= config.cluster_count {
        return scored.into_iter().map(|(_, chunk)| chunk).collect();
    }

    let vectors: Vec<Vec<f32>> = scored
        .iter()
        .map(|(_, chunk)| match config.reduce_dim {
            Some(dim) if dim < chunk.embedding.len() => project(&chunk.embedding, dim),
            _ => chunk.embedding.clone(),
        })
        .collect();

    let assignment = kmeans_assign(&vectors, config.cluster_count, config.kmeans_iters);

    // The list is similarity-descending, so the first chunk seen per
    // cluster is that cluster's most question-similar representative.
    let mut seen = vec![false; config.cluster_count];
    let mut representatives = Vec::with_capacity(config.cluster_count);
    for ((_, chunk), cluster) in scored.into_iter().zip(assignment) {
        if !seen[cluster] {
            seen[cluster] = true;
            representatives.push(chunk);
        }
    }
    representatives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EvidenceKind;

    fn chunk(id: &str, content: &str, embedding: Vec<f32>) -> EvidenceChunk {
        let mut c = EvidenceChunk::new(id, EvidenceKind::Text, content);
        c.embedding = embedding;
        c
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_pool_selects_nothing() {
        let selected = select_evidence(&[1.0, 0.0], Vec::new(), 75, &PipelineConfig::default());
        assert!(selected.is_empty());
    }

    #[test]
    fn test_small_pool_skips_clustering_and_ranks() {
        let config = PipelineConfig::default();
        let chunks = vec![
            chunk("a", "far", vec![0.0, 1.0]),
            chunk("b", "near", vec![1.0, 0.0]),
            chunk("c", "mid", vec![0.7, 0.7]),
        ];
        let selected = select_evidence(&[1.0, 0.0], chunks, 75, &config);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].content, "near");
        assert_eq!(selected[1].content, "mid");
        assert_eq!(selected[2].content, "far");
    }

    #[test]
    fn test_budget_truncates_ranking() {
        let config = PipelineConfig::new().with_cluster_count(10);
        let chunks = vec![
            chunk("a", "far", vec![0.0, 1.0]),
            chunk("b", "near", vec![1.0, 0.0]),
            chunk("c", "mid", vec![0.7, 0.7]),
        ];
        let selected = select_evidence(&[1.0, 0.0], chunks, 2, &config);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].content, "near");
        assert_eq!(selected[1].content, "mid");
    }

    #[test]
    fn test_budget_increase_is_monotone_when_clustering_skipped() {
        let config = PipelineConfig::new().with_cluster_count(10);
        let pool = || {
            vec![
                chunk("a", "one", vec![1.0, 0.0]),
                chunk("b", "two", vec![0.9, 0.1]),
                chunk("c", "three", vec![0.5, 0.5]),
                chunk("d", "four", vec![0.0, 1.0]),
            ]
        };
        let small = select_evidence(&[1.0, 0.0], pool(), 2, &config);
        let large = select_evidence(&[1.0, 0.0], pool(), 3, &config);
        for kept in &small {
            assert!(large.iter().any(|c| c.content == kept.content));
        }
    }

    #[test]
    fn test_identical_chunks_deduplicate_to_one() {
        let config = PipelineConfig::new().with_cluster_count(1);
        let chunks = vec![
            chunk("doc-a", "same table", vec![1.0, 0.0, 0.0]),
            chunk("doc-b", "same table", vec![1.0, 0.0, 0.0]),
        ];
        let selected = select_evidence(&[1.0, 0.0, 0.0], chunks, 75, &config);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].content, "same table");
    }

    #[test]
    fn test_clustering_keeps_one_representative_per_topic() {
        let config = PipelineConfig::new().with_cluster_count(2).with_evidence_budget(10);
        // Two tight groups: near-duplicates of the query topic, and an
        // orthogonal topic.
        let chunks = vec![
            chunk("a", "topic-1 v1", vec![1.0, 0.0, 0.0]),
            chunk("a", "topic-1 v2", vec![0.99, 0.01, 0.0]),
            chunk("b", "topic-2 v1", vec![0.0, 1.0, 0.0]),
            chunk("b", "topic-2 v2", vec![0.01, 0.99, 0.0]),
        ];
        let selected = select_evidence(&[1.0, 0.0, 0.0], chunks, 10, &config);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].content, "topic-1 v1");
        assert!(selected[1].content.starts_with("topic-2"));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let v = vec![0.3, -0.2, 0.9, 0.1];
        assert_eq!(project(&v, 2), project(&v, 2));
        assert_eq!(project(&v, 2).len(), 2);
    }

    #[test]
    fn test_kmeans_separates_obvious_groups() {
        let vectors = vec![
            vec![1.0, 0.0],
            vec![0.98, 0.02],
            vec![0.0, 1.0],
            vec![0.02, 0.98],
        ];
        let assignment = kmeans_assign(&vectors, 2, 8);
        assert_eq!(assignment[0], assignment[1]);
        assert_eq!(assignment[2], assignment[3]);
        assert_ne!(assignment[0], assignment[2]);
    }
}

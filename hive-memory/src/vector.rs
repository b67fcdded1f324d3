//! Vector math and result merging for the memory store.
//!
//! Embeddings are stored as little-endian f32 BLOBs and compared with
//! cosine similarity. Scores reported to callers are normalized into
//! `[0, 1]` via [`distance_to_similarity`].

use crate::types::SearchHit;
use std::collections::HashSet;

/// Serialize an embedding as little-endian f32 bytes.
pub fn vec_to_bytes(v: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(v.len() * 4);
    for value in v {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Deserialize an embedding from little-endian f32 bytes.
///
/// Trailing bytes that do not form a full f32 are discarded.
pub fn bytes_to_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// L2-normalize a vector in place. Zero vectors are left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched dimensions or zero-norm inputs. The result is
/// clamped into `[-1, 1]` to absorb floating-point drift.
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

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Cosine distance rescaled into `[0, 1]`.
///
/// Raw cosine similarity lies in `[-1, 1]`; `(1 - cos) / 2` maps an
/// identical pair to 0 and an opposite pair to 1, which keeps the distance
/// inside the range [`distance_to_similarity`] requires.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)) / 2.0
}

/// Convert an internal distance to the `[0, 1]` similarity reported to
/// callers.
///
/// Assumes the distance metric is bounded in `[0, 1]` (see
/// [`cosine_distance`]); `similarity = 1 - distance`. A distance outside
/// that range means the metric assumption is broken, so this fails instead
/// of emitting an out-of-range score.
pub fn distance_to_similarity(distance: f32) -> anyhow::Result<f32> {
    if !(0.0..=1.0).contains(&distance) {
        anyhow::bail!("distance {distance} outside [0, 1]; similarity conversion assumes a bounded metric");
    }
    Ok(1.0 - distance)
}

/// Merge ranked result lists from multiple collections.
///
/// Concatenates the groups in order, deduplicates by exact content string
/// (first occurrence wins), stable-sorts by similarity descending, and
/// truncates to `limit`. Documents without a meaningful score sort as 0.
pub fn merge_ranked(groups: Vec<Vec<SearchHit>>, limit: usize) -> Vec<SearchHit> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<SearchHit> = Vec::new();

    for hit in groups.into_iter().flatten() {
        if seen.insert(hit.document.content.clone()) {
            merged.push(hit);
        }
    }

    // Stable sort preserves pre-sort order for equal scores
    merged.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, MetadataMap};

    fn hit(content: &str, similarity: f32) -> SearchHit {
        SearchHit {
            document: Document::new(content, content, MetadataMap::new()),
            similarity,
        }
    }

    #[test]
    fn bytes_roundtrip() {
        let v = vec![0.1f32, -2.5, 3.75, 0.0];
        assert_eq!(bytes_to_vec(&vec_to_bytes(&v)), v);
    }

    #[test]
    fn normalize_unit_length() {
        let mut v = vec![3.0f32, 4.0];
        normalize(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_zero_vector() {
        let mut v = vec![0.0f32, 0.0];
        normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[test]
    fn cosine_identical_is_one() {
        let v = vec![0.5f32, 0.5, 0.7];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_is_zero() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_mismatched_dims_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }

    #[test]
    fn distance_bounds() {
        let a = vec![1.0f32, 0.0];
        let opposite = vec![-1.0f32, 0.0];
        assert!(cosine_distance(&a, &a).abs() < 1e-6);
        assert!((cosine_distance(&a, &opposite) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn similarity_conversion_in_range() {
        assert!((distance_to_similarity(0.0).unwrap() - 1.0).abs() < 1e-6);
        assert!(distance_to_similarity(1.0).unwrap().abs() < 1e-6);
        assert!((distance_to_similarity(0.25).unwrap() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn similarity_conversion_rejects_out_of_range() {
        assert!(distance_to_similarity(1.5).is_err());
        assert!(distance_to_similarity(-0.1).is_err());
    }

    #[test]
    fn merge_dedupes_by_content_first_wins() {
        let merged = merge_ranked(
            vec![vec![hit("X", 0.9), hit("A", 0.4)], vec![hit("X", 0.7)]],
            10,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].document.content, "X");
        assert!((merged[0].similarity - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn merge_sorts_descending() {
        let merged = merge_ranked(
            vec![vec![hit("low", 0.2)], vec![hit("high", 0.8), hit("mid", 0.5)]],
            10,
        );
        let scores: Vec<f32> = merged.iter().map(|h| h.similarity).collect();
        assert_eq!(scores, vec![0.8, 0.5, 0.2]);
    }

    #[test]
    fn merge_equal_scores_keep_relative_order() {
        let merged = merge_ranked(vec![vec![hit("first", 0.5), hit("second", 0.5)]], 10);
        assert_eq!(merged[0].document.content, "first");
        assert_eq!(merged[1].document.content, "second");
    }

    #[test]
    fn merge_truncates_to_limit() {
        let merged = merge_ranked(
            vec![vec![hit("a", 0.9), hit("b", 0.8), hit("c", 0.7)]],
            2,
        );
        assert_eq!(merged.len(), 2);
    }
}

//! Vector similarity helpers

use crate::storage::SimilarEdge;
use rayon::prelude::*;
use std::collections::HashSet;

/// Cosine similarity of two vectors.
///
/// Returns 0.0 for mismatched lengths or a zero-norm input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Orient a pair by key so each unordered pair has exactly one representation
pub fn ordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Every pair of `(key, embedding)` entries scoring strictly above `threshold`.
///
/// With `touched`, only pairs with at least one touched member are evaluated.
/// Each unordered pair is evaluated at most once and edges are oriented from
/// the lower key to the higher key. Cost is O(n²) without `touched` and
/// O(n·t) with it.
pub fn similar_pairs(
    blocks: &[(String, Vec<f32>)],
    touched: Option<&HashSet<String>>,
    threshold: f32,
) -> Vec<SimilarEdge> {
    let mut sorted: Vec<&(String, Vec<f32>)> = blocks.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted.dedup_by(|a, b| a.0 == b.0);

    let edge = |a: &(String, Vec<f32>), b: &(String, Vec<f32>)| {
        let score = cosine_similarity(&a.1, &b.1);
        (score > threshold).then(|| {
            let (from, to) = ordered_pair(&a.0, &b.0);
            SimilarEdge {
                from_key: from.to_string(),
                to_key: to.to_string(),
                score,
            }
        })
    };

    let mut edges: Vec<SimilarEdge> = match touched {
        None => (0..sorted.len())
            .into_par_iter()
            .flat_map_iter(|i| {
                let a = sorted[i];
                sorted[i + 1..].iter().filter_map(move |b| edge(a, b))
            })
            .collect(),
        Some(touched) => sorted
            .par_iter()
            .filter(|entry| touched.contains(&entry.0))
            .flat_map_iter(|a| {
                sorted.iter().filter_map(move |b| {
                    // touched/touched pairs are evaluated from the lower key only
                    if a.0 == b.0 || (touched.contains(&b.0) && b.0 < a.0) {
                        return None;
                    }
                    edge(a, b)
                })
            })
            .collect(),
    };

    edges.sort_by(|a, b| (&a.from_key, &a.to_key).cmp(&(&b.from_key, &b.to_key)));
    edges
}

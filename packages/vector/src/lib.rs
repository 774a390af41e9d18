//! Exact, brute-force similarity search over fixed-length `f64` vectors.
//!
//! Three metrics are supported: dot product (`dp`), cosine similarity
//! (`cs`), and Euclidean distance (`ed`). There is no ANN index here — every
//! query walks every candidate vector once. The hot loop is a manually
//! unrolled accumulator chain (8 independent partial sums) so the compiler
//! isn't stuck with a single serial dependency chain; see [`dot`].

use rayon::prelude::*;
use std::cmp::Ordering;

/// Similarity/distance metric to rank candidates by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Dot product. Larger is more similar.
    DotProduct,
    /// Cosine similarity. Larger is more similar. Zero-norm vectors score 0.
    Cosine,
    /// Euclidean distance. Smaller is more similar.
    Euclidean,
}

impl Metric {
    /// Parse the short form used throughout the document API (`dp`, `cs`, `ed`).
    pub fn parse(by: &str) -> Option<Self> {
        match by {
            "dp" => Some(Metric::DotProduct),
            "cs" => Some(Metric::Cosine),
            "ed" => Some(Metric::Euclidean),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::DotProduct => "dp",
            Metric::Cosine => "cs",
            Metric::Euclidean => "ed",
        }
    }

    /// Whether a larger score means "more similar" under this metric.
    fn higher_is_better(self) -> bool {
        !matches!(self, Metric::Euclidean)
    }
}

/// Hand-unrolled dot product, the shared hot path for `dp` and `cs`.
///
/// Eight independent accumulators avoid a single serial add chain, letting
/// the compiler schedule more than one multiply-add per cycle. The
/// unchecked accesses are safe because every index used is strictly less
/// than `len = a.len().min(b.len())`, which we compute up front.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    // Candidate rows aren't guaranteed to match the query's length — a
    // no-embed push (`EmbeddingMode::None`) stores an empty vector, and that
    // row can still reach here via `search_vectors`. Score over the shared
    // prefix rather than asserting equal lengths, so a mismatched row scores
    // low/zero instead of panicking or reading out of bounds.
    let len = a.len().min(b.len());
    let chunks = len / 8;

    let mut acc = [0.0f64; 8];

    // SAFETY: `len = a.len().min(b.len())` and `chunks * 8 <= len`, so
    // `base..base+7` is always in bounds for both slices regardless of
    // whether `a` and `b` are the same length.
    unsafe {
        for i in 0..chunks {
            let base = i * 8;
            for (j, a_j) in acc.iter_mut().enumerate() {
                *a_j += a.get_unchecked(base + j) * b.get_unchecked(base + j);
            }
        }
    }

    let mut result: f64 = acc.iter().sum();
    for i in (chunks * 8)..len {
        result += a[i] * b[i];
    }
    result
}

/// L2 norm of a vector.
#[inline]
pub fn l2_norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

/// Cosine similarity. A zero-norm operand yields 0 by convention.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let denom = l2_norm(a) * l2_norm(b);
    if denom <= 0.0 {
        0.0
    } else {
        dot(a, b) / denom
    }
}

/// Euclidean distance. Like [`dot`], scores over the shared prefix rather
/// than asserting equal lengths — a candidate row can be shorter than the
/// query (e.g. a no-embed push's empty vector) without this panicking.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Similarity (or distance, for `ed`) between two vectors under `metric`.
pub fn sim(a: &[f64], b: &[f64], metric: Metric) -> f64 {
    match metric {
        Metric::DotProduct => dot(a, b),
        Metric::Cosine => cosine(a, b),
        Metric::Euclidean => euclidean(a, b),
    }
}

/// Rank every row of `matrix` against `query` under `metric`.
///
/// Returns `(idx_order, scores)`: `idx_order` is a permutation of
/// `0..matrix.len()` with the most-similar candidate first and ties broken
/// by original position; `scores` is indexed by *original* position (not
/// ranked order), so `scores[idx_order[0]]` is the best score.
pub fn search_vectors(query: &[f64], matrix: &[Vec<f64>], metric: Metric) -> (Vec<usize>, Vec<f64>) {
    let scores: Vec<f64> = matrix.iter().map(|row| sim(query, row, metric)).collect();
    let mut idx_order: Vec<usize> = (0..matrix.len()).collect();
    sort_by_score(&mut idx_order, &scores, metric);
    (idx_order, scores)
}

/// Parallel variant of [`search_vectors`] for large candidate sets. Rayon
/// splits the matrix across the thread pool; each worker scores a disjoint
/// slice, so no locking is needed inside the map step.
pub fn search_vectors_parallel(
    query: &[f64],
    matrix: &[Vec<f64>],
    metric: Metric,
) -> (Vec<usize>, Vec<f64>) {
    let scores: Vec<f64> = matrix.par_iter().map(|row| sim(query, row, metric)).collect();
    let mut idx_order: Vec<usize> = (0..matrix.len()).collect();
    sort_by_score(&mut idx_order, &scores, metric);
    (idx_order, scores)
}

/// Naive variant using idiomatic iterators only — no manual unrolling, no
/// unsafe. Kept as the benchmark baseline and as a cross-check for
/// `search_vectors`'s optimized path.
pub fn search_vectors_naive(query: &[f64], matrix: &[Vec<f64>], metric: Metric) -> (Vec<usize>, Vec<f64>) {
    let scores: Vec<f64> = matrix
        .iter()
        .map(|row| match metric {
            Metric::DotProduct => query.iter().zip(row).map(|(a, b)| a * b).sum(),
            Metric::Cosine => cosine(query, row),
            Metric::Euclidean => euclidean(query, row),
        })
        .collect();
    let mut idx_order: Vec<usize> = (0..matrix.len()).collect();
    sort_by_score(&mut idx_order, &scores, metric);
    (idx_order, scores)
}

/// Take the top `k` ids from a ranked search result, preserving rank order.
pub fn top_k(idx_order: &[usize], k: usize) -> Vec<usize> {
    idx_order.iter().copied().take(k).collect()
}

fn sort_by_score(idx_order: &mut [usize], scores: &[f64], metric: Metric) {
    let higher_is_better = metric.higher_is_better();
    idx_order.sort_by(|&i, &j| {
        let ordering = scores[i]
            .partial_cmp(&scores[j])
            .unwrap_or(Ordering::Equal);
        let ordering = if higher_is_better { ordering.reverse() } else { ordering };
        // Stable sort + explicit tie-break keeps ties in original-index order.
        ordering.then(i.cmp(&j))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_product_matches_naive_sum() {
        let a: Vec<f64> = (0..17).map(|i| i as f64).collect();
        let b: Vec<f64> = (0..17).map(|i| (i * 2) as f64).collect();
        let expected: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        assert!((dot(&a, &b) - expected).abs() < 1e-9);
    }

    #[test]
    fn cosine_self_similarity_is_one() {
        let v = vec![3.0, 4.0, 0.0];
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_zero_vector_is_zero() {
        let zero = vec![0.0, 0.0, 0.0];
        let other = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine(&zero, &other), 0.0);
    }

    #[test]
    fn euclidean_identical_is_zero() {
        let v = vec![1.0, 2.0, 3.0];
        assert_eq!(euclidean(&v, &v), 0.0);
    }

    // P9: larger score sorts earlier for dp/cs, smaller distance sorts earlier for ed.
    #[test]
    fn ranking_dot_product_descending() {
        let query = vec![1.0, 0.0];
        let matrix = vec![vec![0.1, 0.0], vec![0.9, 0.0], vec![0.5, 0.0]];
        let (idx_order, _) = search_vectors(&query, &matrix, Metric::DotProduct);
        assert_eq!(idx_order, vec![1, 2, 0]);
    }

    #[test]
    fn ranking_euclidean_ascending() {
        let query = vec![0.0, 0.0];
        let matrix = vec![vec![3.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]];
        let (idx_order, _) = search_vectors(&query, &matrix, Metric::Euclidean);
        assert_eq!(idx_order, vec![1, 2, 0]);
    }

    // P9: ties broken by original order.
    #[test]
    fn ranking_ties_keep_original_order() {
        let query = vec![1.0, 0.0];
        let matrix = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]];
        let (idx_order, _) = search_vectors(&query, &matrix, Metric::DotProduct);
        assert_eq!(idx_order, vec![0, 1, 2]);
    }

    #[test]
    fn scores_indexed_by_original_position() {
        let query = vec![1.0, 0.0];
        let matrix = vec![vec![0.1, 0.0], vec![0.9, 0.0]];
        let (idx_order, scores) = search_vectors(&query, &matrix, Metric::DotProduct);
        assert_eq!(idx_order[0], 1);
        assert!((scores[1] - 0.9).abs() < 1e-12);
        assert!((scores[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn parallel_matches_sequential() {
        let query: Vec<f64> = (0..32).map(|i| i as f64).collect();
        let matrix: Vec<Vec<f64>> = (0..64)
            .map(|i| (0..32).map(|j| (i + j) as f64).collect())
            .collect();
        let (seq_order, seq_scores) = search_vectors(&query, &matrix, Metric::Cosine);
        let (par_order, par_scores) = search_vectors_parallel(&query, &matrix, Metric::Cosine);
        assert_eq!(seq_order, par_order);
        for (s, p) in seq_scores.iter().zip(par_scores.iter()) {
            assert!((s - p).abs() < 1e-9);
        }
    }

    #[test]
    fn naive_matches_optimized_dot_product() {
        let query: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let matrix = vec![query.clone(), (0..9).map(|i| (9 - i) as f64).collect()];
        let (opt_order, opt_scores) = search_vectors(&query, &matrix, Metric::DotProduct);
        let (naive_order, naive_scores) = search_vectors_naive(&query, &matrix, Metric::DotProduct);
        assert_eq!(opt_order, naive_order);
        for (o, n) in opt_scores.iter().zip(naive_scores.iter()) {
            assert!((o - n).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_matrix_returns_empty_order() {
        let (idx_order, scores) = search_vectors(&[1.0, 2.0], &[], Metric::DotProduct);
        assert!(idx_order.is_empty());
        assert!(scores.is_empty());
    }

    #[test]
    fn top_k_preserves_rank_order() {
        let query = vec![1.0, 0.0];
        let matrix = vec![vec![0.1, 0.0], vec![0.9, 0.0], vec![0.5, 0.0]];
        let (idx_order, _) = search_vectors(&query, &matrix, Metric::DotProduct);
        assert_eq!(top_k(&idx_order, 2), vec![1, 2]);
    }

    #[test]
    fn metric_parse_round_trips() {
        for by in ["dp", "cs", "ed"] {
            let metric = Metric::parse(by).unwrap();
            assert_eq!(metric.as_str(), by);
        }
        assert!(Metric::parse("bogus").is_none());
    }
}

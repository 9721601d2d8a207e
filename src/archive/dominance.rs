//! Pareto dominance over objective vectors.
//!
//! All objectives are **minimised**: callers map maximised objectives onto
//! the minimisation axis (see [`Sense::to_minimisation`](crate::model::Sense::to_minimisation))
//! before comparing.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"

use std::cmp::Ordering;

/// Outcome of comparing two objective vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Same value on every objective.
    Equal,
    /// Each is better somewhere.
    Neither,
}

/// Compares `a` against `b` for Pareto dominance.
///
/// # Example
///
/// ```
/// use u_anneal::archive::{dominance_cmp, Dominance};
///
/// assert_eq!(dominance_cmp(&[1.0, 2.0], &[2.0, 2.0]), Dominance::Left);
/// assert_eq!(dominance_cmp(&[1.0, 3.0], &[3.0, 1.0]), Dominance::Neither);
/// ```
pub fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            a_better_in_some = true;
        } else if vb < va {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        (false, false) => Dominance::Equal,
        (true, true) => Dominance::Neither,
    }
}

/// True if `a` is no worse than `b` everywhere and strictly better somewhere.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance_cmp(a, b) == Dominance::Left
}

/// Crowding distance of each vector within `objectives`.
///
/// Boundary vectors (minimum or maximum on any objective) receive
/// `f64::INFINITY`; interior ones accumulate the normalised gap between
/// their neighbours on every objective.
pub fn crowding_distance(objectives: &[Vec<f64>]) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].len();
    let mut distances = vec![0.0f64; n];

    #[allow(clippy::needless_range_loop)] // axis is a column index into 2D data
    for axis in 0..m {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            objectives[a][axis]
                .partial_cmp(&objectives[b][axis])
                .unwrap_or(Ordering::Equal)
        });

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        let range = objectives[indices[n - 1]][axis] - objectives[indices[0]][axis];
        if range > 0.0 {
            for i in 1..(n - 1) {
                let prev = objectives[indices[i - 1]][axis];
                let next = objectives[indices[i + 1]][axis];
                distances[indices[i]] += (next - prev) / range;
            }
        }
    }

    distances
}

/// Euclidean distance from each vector to its closest other vector.
///
/// A lone vector is infinitely far from everything.
pub fn nearest_neighbour_distances(objectives: &[Vec<f64>]) -> Vec<f64> {
    let n = objectives.len();
    let mut nearest = vec![f64::INFINITY; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let distance = euclidean(&objectives[i], &objectives[j]);
            nearest[i] = nearest[i].min(distance);
            nearest[j] = nearest[j].min(distance);
        }
    }
    nearest
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Dominance ----

    #[test]
    fn test_clear_dominance() {
        assert_eq!(dominance_cmp(&[1.0, 1.0], &[2.0, 2.0]), Dominance::Left);
        assert_eq!(dominance_cmp(&[2.0, 2.0], &[1.0, 2.0]), Dominance::Right);
        assert!(dominates(&[1.0, 2.0], &[1.0, 3.0]));
    }

    #[test]
    fn test_equal_vectors_do_not_dominate() {
        assert_eq!(dominance_cmp(&[2.0, 2.0], &[2.0, 2.0]), Dominance::Equal);
        assert!(!dominates(&[2.0, 2.0], &[2.0, 2.0]));
    }

    #[test]
    fn test_trade_off() {
        assert_eq!(dominance_cmp(&[1.0, 5.0, 3.0], &[3.0, 1.0, 5.0]), Dominance::Neither);
    }

    // ---- Crowding distance ----

    #[test]
    fn test_crowding_boundaries_infinite() {
        let objs = vec![vec![1.0, 5.0], vec![3.0, 3.0], vec![5.0, 1.0]];
        let dist = crowding_distance(&objs);
        assert!(dist[0].is_infinite());
        assert!(dist[2].is_infinite());
        assert!(dist[1].is_finite() && dist[1] > 0.0);
    }

    #[test]
    fn test_crowding_zero_range_objective() {
        let objs = vec![vec![1.0, 5.0], vec![2.0, 5.0], vec![3.0, 5.0]];
        let dist = crowding_distance(&objs);
        assert!(dist[1].is_finite());
    }

    // ---- Nearest neighbour ----

    #[test]
    fn test_nearest_neighbour() {
        let objs = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 10.0]];
        let dist = nearest_neighbour_distances(&objs);
        assert_eq!(dist[0], 1.0);
        assert_eq!(dist[1], 1.0);
        assert!(dist[2] > 13.0);
    }

    #[test]
    fn test_nearest_neighbour_single() {
        assert!(nearest_neighbour_distances(&[vec![1.0]])[0].is_infinite());
    }
}

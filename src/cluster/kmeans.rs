//! Seeded k-means
//!
//! k-means++ seeding followed by Lloyd iterations, restarted `n_init` times
//! with seeds derived from the base seed; the run with the lowest inertia wins.
//!
//! # Reference
//!
//! Arthur, D., & Vassilvitskii, S. (2007). k-means++: The Advantages of Careful
//! Seeding. *Proceedings of the 18th ACM-SIAM Symposium on Discrete Algorithms*.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Result of the best k-means run
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster index per row
    pub assignments: Vec<usize>,
    /// Final centroids
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to assigned centroids
    pub inertia: f64,
    /// Lloyd iterations of the winning run
    pub iterations: usize,
}

/// Cluster `data` into `k` groups
///
/// Callers guarantee `1 <= k <= data.len()` and equal row lengths.
pub fn fit(
    data: &[Vec<f64>],
    k: usize,
    seed: u64,
    n_init: usize,
    max_iterations: usize,
) -> KMeansFit {
    let mut best = run_seeded(data, k, seed, 0, max_iterations);

    for run in 1..n_init {
        let fit = run_seeded(data, k, seed, run, max_iterations);
        if fit.inertia < best.inertia {
            best = fit;
        }
    }

    best
}

fn run_seeded(
    data: &[Vec<f64>],
    k: usize,
    seed: u64,
    run: usize,
    max_iterations: usize,
) -> KMeansFit {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(run as u64));
    let fit = run_once(data, k, &mut rng, max_iterations);
    log::debug!(
        "k-means run {}: inertia {:.6} after {} iterations",
        run,
        fit.inertia,
        fit.iterations
    );
    fit
}

fn run_once(data: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng, max_iterations: usize) -> KMeansFit {
    let mut centroids = kmeans_plus_plus(data, k, rng);
    let mut assignments: Vec<usize> = data.iter().map(|p| nearest(p, &centroids).0).collect();
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;
        update_centroids(data, &assignments, &mut centroids);

        let next: Vec<usize> = data.iter().map(|p| nearest(p, &centroids).0).collect();
        if next == assignments {
            break;
        }
        assignments = next;
    }

    let inertia = data
        .iter()
        .zip(&assignments)
        .map(|(p, &c)| squared_distance(p, &centroids[c]))
        .sum();

    KMeansFit {
        assignments,
        centroids,
        inertia,
        iterations,
    }
}

/// k-means++ seeding: each next centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen centroid
fn kmeans_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let n = data.len();
    let mut chosen = vec![false; n];
    let mut centroids = Vec::with_capacity(k);

    let first = rng.random_range(0..n);
    chosen[first] = true;
    centroids.push(data[first].clone());

    let mut dist: Vec<f64> = data.iter().map(|p| squared_distance(p, &centroids[0])).collect();

    while centroids.len() < k {
        let total: f64 = dist.iter().sum();
        let next = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            let mut pick = None;
            for (i, &d) in dist.iter().enumerate() {
                acc += d;
                if d > 0.0 && acc >= target {
                    pick = Some(i);
                    break;
                }
            }
            // Rounding can leave the target just above the final sum
            pick.or_else(|| dist.iter().rposition(|&d| d > 0.0))
        } else {
            None
        };
        // All remaining points coincide with a centroid
        let next = next
            .or_else(|| chosen.iter().position(|&c| !c))
            .unwrap_or(0);

        chosen[next] = true;
        centroids.push(data[next].clone());
        for (d, p) in dist.iter_mut().zip(data) {
            *d = d.min(squared_distance(p, &data[next]));
        }
    }

    centroids
}

/// Recompute each centroid as the mean of its members; empty clusters keep
/// their previous centroid
fn update_centroids(data: &[Vec<f64>], assignments: &[usize], centroids: &mut [Vec<f64>]) {
    let dims = centroids.first().map_or(0, |c| c.len());
    let mut sums = vec![vec![0.0f64; dims]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (point, &c) in data.iter().zip(assignments) {
        counts[c] += 1;
        for (s, &v) in sums[c].iter_mut().zip(point) {
            *s += v;
        }
    }

    for (c, centroid) in centroids.iter_mut().enumerate() {
        if counts[c] == 0 {
            log::warn!("k-means cluster {} is empty, keeping its previous centroid", c);
            continue;
        }
        for (v, s) in centroid.iter_mut().zip(&sums[c]) {
            *v = s / counts[c] as f64;
        }
    }
}

/// Nearest centroid; ties go to the lowest index
pub fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

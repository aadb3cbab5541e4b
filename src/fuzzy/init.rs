//! Centroid seeding when the caller supplies none.
//!
//! K-means++: the first centroid is a uniformly random foreground pixel,
//! each further one is drawn with probability proportional to D(x)², the
//! squared distance to the nearest centroid chosen so far. This spreads the
//! seeds across the intensity range, which matters for fuzzy c-means as much
//! as for k-means: two seeds in the same mode converge to the same class.

use super::centroids::Centroids;
use crate::distance::Euclidean;
use crate::image::FeatureImage;
use rand::prelude::*;

/// Pick `k` seed centroids among the pixels not marked in `skip`.
///
/// At least one pixel must be unskipped.
pub(crate) fn seed_centroids(
    image: &FeatureImage,
    skip: &[bool],
    k: usize,
    seed: Option<u64>,
) -> Centroids {
    let candidates: Vec<usize> = (0..image.n_pixels()).filter(|&i| !skip[i]).collect();
    debug_assert!(!candidates.is_empty());
    let d = image.n_components();

    let mut rng: Box<dyn RngCore> = match seed {
        Some(s) => Box::new(StdRng::seed_from_u64(s)),
        None => Box::new(rand::rng()),
    };

    let mut data = Vec::with_capacity(k * d);

    // First centroid: random pixel
    let first = image.pixel(candidates[rng.random_range(0..candidates.len())]);
    data.extend_from_slice(first);
    let mut nearest: Vec<f64> = candidates
        .iter()
        .map(|&p| Euclidean::squared(image.pixel(p), first))
        .collect();

    // Remaining centroids: k-means++ selection
    for _ in 1..k {
        let total: f64 = nearest.iter().sum();
        let chosen = if total <= 0.0 {
            candidates[rng.random_range(0..candidates.len())]
        } else {
            let threshold = rng.random::<f64>() * total;
            let mut cumsum = 0.0;
            let mut selected = candidates[candidates.len() - 1];
            for (j, &dist) in nearest.iter().enumerate() {
                cumsum += dist;
                if cumsum >= threshold {
                    selected = candidates[j];
                    break;
                }
            }
            selected
        };

        let centroid = image.pixel(chosen);
        data.extend_from_slice(centroid);
        for (slot, &p) in nearest.iter_mut().zip(candidates.iter()) {
            let dist = Euclidean::squared(image.pixel(p), centroid);
            if dist < *slot {
                *slot = dist;
            }
        }
    }

    Centroids::from_flat(d, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_modes() -> FeatureImage {
        let mut data = vec![0.0; 50];
        data.extend(vec![100.0; 50]);
        FeatureImage::from_shape_vec(vec![100], 1, data).unwrap()
    }

    #[test]
    fn test_seeds_spread_across_modes() {
        let image = two_modes();
        let skip = vec![false; 100];
        let seeds = seed_centroids(&image, &skip, 2, Some(7));
        let mut values: Vec<f64> = seeds.iter().map(|c| c[0]).collect();
        values.sort_by(f64::total_cmp);
        assert_eq!(values, vec![0.0, 100.0]);
    }

    #[test]
    fn test_seeds_avoid_skipped_pixels() {
        let image = two_modes();
        let skip: Vec<bool> = (0..100).map(|i| i < 50).collect();
        let seeds = seed_centroids(&image, &skip, 3, Some(1));
        assert_eq!(seeds.len(), 3);
        assert!(seeds.iter().all(|c| c[0] == 100.0));
    }

    #[test]
    fn test_seeds_deterministic_with_seed() {
        let image = FeatureImage::from_shape_vec(vec![20], 1, (0..20).map(f64::from).collect()).unwrap();
        let skip = vec![false; 20];
        let a = seed_centroids(&image, &skip, 4, Some(42));
        let b = seed_centroids(&image, &skip, 4, Some(42));
        assert_eq!(a, b);
    }
}

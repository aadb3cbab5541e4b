//! Fuzzy C-Means (Bezdek et al., 1984).
//!
//! Minimises
//!
//! ```text
//! J_m = Σᵢ Σₖ uᵢₖᵐ ‖xₖ − vᵢ‖²
//! ```
//!
//! by alternating the membership update
//! `uᵢₖ = 1 / Σⱼ (‖xₖ − vᵢ‖ / ‖xₖ − vⱼ‖)^(2/(m−1))` and the centroid update
//! `vᵢ = Σₖ uᵢₖᵐ xₖ / Σₖ uᵢₖᵐ`. No spatial information is used; each pixel is
//! an independent sample.
//!
//! # References
//!
//! - Bezdek, Ehrlich & Full (1984). "FCM: The fuzzy c-means clustering
//!   algorithm". Computers & Geosciences 10(2).

use super::accumulator::Accumulator;
use super::engine::{membership_from_costs, FuzzyClassifier, PassContext};
use super::traits::MembershipRule;
use crate::distance::Euclidean;
use crate::error::Result;
use crate::image::FeatureImage;

/// Plain FCM membership rule over the Euclidean distance.
#[derive(Debug, Clone, Default)]
pub struct FcmRule;

/// Fuzzy C-Means classifier.
pub type Fcm = FuzzyClassifier<FcmRule>;

impl FuzzyClassifier<FcmRule> {
    /// Create an FCM classifier with `n_classes` classes.
    pub fn new(n_classes: usize) -> Self {
        Self::with_rule(n_classes, FcmRule)
    }
}

impl MembershipRule for FcmRule {
    fn name(&self) -> &'static str {
        "FCM"
    }

    fn initialize(&self, _image: &FeatureImage) -> Result<()> {
        Ok(())
    }

    fn update(
        &self,
        pass: &PassContext<'_>,
        membership: &mut [f64],
        _scratch: &mut [f64],
    ) -> Result<Accumulator> {
        let k = pass.n_classes();
        let m = pass.m();
        let image = pass.image();
        let centroids = pass.centroids();

        Ok(pass.for_each_region(membership, |range, out, acc| {
            let mut costs = vec![0.0; k];
            for (local, pixel) in range.enumerate() {
                if pass.is_skipped(pixel) {
                    continue;
                }
                let x = image.pixel(pixel);
                for (class, cost) in costs.iter_mut().enumerate() {
                    *cost = Euclidean::squared(x, centroids.get(class));
                }
                let row = &mut out[local * k..(local + 1) * k];
                membership_from_costs(&costs, m, row);
                for (class, &u) in row.iter().enumerate() {
                    acc.add(class, u.powf(m), x);
                }
            }
        }))
    }
}

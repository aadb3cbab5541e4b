//! Kernel fuzzy c-means with spatial constraints (KFCM_S).
//!
//! The Euclidean distance of FCM is replaced by the kernel-induced distance
//! `‖Φ(x) − Φ(v)‖² = 2(1 − K(x, v))`, and each pixel is pulled towards the
//! classes its neighbours belong to. The objective is
//!
//! ```text
//! J = Σᵢ Σₖ uᵢₖᵐ (1 − K(xₖ, vᵢ)) + (α / N_R) Σᵢ Σₖ uᵢₖᵐ Σ_{r ∈ Nₖ} (1 − K(x_r, vᵢ))
//! ```
//!
//! where `Nₖ` is the structuring-element window around pixel `k` and `N_R`
//! its size. Minimising gives the membership update (on the bracketed cost)
//!
//! ```text
//! Dᵢₖ = (1 − K(xₖ, vᵢ)) + (α / N_R) Σ_r (1 − K(x_r, vᵢ))
//! uᵢₖ = 1 / Σⱼ (Dᵢₖ / Dⱼₖ)^(1/(m−1))
//! ```
//!
//! and the centroid update, in which the kernel value weights every feature:
//!
//! ```text
//!        Σₖ uᵢₖᵐ ( K(xₖ,vᵢ) xₖ + (α/N_R) Σ_r K(x_r,vᵢ) x_r )
//! vᵢ = ─────────────────────────────────────────────────────
//!        Σₖ uᵢₖᵐ ( K(xₖ,vᵢ)    + (α/N_R) Σ_r K(x_r,vᵢ)     )
//! ```
//!
//! `α = 0` switches the spatial term off and leaves plain kernel FCM.
//!
//! When background pixels are skipped they are also dropped from every
//! window, and `N_R` is the number of foreground neighbours that remain.
//!
//! # References
//!
//! - Chen & Zhang (2004). "Robust image segmentation using FCM with spatial
//!   constraints based on new kernel-induced distance measure". IEEE
//!   Transactions on Systems, Man, and Cybernetics B 34(4).

use super::accumulator::Accumulator;
use super::engine::{membership_from_costs, FuzzyClassifier, PassContext};
use super::traits::MembershipRule;
use crate::distance::KernelInducedDistanceMetric;
use crate::error::{Error, Result};
use crate::image::FeatureImage;
use crate::neighborhood::{Neighborhood, StructuringElement};
use std::sync::Arc;

/// KFCM_S membership rule.
#[derive(Debug, Clone)]
pub struct KfcmsRule {
    /// Weight of the neighbourhood term.
    alpha: f64,
    /// Kernel-induced metric; must be set before fitting.
    kernel: Option<Arc<dyn KernelInducedDistanceMetric>>,
    /// Neighbourhood window; must be non-empty before fitting.
    element: StructuringElement,
}

impl Default for KfcmsRule {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            kernel: None,
            element: StructuringElement::default(),
        }
    }
}

impl KfcmsRule {
    /// Neighbourhood weight.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The kernel metric, if set.
    pub fn kernel(&self) -> Option<&Arc<dyn KernelInducedDistanceMetric>> {
        self.kernel.as_ref()
    }

    /// The neighbourhood window.
    pub fn structuring_element(&self) -> &StructuringElement {
        &self.element
    }
}

/// Kernel fuzzy c-means with spatial constraints.
pub type Kfcms = FuzzyClassifier<KfcmsRule>;

impl FuzzyClassifier<KfcmsRule> {
    /// Create a KFCM_S classifier with `n_classes` classes.
    ///
    /// A kernel and a structuring element must be set before [`Self::fit`].
    pub fn new(n_classes: usize) -> Self {
        Self::with_rule(n_classes, KfcmsRule::default())
    }

    /// Set the neighbourhood weight, clamped to `[0, ∞)`.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.rule.alpha = alpha.clamp(0.0, f64::MAX);
        self
    }

    /// Set the kernel-induced metric.
    pub fn with_kernel<K: KernelInducedDistanceMetric + 'static>(self, kernel: K) -> Self {
        self.with_shared_kernel(Arc::new(kernel))
    }

    /// Set a kernel metric shared with other classifiers.
    pub fn with_shared_kernel(mut self, kernel: Arc<dyn KernelInducedDistanceMetric>) -> Self {
        self.rule.kernel = Some(kernel);
        self
    }

    /// Set the neighbourhood window.
    pub fn with_structuring_element(mut self, element: StructuringElement) -> Self {
        self.rule.element = element;
        self
    }
}

impl MembershipRule for KfcmsRule {
    fn name(&self) -> &'static str {
        "KFCMS"
    }

    fn initialize(&self, image: &FeatureImage) -> Result<()> {
        let kernel = self.kernel.as_ref().ok_or(Error::MissingKernel)?;
        kernel.parameters().validate()?;
        if self.alpha.is_nan() {
            return Err(Error::InvalidParameter {
                name: "alpha",
                message: "must be a number",
            });
        }
        self.element.validate_for(image.ndim())
    }

    fn update(
        &self,
        pass: &PassContext<'_>,
        membership: &mut [f64],
        _scratch: &mut [f64],
    ) -> Result<Accumulator> {
        let kernel = self.kernel.as_deref().ok_or(Error::MissingKernel)?;
        let k = pass.n_classes();
        let m = pass.m();
        let image = pass.image();
        let centroids = pass.centroids();
        let window = Neighborhood::new(image.shape(), &self.element);
        let n_r = window.len();

        Ok(pass.for_each_region(membership, |range, out, acc| {
            let mut neighbors = Vec::with_capacity(n_r);
            let mut costs = vec![0.0; k];
            let mut own = vec![0.0; k];
            // K(x_r, v_i), class-major
            let mut around = vec![0.0; k * n_r];

            for (local, pixel) in range.enumerate() {
                if pass.is_skipped(pixel) {
                    continue;
                }
                let x = image.pixel(pixel);
                window.collect(pixel, &mut neighbors);
                // Background neighbours take no part; N_R counts the rest.
                neighbors.retain(|&r| !pass.is_skipped(r));
                let n_fg = neighbors.len();
                let scale = if n_fg > 0 { self.alpha / n_fg as f64 } else { 0.0 };

                for class in 0..k {
                    let v = centroids.get(class);
                    own[class] = kernel.kernel(x, v);
                    let mut penalty = 0.0;
                    for (slot, &r) in around[class * n_r..class * n_r + n_fg]
                        .iter_mut()
                        .zip(neighbors.iter())
                    {
                        *slot = kernel.kernel(image.pixel(r), v);
                        penalty += 1.0 - *slot;
                    }
                    costs[class] = (1.0 - own[class]) + scale * penalty;
                }

                let row = &mut out[local * k..(local + 1) * k];
                membership_from_costs(&costs, m, row);

                for (class, &u) in row.iter().enumerate() {
                    let w = u.powf(m);
                    acc.add(class, w * own[class], x);
                    if scale > 0.0 {
                        for (&kr, &r) in around[class * n_r..class * n_r + n_fg]
                            .iter()
                            .zip(neighbors.iter())
                        {
                            acc.add(class, w * scale * kr, image.pixel(r));
                        }
                    }
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{KernelParameters, Rbf};

    fn noisy_step() -> FeatureImage {
        // Two flat halves with one outlier in each.
        let mut data = vec![0.0; 10];
        data.extend(vec![10.0; 10]);
        data[4] = 7.0;
        data[15] = 3.0;
        FeatureImage::from_shape_vec(vec![20], 1, data).unwrap()
    }

    fn kernel() -> Rbf {
        Rbf::new(KernelParameters::new(50.0))
    }

    #[test]
    fn test_missing_kernel() {
        let err = Kfcms::new(2)
            .with_structuring_element(StructuringElement::cuboid(&[1]))
            .fit(&noisy_step())
            .unwrap_err();
        assert_eq!(err, Error::MissingKernel);
    }

    #[test]
    fn test_missing_structuring_element() {
        let err = Kfcms::new(2).with_kernel(kernel()).fit(&noisy_step()).unwrap_err();
        assert_eq!(err, Error::EmptyStructuringElement);
    }

    #[test]
    fn test_element_dimension_checked() {
        let err = Kfcms::new(2)
            .with_kernel(kernel())
            .with_structuring_element(StructuringElement::cuboid(&[1, 1]))
            .fit(&noisy_step())
            .unwrap_err();
        assert_eq!(err, Error::DimensionMismatch { expected: 1, found: 2 });
    }

    #[test]
    fn test_background_neighbours_do_not_pull_centroid() {
        let image =
            FeatureImage::from_shape_vec(vec![8], 1, vec![0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0])
                .unwrap();
        let fit = Kfcms::new(1)
            .with_kernel(Rbf::new(KernelParameters::new(100.0)))
            .with_structuring_element(StructuringElement::cuboid(&[2]))
            .with_alpha(4.0)
            .with_ignore_background(true)
            .with_centroids(vec![vec![5.0]])
            .fit(&image)
            .unwrap();

        assert!((fit.centroids[0][0] - 10.0).abs() < 1e-9, "{:?}", fit.centroids);
        for i in 0..4 {
            assert!(fit.membership.is_unclassified(i));
        }
    }

    #[test]
    fn test_invalid_kernel_and_alpha_rejected() {
        let err = Kfcms::new(2)
            .with_kernel(Rbf::new(KernelParameters::new(0.0)))
            .with_structuring_element(StructuringElement::point(1))
            .fit(&noisy_step())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "sigma", .. }));

        let err = Kfcms::new(2)
            .with_kernel(kernel())
            .with_structuring_element(StructuringElement::point(1))
            .with_alpha(f64::NAN)
            .fit(&noisy_step())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "alpha", .. }));
    }

    #[test]
    fn test_alpha_clamped() {
        assert_eq!(Kfcms::new(2).with_alpha(-3.0).rule().alpha(), 0.0);
        assert_eq!(Kfcms::new(2).rule().alpha(), 1.0);
    }

    #[test]
    fn test_spatial_term_relabels_outliers() {
        let fit = Kfcms::new(2)
            .with_kernel(kernel())
            .with_structuring_element(StructuringElement::cuboid(&[2]))
            .with_alpha(4.0)
            .with_centroids(vec![vec![1.0], vec![9.0]])
            .fit(&noisy_step())
            .unwrap();

        let labels = fit.membership.label_vec();
        assert!(labels[..10].iter().all(|&l| l == 0), "{labels:?}");
        assert!(labels[10..].iter().all(|&l| l == 1), "{labels:?}");
    }

    #[test]
    fn test_alpha_zero_is_kernel_fcm() {
        let fit = Kfcms::new(2)
            .with_kernel(kernel())
            .with_structuring_element(StructuringElement::point(1))
            .with_alpha(0.0)
            .with_centroids(vec![vec![1.0], vec![9.0]])
            .fit(&noisy_step())
            .unwrap();

        // Without the neighbourhood term the outliers follow their intensity.
        let labels = fit.membership.label_vec();
        assert_eq!(labels[4], 1);
        assert_eq!(labels[15], 0);
        for i in 0..20 {
            let sum: f64 = fit.membership.memberships(i).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}

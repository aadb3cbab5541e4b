//! Modified spatial kernel fuzzy c-means (MSKFCM).
//!
//! Each iteration runs two membership passes separated by a full barrier:
//!
//! 1. **Kernel stage.** Memberships `u'` from the kernel cost alone,
//!    `Dᵢₖ = 1 − K(xₖ, vᵢ)`, written into a scratch buffer. With trace
//!    logging enabled the sums `Σ u'ᵐ K x / Σ u'ᵐ K` give a first centroid
//!    estimate that is written to the log.
//! 2. **Spatial stage.** For every pixel the spatial function
//!    `hᵢₖ = Σ_{r ∈ Nₖ} u'ᵢᵣ` sums the stage-1 memberships over the window,
//!    and
//!
//!    ```text
//!    uᵢₖ = u'ᵢₖᵖ hᵢₖ^q / Σⱼ u'ⱼₖᵖ hⱼₖ^q
//!    ```
//!
//!    A pixel whose normaliser vanishes keeps `u'`. The sums `Σ uᵐ K x / Σ uᵐ K`
//!    become the centroids of the next iteration.
//!
//! Stage 2 reads stage-1 memberships of pixels in other regions, so it only
//! starts once every region of stage 1 is done.
//!
//! With a single-point window and `q = 0`, `p = 1`, stage 2 is the identity
//! and the result is plain kernel FCM.
//!
//! # References
//!
//! - Castro, Marcos, Bosch et al. (2010). "Modified spatial kernel fuzzy
//!   c-means for MRI segmentation".
//! - Chuang, Tzeng, Chen, Wu & Chen (2006). "Fuzzy c-means clustering with
//!   spatial information for image segmentation". Computerized Medical
//!   Imaging and Graphics 30(1).

use super::accumulator::Accumulator;
use super::engine::{membership_from_costs, FuzzyClassifier, PassContext};
use super::traits::MembershipRule;
use crate::distance::KernelInducedDistanceMetric;
use crate::error::{Error, Result};
use crate::image::FeatureImage;
use crate::neighborhood::{Neighborhood, StructuringElement};
use log::{log_enabled, trace, Level};
use std::sync::Arc;

/// Two-stage MSKFCM membership rule.
#[derive(Debug, Clone)]
pub struct MskfcmRule {
    /// Exponent on the stage-1 membership.
    p: f64,
    /// Exponent on the spatial function.
    q: f64,
    kernel: Option<Arc<dyn KernelInducedDistanceMetric>>,
    element: StructuringElement,
}

impl Default for MskfcmRule {
    fn default() -> Self {
        Self {
            p: 2.0,
            q: 1.0,
            kernel: None,
            element: StructuringElement::default(),
        }
    }
}

impl MskfcmRule {
    /// Exponent on the stage-1 membership.
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Exponent on the spatial function.
    pub fn q(&self) -> f64 {
        self.q
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

/// Modified spatial kernel fuzzy c-means.
pub type Mskfcm = FuzzyClassifier<MskfcmRule>;

impl FuzzyClassifier<MskfcmRule> {
    /// Create an MSKFCM classifier with `n_classes` classes.
    ///
    /// A kernel and a structuring element must be set before [`Self::fit`].
    pub fn new(n_classes: usize) -> Self {
        Self::with_rule(n_classes, MskfcmRule::default())
    }

    /// Set the membership exponent, clamped to `[0, ∞)`.
    pub fn with_p(mut self, p: f64) -> Self {
        self.rule.p = p.clamp(0.0, f64::MAX);
        self
    }

    /// Set the spatial exponent, clamped to `[0, ∞)`.
    pub fn with_q(mut self, q: f64) -> Self {
        self.rule.q = q.clamp(0.0, f64::MAX);
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

impl MembershipRule for MskfcmRule {
    fn name(&self) -> &'static str {
        "MSKFCM"
    }

    fn initialize(&self, image: &FeatureImage) -> Result<()> {
        let kernel = self.kernel.as_ref().ok_or(Error::MissingKernel)?;
        kernel.parameters().validate()?;
        if self.p.is_nan() || self.q.is_nan() {
            return Err(Error::InvalidParameter {
                name: if self.p.is_nan() { "p" } else { "q" },
                message: "must be a number",
            });
        }
        self.element.validate_for(image.ndim())
    }

    fn uses_scratch(&self) -> bool {
        true
    }

    fn update(
        &self,
        pass: &PassContext<'_>,
        membership: &mut [f64],
        scratch: &mut [f64],
    ) -> Result<Accumulator> {
        let kernel = self.kernel.as_deref().ok_or(Error::MissingKernel)?;
        let k = pass.n_classes();
        let m = pass.m();
        let image = pass.image();
        let centroids = pass.centroids();

        // Stage 1: kernel memberships into scratch. The first-pass estimate
        // is only summed when it will be traced.
        let trace_estimate = log_enabled!(Level::Trace);
        let first = pass.for_each_region(scratch, |range, out, acc| {
            let mut costs = vec![0.0; k];
            let mut weights = vec![0.0; k];
            for (local, pixel) in range.enumerate() {
                if pass.is_skipped(pixel) {
                    continue;
                }
                let x = image.pixel(pixel);
                for class in 0..k {
                    weights[class] = kernel.kernel(x, centroids.get(class));
                    costs[class] = 1.0 - weights[class];
                }
                let row = &mut out[local * k..(local + 1) * k];
                membership_from_costs(&costs, m, row);
                if trace_estimate {
                    for (class, &u) in row.iter().enumerate() {
                        acc.add(class, u.powf(m) * weights[class], x);
                    }
                }
            }
        });

        if trace_estimate {
            for class in 0..k {
                trace!("MSKFCM: stage 1 estimate for class {class}: {:?}", first.estimate(class));
            }
        }

        // Stage 2: spatial reweighting, reading stage 1 across regions.
        let stage1: &[f64] = scratch;
        let window = Neighborhood::new(image.shape(), &self.element);
        let (p, q) = (self.p, self.q);

        Ok(pass.for_each_region(membership, |range, out, acc| {
            let mut neighbors = Vec::with_capacity(window.len());
            let mut weighted = vec![0.0; k];
            for (local, pixel) in range.enumerate() {
                if pass.is_skipped(pixel) {
                    continue;
                }
                let x = image.pixel(pixel);
                let prior = &stage1[pixel * k..(pixel + 1) * k];
                window.collect(pixel, &mut neighbors);

                let mut total = 0.0;
                for (class, slot) in weighted.iter_mut().enumerate() {
                    let h: f64 = neighbors.iter().map(|&r| stage1[r * k + class]).sum();
                    *slot = prior[class].powf(p) * h.powf(q);
                    total += *slot;
                }

                let row = &mut out[local * k..(local + 1) * k];
                if total > 0.0 && total.is_finite() {
                    for (u, &w) in row.iter_mut().zip(weighted.iter()) {
                        *u = w / total;
                    }
                } else {
                    row.copy_from_slice(prior);
                }

                for (class, &u) in row.iter().enumerate() {
                    let kv = kernel.kernel(x, centroids.get(class));
                    acc.add(class, u.powf(m) * kv, x);
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{Grbf, KernelParameters};

    fn noisy_step() -> FeatureImage {
        let mut data = vec![0.0; 10];
        data.extend(vec![10.0; 10]);
        data[4] = 7.0;
        data[15] = 3.0;
        FeatureImage::from_shape_vec(vec![20], 1, data).unwrap()
    }

    fn kernel() -> Grbf {
        Grbf::new(KernelParameters::new(50.0))
    }

    #[test]
    fn test_defaults_and_clamps() {
        let c = Mskfcm::new(3);
        assert_eq!(c.rule().p(), 2.0);
        assert_eq!(c.rule().q(), 1.0);
        let c = c.with_p(-1.0).with_q(-2.0);
        assert_eq!(c.rule().p(), 0.0);
        assert_eq!(c.rule().q(), 0.0);
    }

    #[test]
    fn test_invalid_exponent_and_sigma_rejected() {
        let err = Mskfcm::new(2)
            .with_kernel(kernel())
            .with_structuring_element(StructuringElement::point(1))
            .with_q(f64::NAN)
            .fit(&noisy_step())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "q", .. }));

        let err = Mskfcm::new(2)
            .with_kernel(Grbf::new(KernelParameters::new(f64::INFINITY)))
            .with_structuring_element(StructuringElement::point(1))
            .fit(&noisy_step())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "sigma", .. }));
    }

    #[test]
    fn test_requires_kernel_and_window() {
        let err = Mskfcm::new(2).fit(&noisy_step()).unwrap_err();
        assert_eq!(err, Error::MissingKernel);
        let err = Mskfcm::new(2).with_kernel(kernel()).fit(&noisy_step()).unwrap_err();
        assert_eq!(err, Error::EmptyStructuringElement);
    }

    #[test]
    fn test_spatial_stage_smooths_outliers() {
        let fit = Mskfcm::new(2)
            .with_kernel(kernel())
            .with_structuring_element(StructuringElement::ball(&[2]))
            .with_p(1.0)
            .with_q(3.0)
            .with_centroids(vec![vec![1.0], vec![9.0]])
            .fit(&noisy_step())
            .unwrap();

        let labels = fit.membership.label_vec();
        assert!(labels[..10].iter().all(|&l| l == 0), "{labels:?}");
        assert!(labels[10..].iter().all(|&l| l == 1), "{labels:?}");
        for i in 0..20 {
            let sum: f64 = fit.membership.memberships(i).iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}

//! Kernel-induced distances.
//!
//! Both metrics share the generalised Gaussian RBF kernel of Chen & Zhang
//! (2004):
//!
//! ```text
//! K(x, y) = exp( −Σᵢ |xᵢᵃ − yᵢᵃ|ᵇ / σ )
//! ```
//!
//! With `a = 1` and `b = 2` this is the ordinary Gaussian kernel. Mapping
//! points through the kernel's feature space Φ gives the induced distance
//!
//! ```text
//! ‖Φ(x) − Φ(y)‖² = K(x,x) + K(y,y) − 2K(x,y) = 2 − 2K(x,y)
//! ```
//!
//! [`Rbf`] reports the distance itself (`sqrt(2 − 2K)`), [`Grbf`] the squared
//! form (`2 − 2K`). Both are 0 for identical inputs and symmetric.
//!
//! # References
//!
//! - Chen & Zhang (2004). "Robust image segmentation using FCM with spatial
//!   constraints based on new kernel-induced distance measure"

use super::{origin_component, DistanceMetric};
use crate::error::{Error, Result};

/// Parameters of the generalised RBF kernel.
///
/// Setters clamp out-of-range values instead of failing: `a` to `[0, ∞)` and
/// `b` to `[1, 2]`. `sigma` is stored as given and checked by [`Self::validate`]
/// when a classifier is fitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParameters {
    sigma: f64,
    a: f64,
    b: f64,
}

impl KernelParameters {
    /// Gaussian kernel (`a = 1`, `b = 2`) with bandwidth `sigma`.
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma,
            a: 1.0,
            b: 2.0,
        }
    }

    /// Set the bandwidth.
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the component exponent, clamped to `[0, ∞)`.
    pub fn with_a(mut self, a: f64) -> Self {
        self.a = a.clamp(0.0, f64::MAX);
        self
    }

    /// Set the difference exponent, clamped to `[1, 2]`.
    pub fn with_b(mut self, b: f64) -> Self {
        self.b = b.clamp(1.0, 2.0);
        self
    }

    /// Bandwidth.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Component exponent.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Difference exponent.
    pub fn b(&self) -> f64 {
        self.b
    }

    #[inline]
    fn lift(&self, v: f64) -> f64 {
        if self.a == 1.0 {
            v
        } else {
            v.powf(self.a)
        }
    }

    #[inline]
    fn spread(&self, d: f64) -> f64 {
        let d = d.abs();
        if self.b == 2.0 {
            d * d
        } else if self.b == 1.0 {
            d
        } else {
            d.powf(self.b)
        }
    }

    #[inline]
    fn kernel_from_sum(&self, sum: f64) -> f64 {
        (-sum / self.sigma).exp()
    }

    /// Kernel value between two vectors.
    #[inline]
    pub fn kernel(&self, x1: &[f64], x2: &[f64]) -> f64 {
        debug_assert_eq!(x1.len(), x2.len());
        let sum: f64 = x1
            .iter()
            .zip(x2.iter())
            .map(|(&u, &v)| self.spread(self.lift(u) - self.lift(v)))
            .sum();
        self.kernel_from_sum(sum)
    }

    fn kernel_origin(&self, x: &[f64], origin: &[f64]) -> f64 {
        let sum: f64 = x
            .iter()
            .enumerate()
            .map(|(i, &u)| self.spread(self.lift(u) - self.lift(origin_component(origin, i))))
            .sum();
        self.kernel_from_sum(sum)
    }

    fn kernel_component(&self, u: f64, v: f64) -> f64 {
        self.kernel_from_sum(self.spread(self.lift(u) - self.lift(v)))
    }

    /// Check the parameters describe a usable kernel: `sigma` finite and
    /// positive, `a` and `b` not NaN.
    pub fn validate(&self) -> Result<()> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(Error::InvalidParameter {
                name: "sigma",
                message: "must be finite and greater than 0",
            });
        }
        if self.a.is_nan() || self.b.is_nan() {
            return Err(Error::InvalidParameter {
                name: if self.a.is_nan() { "a" } else { "b" },
                message: "must be a number",
            });
        }
        Ok(())
    }
}

impl Default for KernelParameters {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// A distance derived from a positive-definite kernel.
pub trait KernelInducedDistanceMetric: DistanceMetric {
    /// Kernel value `K(x1, x2)`, in `(0, 1]` for RBF-type kernels.
    fn kernel(&self, x1: &[f64], x2: &[f64]) -> f64;

    /// Kernel parameters.
    fn parameters(&self) -> KernelParameters;
}

/// `2 − 2K`, clamped at zero against rounding.
#[inline]
fn squared_induced(k: f64) -> f64 {
    (2.0 - 2.0 * k).max(0.0)
}

/// RBF kernel-induced distance, `sqrt(2 − 2K(x, y))`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rbf {
    params: KernelParameters,
    origin: Vec<f64>,
}

impl Rbf {
    /// Metric over the given kernel.
    pub fn new(params: KernelParameters) -> Self {
        Self {
            params,
            origin: Vec::new(),
        }
    }

    /// Set the origin used by [`DistanceMetric::evaluate_origin`].
    pub fn with_origin(mut self, origin: Vec<f64>) -> Self {
        self.origin = origin;
        self
    }
}

impl DistanceMetric for Rbf {
    fn evaluate(&self, x1: &[f64], x2: &[f64]) -> f64 {
        squared_induced(self.params.kernel(x1, x2)).sqrt()
    }

    fn evaluate_origin(&self, x: &[f64]) -> f64 {
        squared_induced(self.params.kernel_origin(x, &self.origin)).sqrt()
    }

    fn evaluate_component(&self, a: f64, b: f64) -> f64 {
        squared_induced(self.params.kernel_component(a, b)).sqrt()
    }
}

impl KernelInducedDistanceMetric for Rbf {
    fn kernel(&self, x1: &[f64], x2: &[f64]) -> f64 {
        self.params.kernel(x1, x2)
    }

    fn parameters(&self) -> KernelParameters {
        self.params
    }
}

/// Squared RBF kernel-induced distance, `2 − 2K(x, y)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grbf {
    params: KernelParameters,
    origin: Vec<f64>,
}

impl Grbf {
    /// Metric over the given kernel.
    pub fn new(params: KernelParameters) -> Self {
        Self {
            params,
            origin: Vec::new(),
        }
    }

    /// Set the origin used by [`DistanceMetric::evaluate_origin`].
    pub fn with_origin(mut self, origin: Vec<f64>) -> Self {
        self.origin = origin;
        self
    }
}

impl DistanceMetric for Grbf {
    fn evaluate(&self, x1: &[f64], x2: &[f64]) -> f64 {
        squared_induced(self.params.kernel(x1, x2))
    }

    fn evaluate_origin(&self, x: &[f64]) -> f64 {
        squared_induced(self.params.kernel_origin(x, &self.origin))
    }

    fn evaluate_component(&self, a: f64, b: f64) -> f64 {
        squared_induced(self.params.kernel_component(a, b))
    }
}

impl KernelInducedDistanceMetric for Grbf {
    fn kernel(&self, x1: &[f64], x2: &[f64]) -> f64 {
        self.params.kernel(x1, x2)
    }

    fn parameters(&self) -> KernelParameters {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_clamp() {
        let p = KernelParameters::new(2.0).with_a(-3.0).with_b(5.0);
        assert_eq!(p.a(), 0.0);
        assert_eq!(p.b(), 2.0);

        let p = p.with_b(0.2);
        assert_eq!(p.b(), 1.0);
        assert_eq!(p.sigma(), 2.0);
    }

    #[test]
    fn test_validate_rejects_degenerate_sigma() {
        assert!(KernelParameters::new(1.0).validate().is_ok());
        for sigma in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let err = KernelParameters::new(sigma).validate().unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { name: "sigma", .. }));
        }
        let err = KernelParameters::new(1.0).with_a(f64::NAN).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "a", .. }));
    }

    #[test]
    fn test_gaussian_kernel_value() {
        // a = 1, b = 2: K = exp(-‖x − y‖² / σ)
        let p = KernelParameters::new(4.0);
        let k = p.kernel(&[0.0, 0.0], &[1.0, 1.0]);
        assert!((k - (-0.5f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_generalised_kernel_value() {
        // a = 2, b = 1: K = exp(-Σ|xᵢ² − yᵢ²| / σ)
        let p = KernelParameters::new(1.0).with_a(2.0).with_b(1.0);
        let k = p.kernel(&[2.0], &[1.0]);
        assert!((k - (-3.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_at_identity() {
        let x = [0.3, 7.0, 12.5];
        let rbf = Rbf::new(KernelParameters::new(10.0));
        let grbf = Grbf::new(KernelParameters::new(10.0).with_b(1.5));
        assert_eq!(rbf.evaluate(&x, &x), 0.0);
        assert_eq!(grbf.evaluate(&x, &x), 0.0);
        assert_eq!(rbf.kernel(&x, &x), 1.0);
    }

    #[test]
    fn test_squared_form_relation() {
        let p = KernelParameters::new(3.0);
        let rbf = Rbf::new(p);
        let grbf = Grbf::new(p);
        let (x, y) = ([1.0, 2.0], [2.5, -1.0]);
        let d = rbf.evaluate(&x, &y);
        assert!((d * d - grbf.evaluate(&x, &y)).abs() < 1e-12);
        // Bounded above by 2 in squared form.
        assert!(grbf.evaluate(&[0.0], &[1e9]) <= 2.0);
    }

    #[test]
    fn test_origin_and_component_forms() {
        let p = KernelParameters::new(2.0);
        let rbf = Rbf::new(p).with_origin(vec![1.0, 1.0]);
        assert!((rbf.evaluate_origin(&[2.0, 3.0]) - rbf.evaluate(&[2.0, 3.0], &[1.0, 1.0])).abs() < 1e-12);
        assert!((rbf.evaluate_component(4.0, 1.0) - rbf.evaluate(&[4.0], &[1.0])).abs() < 1e-12);

        let grbf = Grbf::new(p);
        assert!((grbf.evaluate_origin(&[0.5]) - grbf.evaluate(&[0.5], &[0.0])).abs() < 1e-12);
    }
}

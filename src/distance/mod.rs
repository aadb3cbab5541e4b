//! Distance metrics between feature vectors.
//!
//! Every metric is a pure function of its inputs and of parameters fixed at
//! construction. Nothing here mutates during evaluation, so a metric can be
//! shared across worker threads behind an `Arc`.
//!
//! | Metric | Form | Used by |
//! |--------|------|---------|
//! | [`Euclidean`] | `‖x − y‖` | FCM |
//! | [`Rbf`] | `sqrt(2 − 2·K(x, y))` | KFCMS, MSKFCM |
//! | [`Grbf`] | `2 − 2·K(x, y)` | KFCMS, MSKFCM |
//!
//! The kernel classifiers read the kernel value `K` itself through
//! [`KernelInducedDistanceMetric::kernel`]. The distance forms exist for
//! callers who want a metric view of the same kernel.

mod euclidean;
mod kernel;

pub use euclidean::Euclidean;
pub use kernel::{Grbf, KernelInducedDistanceMetric, KernelParameters, Rbf};

use core::fmt;

/// A distance between feature vectors.
pub trait DistanceMetric: fmt::Debug + Send + Sync {
    /// Distance between two vectors of equal length.
    fn evaluate(&self, x1: &[f64], x2: &[f64]) -> f64;

    /// Distance from `x` to the metric's origin.
    fn evaluate_origin(&self, x: &[f64]) -> f64;

    /// Distance between two scalar components.
    fn evaluate_component(&self, a: f64, b: f64) -> f64;
}

/// Coordinate `i` of an origin, where a short or empty origin reads as zero.
#[inline]
pub(crate) fn origin_component(origin: &[f64], i: usize) -> f64 {
    origin.get(i).copied().unwrap_or(0.0)
}

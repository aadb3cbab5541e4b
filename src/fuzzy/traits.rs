//! Classifier traits.

use super::accumulator::Accumulator;
use super::engine::PassContext;
use crate::error::Result;
use crate::image::FeatureImage;
use core::fmt;

/// Trait for clustering algorithms over point sets.
pub trait Clustering {
    /// Fit the model to data and return cluster assignments.
    ///
    /// Returns a vector of cluster labels, one per input point.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}

/// Trait for soft clustering algorithms that return memberships.
pub trait SoftClustering: Clustering {
    /// Fit and return soft cluster assignments.
    ///
    /// Returns a matrix where entry \[i\]\[k\] is the membership of point i
    /// to cluster k.
    fn fit_predict_proba(&self, data: &[Vec<f32>]) -> Result<Vec<Vec<f64>>>;
}

/// How one fuzzy c-means variant turns centroids into memberships.
///
/// The engine ([`super::FuzzyClassifier`]) owns the iteration loop, the
/// centroid snapshot and the convergence test. A rule only supplies the
/// per-pixel membership pass (one or more parallel sweeps through
/// [`PassContext::for_each_region`]) and the weighted sums for the next
/// centroids.
pub trait MembershipRule: fmt::Debug + Send + Sync {
    /// Short algorithm name used in log output.
    fn name(&self) -> &'static str;

    /// Validate the rule against the input. Runs once, before the first
    /// iteration; an error here aborts the run.
    fn initialize(&self, image: &FeatureImage) -> Result<()>;

    /// Whether [`MembershipRule::update`] needs a second membership-sized
    /// buffer that persists across iterations.
    fn uses_scratch(&self) -> bool {
        false
    }

    /// Write the memberships of every non-skipped pixel into `membership`
    /// and return the centroid sums.
    ///
    /// `scratch` has the length of `membership` when
    /// [`MembershipRule::uses_scratch`] is true, and is empty otherwise.
    fn update(
        &self,
        pass: &PassContext<'_>,
        membership: &mut [f64],
        scratch: &mut [f64],
    ) -> Result<Accumulator>;
}

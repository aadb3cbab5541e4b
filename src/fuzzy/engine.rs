//! The iterative fuzzy classification driver.
//!
//! Each iteration runs three phases in order:
//!
//! 1. **Before**: snapshot the current centroids. The snapshot is the only
//!    centroid array the workers see, so it is read-only for the whole pass.
//! 2. **Regions**: the rule sweeps disjoint, contiguous pixel ranges in
//!    parallel. Each range writes its own slice of the membership buffer and
//!    fills a private [`Accumulator`], which is merged into the shared one
//!    under a mutex when the range is done. The sweep returns only after every
//!    range has finished, which is the barrier before phase 3.
//! 3. **After**: new centroids = numerator / denominator (empty classes keep
//!    their previous centroid), error = mean squared centroid shift.
//!
//! The loop stops when `error <= max_error` or after `max_iter` iterations.

use super::accumulator::Accumulator;
use super::centroids::Centroids;
use super::init::seed_centroids;
use super::traits::{Clustering, MembershipRule, SoftClustering};
use crate::error::{Error, Result};
use crate::image::{FeatureImage, MembershipImage};
use log::{debug, info};
use parking_lot::Mutex;
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fuzzy c-means classifier, generic over its membership rule.
///
/// Use the aliases [`super::Fcm`], [`super::Kfcms`] and [`super::Mskfcm`].
#[derive(Debug, Clone)]
pub struct FuzzyClassifier<R> {
    /// Number of classes.
    n_classes: usize,
    /// Fuzziness exponent.
    m: f64,
    /// Maximum iterations.
    max_iter: usize,
    /// Convergence threshold on the mean squared centroid shift.
    max_error: f64,
    /// Manually seeded centroids.
    centroids: Option<Vec<Vec<f64>>>,
    /// Skip pixels equal to `background`.
    ignore_background: bool,
    /// Background value; zero when unset.
    background: Option<Vec<f64>>,
    /// Dedicated pool size; `None` uses the global pool.
    n_threads: Option<usize>,
    /// Seed for centroid initialisation.
    seed: Option<u64>,
    pub(crate) rule: R,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct FuzzyFit {
    /// Membership of every pixel to every class.
    pub membership: MembershipImage,
    /// Final centroids, one per class.
    pub centroids: Vec<Vec<f64>>,
    /// Error of the last iteration.
    pub error: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the error reached the threshold (as opposed to hitting
    /// `max_iter`).
    pub converged: bool,
    /// Error after each iteration.
    pub error_history: Vec<f64>,
}

impl<R: MembershipRule> FuzzyClassifier<R> {
    /// Classifier for `n_classes` classes using `rule`.
    pub fn with_rule(n_classes: usize, rule: R) -> Self {
        Self {
            n_classes,
            m: 2.0,
            max_iter: 100,
            max_error: 1e-4,
            centroids: None,
            ignore_background: false,
            background: None,
            n_threads: None,
            seed: None,
            rule,
        }
    }

    /// Set the number of classes. Discards manually seeded centroids.
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = n_classes;
        self.centroids = None;
        self
    }

    /// Set the fuzziness exponent, clamped to `[1, ∞)`. Must end up `> 1`.
    pub fn with_m(mut self, m: f64) -> Self {
        self.m = m.clamp(1.0, f64::MAX);
        self
    }

    /// Set maximum iterations, clamped to at least 1.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// Set the convergence threshold, clamped to `[0, ∞)`.
    pub fn with_max_error(mut self, max_error: f64) -> Self {
        self.max_error = max_error.clamp(0.0, f64::MAX);
        self
    }

    /// Seed the centroids manually, one per class.
    pub fn with_centroids(mut self, centroids: Vec<Vec<f64>>) -> Self {
        self.centroids = Some(centroids);
        self
    }

    /// Skip pixels equal to the background value.
    pub fn with_ignore_background(mut self, ignore: bool) -> Self {
        self.ignore_background = ignore;
        self
    }

    /// Set the background value (zero by default).
    pub fn with_background_pixel(mut self, background: Vec<f64>) -> Self {
        self.background = Some(background);
        self
    }

    /// Run on a dedicated pool of `n` workers (at least 1).
    pub fn with_n_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n.max(1));
        self
    }

    /// Set random seed for centroid initialisation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of classes.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Fuzziness exponent.
    pub fn m(&self) -> f64 {
        self.m
    }

    /// Maximum iterations.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Convergence threshold.
    pub fn max_error(&self) -> f64 {
        self.max_error
    }

    /// Manually seeded centroids, if any.
    pub fn centroids(&self) -> Option<&[Vec<f64>]> {
        self.centroids.as_deref()
    }

    /// The membership rule.
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Classify `image`.
    ///
    /// All configuration is validated before the first iteration.
    pub fn fit(&self, image: &FeatureImage) -> Result<FuzzyFit> {
        if self.n_classes == 0 {
            return Err(Error::InvalidClassCount {
                requested: self.n_classes,
            });
        }
        if !(self.m.is_finite() && self.m > 1.0) {
            return Err(Error::InvalidParameter {
                name: "m",
                message: "must be finite and greater than 1",
            });
        }
        if self.max_error.is_nan() || self.max_error < 0.0 {
            return Err(Error::InvalidParameter {
                name: "max_error",
                message: "must be a non-negative number",
            });
        }

        let skip = self.background_mask(image)?;
        let seeds = match &self.centroids {
            Some(rows) => Centroids::from_rows(rows, self.n_classes, image.n_components())?,
            None => {
                if skip.iter().all(|&s| s) {
                    return Err(Error::EmptyInput);
                }
                seed_centroids(image, &skip, self.n_classes, self.seed)
            }
        };
        self.rule.initialize(image)?;

        #[cfg(feature = "parallel")]
        {
            if let Some(n) = self.n_threads {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| Error::ThreadPool(e.to_string()))?;
                return pool.install(|| self.iterate(image, &skip, seeds));
            }
        }

        self.iterate(image, &skip, seeds)
    }

    fn background_mask(&self, image: &FeatureImage) -> Result<Vec<bool>> {
        let n = image.n_pixels();
        if !self.ignore_background {
            return Ok(vec![false; n]);
        }
        let d = image.n_components();
        let background = self.background.clone().unwrap_or_else(|| vec![0.0; d]);
        if background.len() != d {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: background.len(),
            });
        }
        Ok((0..n).map(|i| image.pixel(i) == background.as_slice()).collect())
    }

    fn iterate(&self, image: &FeatureImage, skip: &[bool], mut centroids: Centroids) -> Result<FuzzyFit> {
        let n = image.n_pixels();
        let k = self.n_classes;
        let workers = worker_count();
        let region_len = n.div_ceil(workers).max(1);

        let mut membership = vec![0.0; n * k];
        let mut scratch = if self.rule.uses_scratch() {
            vec![0.0; n * k]
        } else {
            Vec::new()
        };

        info!(
            "{}: {} classes, {} pixels x {} components, {} workers",
            self.rule.name(),
            k,
            n,
            image.n_components(),
            workers
        );

        let mut history = Vec::new();
        let mut error;
        loop {
            let previous = centroids;
            let pass = PassContext {
                image,
                centroids: &previous,
                m: self.m,
                skip,
                region_len,
            };
            let sums = self.rule.update(&pass, &mut membership, &mut scratch)?;

            let iteration = history.len() + 1;
            centroids = sums.centroids(&previous, iteration);
            error = previous.mean_squared_difference(&centroids);
            history.push(error);
            debug!("{}: iteration {} error {:.6e}", self.rule.name(), iteration, error);

            if error <= self.max_error || history.len() >= self.max_iter {
                break;
            }
        }

        let converged = error <= self.max_error;
        info!(
            "{}: stopped after {} iterations, error {:.6e}, converged={}",
            self.rule.name(),
            history.len(),
            error,
            converged
        );

        Ok(FuzzyFit {
            membership: MembershipImage::new(image.shape().to_vec(), k, membership),
            centroids: centroids.to_rows(),
            error,
            iterations: history.len(),
            converged,
            error_history: history,
        })
    }
}

#[cfg(feature = "parallel")]
fn worker_count() -> usize {
    rayon::current_num_threads().max(1)
}

#[cfg(not(feature = "parallel"))]
fn worker_count() -> usize {
    1
}

/// Read-only view of one membership pass, handed to a [`MembershipRule`].
#[derive(Debug)]
pub struct PassContext<'a> {
    image: &'a FeatureImage,
    centroids: &'a Centroids,
    m: f64,
    skip: &'a [bool],
    region_len: usize,
}

impl<'a> PassContext<'a> {
    /// The input image.
    pub fn image(&self) -> &'a FeatureImage {
        self.image
    }

    /// Centroids of the previous iteration.
    pub fn centroids(&self) -> &'a Centroids {
        self.centroids
    }

    /// Fuzziness exponent.
    pub fn m(&self) -> f64 {
        self.m
    }

    /// Number of classes.
    pub fn n_classes(&self) -> usize {
        self.centroids.len()
    }

    /// Whether a pixel is background and must be left untouched.
    #[inline]
    pub fn is_skipped(&self, pixel: usize) -> bool {
        self.skip[pixel]
    }

    /// Run `f` over disjoint pixel ranges that together cover the image.
    ///
    /// `buffer` holds `n_classes` values per pixel; `f` receives the pixel
    /// range, the matching slice of `buffer` and a zeroed accumulator. The
    /// partial accumulators are merged one at a time and the merged sum is
    /// returned once every range has finished.
    pub fn for_each_region<F>(&self, buffer: &mut [f64], f: F) -> Accumulator
    where
        F: Fn(Range<usize>, &mut [f64], &mut Accumulator) + Sync,
    {
        let k = self.n_classes();
        let d = self.image.n_components();
        debug_assert_eq!(buffer.len(), self.image.n_pixels() * k);

        let total = Mutex::new(Accumulator::zeros(k, d));
        let visit = |(i, chunk): (usize, &mut [f64])| {
            let start = i * self.region_len;
            let end = start + chunk.len() / k;
            let mut local = Accumulator::zeros(k, d);
            f(start..end, chunk, &mut local);
            total.lock().merge(&local);
        };

        #[cfg(feature = "parallel")]
        buffer
            .par_chunks_mut(self.region_len * k)
            .enumerate()
            .for_each(visit);

        #[cfg(not(feature = "parallel"))]
        buffer
            .chunks_mut(self.region_len * k)
            .enumerate()
            .for_each(visit);

        total.into_inner()
    }
}

/// Fuzzy memberships from per-class costs (squared distances).
///
/// `u_i = 1 / Σ_j (D_i / D_j)^(1/(m−1))`, the standard FCM rule written on
/// squared distances. A pixel with zero cost to some class is a crisp member
/// of the first such class.
pub fn membership_from_costs(costs: &[f64], m: f64, out: &mut [f64]) {
    debug_assert_eq!(costs.len(), out.len());
    if let Some(hit) = costs.iter().position(|&c| c <= 0.0) {
        out.fill(0.0);
        out[hit] = 1.0;
        return;
    }
    let exponent = 1.0 / (m - 1.0);
    for (i, u) in out.iter_mut().enumerate() {
        let sum: f64 = costs
            .iter()
            .map(|&c| (costs[i] / c).powf(exponent))
            .sum();
        *u = 1.0 / sum;
    }
}

impl<R: MembershipRule> Clustering for FuzzyClassifier<R> {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        let image = FeatureImage::from_points(data)?;
        Ok(self.fit(&image)?.membership.label_vec())
    }

    fn n_clusters(&self) -> usize {
        self.n_classes
    }
}

impl<R: MembershipRule> SoftClustering for FuzzyClassifier<R> {
    fn fit_predict_proba(&self, data: &[Vec<f32>]) -> Result<Vec<Vec<f64>>> {
        let image = FeatureImage::from_points(data)?;
        let fit = self.fit(&image)?;
        Ok((0..fit.membership.n_pixels())
            .map(|i| fit.membership.memberships(i).to_vec())
            .collect())
    }
}

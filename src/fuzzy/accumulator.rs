use super::centroids::Centroids;
use log::warn;
use ndarray::{Array1, Array2, ArrayView1};

/// Per-class running sums for the centroid update.
///
/// Centroid `i` of the next iteration is `numerator[i] / denominator[i]`.
/// Both sums are linear in their contributions, so each region fills its own
/// accumulator and the partials are merged afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    numerator: Array2<f64>,
    denominator: Array1<f64>,
}

impl Accumulator {
    /// All-zero sums for `n_classes` centroids of `n_components` each.
    pub fn zeros(n_classes: usize, n_components: usize) -> Self {
        Self {
            numerator: Array2::zeros((n_classes, n_components)),
            denominator: Array1::zeros(n_classes),
        }
    }

    /// Add `weight · x` to the numerator and `weight` to the denominator of `class`.
    #[inline]
    pub fn add(&mut self, class: usize, weight: f64, x: &[f64]) {
        self.numerator
            .row_mut(class)
            .scaled_add(weight, &ArrayView1::from(x));
        self.denominator[class] += weight;
    }

    /// Fold another partial sum into this one.
    pub fn merge(&mut self, other: &Accumulator) {
        self.numerator += &other.numerator;
        self.denominator += &other.denominator;
    }

    /// Accumulated weight of a class.
    pub fn denominator(&self, class: usize) -> f64 {
        self.denominator[class]
    }

    /// `numerator / denominator` for one class, or `None` if the class got no
    /// weight or the quotient is not finite.
    pub fn estimate(&self, class: usize) -> Option<Vec<f64>> {
        let denom = self.denominator[class];
        if !(denom > 0.0) || !denom.is_finite() {
            return None;
        }
        let centroid: Vec<f64> = self.numerator.row(class).iter().map(|v| v / denom).collect();
        centroid.iter().all(|v| v.is_finite()).then_some(centroid)
    }

    /// New centroids from the sums. Empty classes keep their previous centroid.
    pub(crate) fn centroids(&self, previous: &Centroids, iteration: usize) -> Centroids {
        let mut data = Vec::with_capacity(previous.len() * previous.n_components());
        for class in 0..previous.len() {
            match self.estimate(class) {
                Some(centroid) => data.extend(centroid),
                None => {
                    warn!(
                        "class {class} received no weight in iteration {iteration}; keeping its previous centroid"
                    );
                    data.extend_from_slice(previous.get(class));
                }
            }
        }
        Centroids::from_flat(previous.n_components(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_estimate() {
        let mut acc = Accumulator::zeros(2, 2);
        acc.add(0, 1.0, &[1.0, 2.0]);
        acc.add(0, 3.0, &[5.0, 6.0]);
        assert_eq!(acc.estimate(0), Some(vec![4.0, 5.0]));
        assert_eq!(acc.estimate(1), None);
        assert_eq!(acc.denominator(0), 4.0);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let mut a = Accumulator::zeros(1, 1);
        let mut b = Accumulator::zeros(1, 1);
        let mut whole = Accumulator::zeros(1, 1);
        a.add(0, 0.5, &[2.0]);
        b.add(0, 1.5, &[4.0]);
        whole.add(0, 0.5, &[2.0]);
        whole.add(0, 1.5, &[4.0]);
        a.merge(&b);
        assert_eq!(a, whole);
    }

    #[test]
    fn test_empty_class_keeps_previous() {
        let previous = Centroids::from_flat(1, vec![1.0, 9.0]);
        let mut acc = Accumulator::zeros(2, 1);
        acc.add(0, 2.0, &[3.0]);
        let next = acc.centroids(&previous, 1);
        assert_eq!(next.get(0), &[3.0]);
        assert_eq!(next.get(1), &[9.0]);
    }
}

use super::{origin_component, DistanceMetric};

/// Unweighted Euclidean distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Euclidean {
    origin: Vec<f64>,
}

impl Euclidean {
    /// Euclidean metric with the origin at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin used by [`DistanceMetric::evaluate_origin`].
    pub fn with_origin(mut self, origin: Vec<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Squared distance, without the square root.
    #[inline]
    pub fn squared(x1: &[f64], x2: &[f64]) -> f64 {
        debug_assert_eq!(x1.len(), x2.len());
        x1.iter()
            .zip(x2.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum()
    }
}

impl DistanceMetric for Euclidean {
    fn evaluate(&self, x1: &[f64], x2: &[f64]) -> f64 {
        Self::squared(x1, x2).sqrt()
    }

    fn evaluate_origin(&self, x: &[f64]) -> f64 {
        x.iter()
            .enumerate()
            .map(|(i, v)| {
                let d = v - origin_component(&self.origin, i);
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    fn evaluate_component(&self, a: f64, b: f64) -> f64 {
        (a - b).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_345() {
        let m = Euclidean::new();
        assert!((m.evaluate(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
        assert!((m.evaluate_origin(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
        assert_eq!(m.evaluate_component(-1.0, 2.0), 3.0);
    }

    #[test]
    fn test_euclidean_origin() {
        let m = Euclidean::new().with_origin(vec![1.0, 1.0]);
        assert!((m.evaluate_origin(&[4.0, 5.0]) - 5.0).abs() < 1e-12);
    }
}

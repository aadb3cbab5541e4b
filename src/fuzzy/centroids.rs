use crate::error::{Error, Result};

/// Class centroids, stored row-major (`n_classes × n_components`).
#[derive(Debug, Clone, PartialEq)]
pub struct Centroids {
    n_components: usize,
    data: Vec<f64>,
}

impl Centroids {
    /// Build from one row per class, checking the count and the dimension.
    pub(crate) fn from_rows(rows: &[Vec<f64>], n_classes: usize, n_components: usize) -> Result<Self> {
        if rows.len() != n_classes {
            return Err(Error::CentroidCountMismatch {
                expected: n_classes,
                found: rows.len(),
            });
        }
        let mut data = Vec::with_capacity(n_classes * n_components);
        for row in rows {
            if row.len() != n_components {
                return Err(Error::DimensionMismatch {
                    expected: n_components,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { n_components, data })
    }

    pub(crate) fn from_flat(n_components: usize, data: Vec<f64>) -> Self {
        debug_assert!(n_components > 0 && data.len() % n_components == 0);
        Self { n_components, data }
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.data.len() / self.n_components
    }

    /// True when there are no centroids.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Components per centroid.
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Centroid of one class.
    #[inline]
    pub fn get(&self, class: usize) -> &[f64] {
        let d = self.n_components;
        &self.data[class * d..(class + 1) * d]
    }

    /// Iterate over the centroids in class order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.n_components)
    }

    /// One `Vec` per class.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter().map(<[f64]>::to_vec).collect()
    }

    /// Mean squared difference over every class and component.
    pub fn mean_squared_difference(&self, other: &Centroids) -> f64 {
        debug_assert_eq!(self.data.len(), other.data.len());
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        sum / self.data.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_checks() {
        let rows = vec![vec![0.0, 1.0], vec![2.0, 3.0]];
        assert!(Centroids::from_rows(&rows, 2, 2).is_ok());
        assert_eq!(
            Centroids::from_rows(&rows, 3, 2),
            Err(Error::CentroidCountMismatch {
                expected: 3,
                found: 2
            })
        );
        assert!(Centroids::from_rows(&rows, 2, 3).is_err());
    }

    #[test]
    fn test_mean_squared_difference() {
        let a = Centroids::from_flat(2, vec![0.0, 0.0, 1.0, 1.0]);
        let b = Centroids::from_flat(2, vec![2.0, 0.0, 1.0, 1.0]);
        // (4 + 0 + 0 + 0) / 4
        assert_eq!(a.mean_squared_difference(&b), 1.0);
        assert_eq!(b.get(0), &[2.0, 0.0]);
        assert_eq!(b.to_rows(), vec![vec![2.0, 0.0], vec![1.0, 1.0]]);
    }
}

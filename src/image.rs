//! Feature and membership images.
//!
//! Both images are flat, row-major buffers over an N-dimensional pixel grid
//! (last axis fastest, as in ndarray's standard layout). A pixel is addressed
//! by its linear index.

use crate::error::{Error, Result};
use ndarray::{ArrayD, ArrayView, Dimension, IxDyn};

/// Label given to pixels that were skipped as background.
pub const UNCLASSIFIED: usize = usize::MAX;

/// Input image converted once to `f64` feature vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImage {
    shape: Vec<usize>,
    n_components: usize,
    data: Vec<f64>,
}

impl FeatureImage {
    /// Single-component image of any dimensionality.
    pub fn from_scalar<T, D>(image: ArrayView<'_, T, D>) -> Result<Self>
    where
        T: Copy + Into<f64>,
        D: Dimension,
    {
        let shape = image.shape().to_vec();
        let data = image.iter().map(|&v| v.into()).collect();
        Self::from_shape_vec(shape, 1, data)
    }

    /// Multi-component image; the last axis holds the components.
    pub fn from_vector<T, D>(image: ArrayView<'_, T, D>) -> Result<Self>
    where
        T: Copy + Into<f64>,
        D: Dimension,
    {
        let (components, spatial) = match image.shape().split_last() {
            Some((&c, rest)) if !rest.is_empty() => (c, rest.to_vec()),
            _ => {
                return Err(Error::ShapeMismatch {
                    expected: "at least one spatial axis plus a component axis".into(),
                    actual: format!("{:?}", image.shape()),
                })
            }
        };
        let data = image.iter().map(|&v| v.into()).collect();
        Self::from_shape_vec(spatial, components, data)
    }

    /// One-dimensional image whose pixels are the given points.
    pub fn from_points(points: &[Vec<f32>]) -> Result<Self> {
        let first = points.first().ok_or(Error::EmptyInput)?;
        let d = first.len();
        let mut data = Vec::with_capacity(points.len() * d);
        for point in points {
            if point.len() != d {
                return Err(Error::DimensionMismatch {
                    expected: d,
                    found: point.len(),
                });
            }
            data.extend(point.iter().map(|&v| f64::from(v)));
        }
        Self::from_shape_vec(vec![points.len()], d, data)
    }

    /// Image from raw row-major data, `n_components` values per pixel.
    pub fn from_shape_vec(shape: Vec<usize>, n_components: usize, data: Vec<f64>) -> Result<Self> {
        if shape.is_empty() {
            return Err(Error::ShapeMismatch {
                expected: "at least one spatial axis".into(),
                actual: "[]".into(),
            });
        }
        if n_components == 0 {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be > 0",
            });
        }
        let n_pixels: usize = shape.iter().product();
        if n_pixels == 0 {
            return Err(Error::EmptyInput);
        }
        if data.len() != n_pixels * n_components {
            return Err(Error::ShapeMismatch {
                expected: format!("{} values for {:?} x {}", n_pixels * n_components, shape, n_components),
                actual: format!("{} values", data.len()),
            });
        }
        Ok(Self {
            shape,
            n_components,
            data,
        })
    }

    /// Spatial shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of spatial axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of pixels.
    pub fn n_pixels(&self) -> usize {
        self.data.len() / self.n_components
    }

    /// Components per pixel.
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Feature vector of one pixel.
    #[inline]
    pub fn pixel(&self, index: usize) -> &[f64] {
        let c = self.n_components;
        &self.data[index * c..(index + 1) * c]
    }

    /// All feature values, pixel-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Fuzzy membership of every pixel to every class.
///
/// Rows sum to 1, except for pixels skipped as background, whose row is all
/// zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipImage {
    shape: Vec<usize>,
    n_classes: usize,
    data: Vec<f64>,
}

impl MembershipImage {
    pub(crate) fn new(shape: Vec<usize>, n_classes: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>() * n_classes);
        Self {
            shape,
            n_classes,
            data,
        }
    }

    /// Spatial shape (same as the input image).
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of classes (channels).
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of pixels.
    pub fn n_pixels(&self) -> usize {
        self.data.len() / self.n_classes
    }

    /// Memberships of one pixel, one value per class.
    #[inline]
    pub fn memberships(&self, index: usize) -> &[f64] {
        let k = self.n_classes;
        &self.data[index * k..(index + 1) * k]
    }

    /// All values, pixel-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Whether a pixel was skipped as background.
    pub fn is_unclassified(&self, index: usize) -> bool {
        self.memberships(index).iter().all(|&u| u == 0.0)
    }

    /// Probability image of a single class.
    pub fn channel(&self, class: usize) -> Result<ArrayD<f64>> {
        if class >= self.n_classes {
            return Err(Error::InvalidParameter {
                name: "class",
                message: "must be < n_classes",
            });
        }
        let values: Vec<f64> = self
            .data
            .chunks_exact(self.n_classes)
            .map(|row| row[class])
            .collect();
        ArrayD::from_shape_vec(IxDyn(&self.shape), values).map_err(|e| Error::Other(e.to_string()))
    }

    /// All memberships as one array with the classes on the last axis.
    pub fn to_array(&self) -> Result<ArrayD<f64>> {
        let mut shape = self.shape.clone();
        shape.push(self.n_classes);
        ArrayD::from_shape_vec(IxDyn(&shape), self.data.clone())
            .map_err(|e| Error::Other(e.to_string()))
    }

    /// Maximum-membership label of each pixel, as a flat vector.
    ///
    /// Ties go to the lowest class index. Background pixels get
    /// [`UNCLASSIFIED`].
    pub fn label_vec(&self) -> Vec<usize> {
        self.data
            .chunks_exact(self.n_classes)
            .map(|row| {
                let mut best = UNCLASSIFIED;
                let mut best_u = 0.0;
                for (k, &u) in row.iter().enumerate() {
                    if u > best_u {
                        best_u = u;
                        best = k;
                    }
                }
                best
            })
            .collect()
    }

    /// Maximum-membership label image.
    pub fn labels(&self) -> Result<ArrayD<usize>> {
        ArrayD::from_shape_vec(IxDyn(&self.shape), self.label_vec())
            .map_err(|e| Error::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_from_scalar_keeps_logical_order() {
        let img = array![[1u8, 2, 3], [4, 5, 6]];
        let f = FeatureImage::from_scalar(img.view()).unwrap();
        assert_eq!(f.shape(), &[2, 3]);
        assert_eq!(f.n_components(), 1);
        assert_eq!(f.pixel(4), &[5.0]);

        // Transposed view: logical order, not memory order.
        let t = FeatureImage::from_scalar(img.t()).unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.pixel(1), &[4.0]);
    }

    #[test]
    fn test_from_vector_rgb() {
        let mut img = Array3::<f32>::zeros((2, 2, 3));
        img[[1, 0, 2]] = 9.0;
        let f = FeatureImage::from_vector(img.view()).unwrap();
        assert_eq!(f.shape(), &[2, 2]);
        assert_eq!(f.n_components(), 3);
        assert_eq!(f.pixel(2), &[0.0, 0.0, 9.0]);
    }

    #[test]
    fn test_from_points_mismatch() {
        let pts = vec![vec![0.0, 1.0], vec![2.0]];
        assert_eq!(
            FeatureImage::from_points(&pts),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(FeatureImage::from_points(&[]), Err(Error::EmptyInput));
    }

    #[test]
    fn test_from_shape_vec_validates() {
        assert!(FeatureImage::from_shape_vec(vec![2, 2], 1, vec![0.0; 3]).is_err());
        assert!(FeatureImage::from_shape_vec(vec![], 1, vec![]).is_err());
        assert!(FeatureImage::from_shape_vec(vec![2], 0, vec![]).is_err());
        assert!(FeatureImage::from_shape_vec(vec![2, 0], 1, vec![]).is_err());
    }

    #[test]
    fn test_labels_and_channels() {
        let m = MembershipImage::new(
            vec![3],
            2,
            vec![0.8, 0.2, 0.0, 0.0, 0.5, 0.5],
        );
        assert_eq!(m.label_vec(), vec![0, UNCLASSIFIED, 0]);
        assert!(m.is_unclassified(1));

        let c1 = m.channel(1).unwrap();
        assert_eq!(c1.as_slice().unwrap(), &[0.2, 0.0, 0.5]);
        assert!(m.channel(2).is_err());

        let full = m.to_array().unwrap();
        assert_eq!(full.shape(), &[3, 2]);
        assert_eq!(m.labels().unwrap().shape(), &[3]);
    }
}

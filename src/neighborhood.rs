//! Structuring elements and neighbourhood lookup.
//!
//! A [`StructuringElement`] is a list of integer offsets relative to a
//! centre pixel. The spatial classifiers visit `pixel + offset` for every
//! offset; coordinates that fall outside the image are clamped to the nearest
//! edge pixel (zero-flux Neumann boundary), so every pixel sees exactly
//! `len()` neighbours.

use crate::error::{Error, Result};

/// Neighbourhood shape, as offsets from the centre pixel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuringElement {
    ndim: usize,
    offsets: Vec<Vec<isize>>,
}

impl StructuringElement {
    /// Box window spanning `[-r, r]` along every axis (centre included).
    pub fn cuboid(radius: &[usize]) -> Self {
        Self::filtered(radius, |_| true)
    }

    /// Ellipsoidal window with the given semi-axes (centre included).
    ///
    /// An offset `o` belongs to the ball when `Σ (oᵢ / rᵢ)² ≤ 1`; axes with
    /// radius 0 only admit offset 0.
    pub fn ball(radius: &[usize]) -> Self {
        Self::filtered(radius, |offset| {
            let mut sum = 0.0;
            for (&o, &r) in offset.iter().zip(radius.iter()) {
                if r == 0 {
                    if o != 0 {
                        return false;
                    }
                } else {
                    let t = o as f64 / r as f64;
                    sum += t * t;
                }
            }
            sum <= 1.0 + 1e-9
        })
    }

    /// The centre pixel alone.
    pub fn point(ndim: usize) -> Self {
        Self {
            ndim,
            offsets: vec![vec![0; ndim]],
        }
    }

    /// Arbitrary shape. All offsets must have the same length.
    pub fn from_offsets(offsets: Vec<Vec<isize>>) -> Result<Self> {
        let ndim = offsets.first().map_or(0, Vec::len);
        if let Some(bad) = offsets.iter().find(|o| o.len() != ndim) {
            return Err(Error::DimensionMismatch {
                expected: ndim,
                found: bad.len(),
            });
        }
        Ok(Self { ndim, offsets })
    }

    fn filtered(radius: &[usize], keep: impl Fn(&[isize]) -> bool) -> Self {
        let ndim = radius.len();
        let mut offsets = Vec::new();
        let mut current: Vec<isize> = radius.iter().map(|&r| -(r as isize)).collect();
        if ndim == 0 {
            return Self { ndim, offsets };
        }
        // Odometer over the box, first axis slowest.
        'outer: loop {
            if keep(&current) {
                offsets.push(current.clone());
            }
            for axis in (0..ndim).rev() {
                if current[axis] < radius[axis] as isize {
                    current[axis] += 1;
                    continue 'outer;
                }
                current[axis] = -(radius[axis] as isize);
            }
            break;
        }
        Self { ndim, offsets }
    }

    /// Number of spatial axes.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Number of offsets.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True when the element has no offsets.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The offsets.
    pub fn offsets(&self) -> &[Vec<isize>] {
        &self.offsets
    }

    /// Check the element can be used on an image with `ndim` axes.
    pub(crate) fn validate_for(&self, ndim: usize) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyStructuringElement);
        }
        if self.ndim != ndim {
            return Err(Error::DimensionMismatch {
                expected: ndim,
                found: self.ndim,
            });
        }
        Ok(())
    }
}

/// A structuring element bound to an image grid.
#[derive(Debug, Clone)]
pub(crate) struct Neighborhood<'a> {
    shape: &'a [usize],
    strides: Vec<usize>,
    element: &'a StructuringElement,
}

impl<'a> Neighborhood<'a> {
    pub(crate) fn new(shape: &'a [usize], element: &'a StructuringElement) -> Self {
        let mut strides = vec![1usize; shape.len()];
        for axis in (0..shape.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }
        Self {
            shape,
            strides,
            element,
        }
    }

    /// Number of neighbours of every pixel.
    pub(crate) fn len(&self) -> usize {
        self.element.len()
    }

    /// Linear indices of the neighbours of `index`, boundary-clamped.
    pub(crate) fn collect(&self, index: usize, out: &mut Vec<usize>) {
        out.clear();
        for offset in &self.element.offsets {
            let mut linear = 0usize;
            for (axis, &o) in offset.iter().enumerate() {
                let coord = (index / self.strides[axis]) % self.shape[axis];
                let max = self.shape[axis] as isize - 1;
                let moved = (coord as isize + o).clamp(0, max) as usize;
                linear += moved * self.strides[axis];
            }
            out.push(linear);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_counts() {
        assert_eq!(StructuringElement::cuboid(&[1, 1]).len(), 9);
        assert_eq!(StructuringElement::cuboid(&[1, 1, 1]).len(), 27);
        assert_eq!(StructuringElement::cuboid(&[2, 0]).len(), 5);
        assert_eq!(StructuringElement::cuboid(&[]).len(), 0);
    }

    #[test]
    fn test_ball_is_cross_for_unit_radius() {
        let ball = StructuringElement::ball(&[1, 1]);
        assert_eq!(ball.len(), 5);
        assert!(ball.offsets().contains(&vec![0, 0]));
        assert!(!ball.offsets().contains(&vec![1, 1]));
    }

    #[test]
    fn test_from_offsets_rejects_ragged() {
        let err = StructuringElement::from_offsets(vec![vec![0, 0], vec![1]]);
        assert!(err.is_err());
        let empty = StructuringElement::from_offsets(vec![]).unwrap();
        assert_eq!(empty.validate_for(2), Err(Error::EmptyStructuringElement));
    }

    #[test]
    fn test_validate_dimension() {
        let el = StructuringElement::point(2);
        assert!(el.validate_for(2).is_ok());
        assert!(el.validate_for(3).is_err());
    }

    #[test]
    fn test_neighbors_clamp_at_border() {
        // 3x4 grid, corner pixel 0 with a 3x3 box.
        let shape = [3usize, 4];
        let el = StructuringElement::cuboid(&[1, 1]);
        let nb = Neighborhood::new(&shape, &el);
        let mut out = Vec::new();
        nb.collect(0, &mut out);
        assert_eq!(out.len(), 9);
        // Clamped offsets fold back onto rows/cols 0 and 1.
        let mut uniq = out.clone();
        uniq.sort_unstable();
        uniq.dedup();
        assert_eq!(uniq, vec![0, 1, 4, 5]);

        // Interior pixel (1, 1) sees the full window.
        nb.collect(5, &mut out);
        let mut sorted = out.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 4, 5, 6, 8, 9, 10]);
    }
}

//! Fuzzy cluster validity indices.
//!
//! Internal measures computed from the membership image alone, with no
//! ground truth. They compare runs with different class counts or
//! fuzziness exponents: a crisp partition scores best, a partition where
//! every pixel is `1/c` in every class scores worst.
//!
//! # Indices
//!
//! | Index | Range | Best |
//! |-------|-------|------|
//! | [`partition_coefficient`] | [1/c, 1] | 1 |
//! | [`modified_partition_coefficient`] | [0, 1] | 1 |
//! | [`partition_entropy`] | [0, ln c] | 0 |
//!
//! Background pixels skipped by the classifier (all memberships zero) are
//! left out. Each index returns `None` when no pixel was classified.
//!
//! # Example
//!
//! ```rust
//! use haze::fuzzy::Fcm;
//! use haze::validity::{partition_coefficient, partition_entropy};
//! use haze::FeatureImage;
//!
//! let image = FeatureImage::from_shape_vec(vec![6], 1, vec![0.0, 0.1, 0.2, 5.0, 5.1, 5.2]).unwrap();
//! let fit = Fcm::new(2).with_seed(1).fit(&image).unwrap();
//!
//! let pc = partition_coefficient(&fit.membership).unwrap();
//! let pe = partition_entropy(&fit.membership).unwrap();
//! assert!(pc > 0.9);
//! assert!(pe < 0.2);
//! ```
//!
//! # References
//!
//! - Bezdek (1981). "Pattern Recognition with Fuzzy Objective Function
//!   Algorithms"
//! - Dave (1996). "Validating fuzzy partitions obtained through c-shells
//!   clustering". Pattern Recognition Letters 17(6).

use crate::image::MembershipImage;

/// Mean over classified pixels of `f(row)`.
fn mean_over_classified(membership: &MembershipImage, f: impl Fn(&[f64]) -> f64) -> Option<f64> {
    let mut total = 0.0;
    let mut count = 0usize;
    for i in 0..membership.n_pixels() {
        if membership.is_unclassified(i) {
            continue;
        }
        total += f(membership.memberships(i));
        count += 1;
    }
    (count > 0).then(|| total / count as f64)
}

/// Bezdek's partition coefficient.
///
/// ```text
/// PC = (1/N) Σₖ Σᵢ uᵢₖ²
/// ```
pub fn partition_coefficient(membership: &MembershipImage) -> Option<f64> {
    mean_over_classified(membership, |row| row.iter().map(|u| u * u).sum())
}

/// Partition coefficient rescaled to `[0, 1]` so that different class counts
/// are comparable: `MPC = 1 − c/(c−1) (1 − PC)`.
///
/// With a single class the partition is trivially crisp and this is 1.
pub fn modified_partition_coefficient(membership: &MembershipImage) -> Option<f64> {
    let pc = partition_coefficient(membership)?;
    let c = membership.n_classes() as f64;
    if c <= 1.0 {
        return Some(1.0);
    }
    Some(1.0 - c / (c - 1.0) * (1.0 - pc))
}

/// Bezdek's partition entropy (natural log, `0 ln 0 = 0`).
///
/// ```text
/// PE = −(1/N) Σₖ Σᵢ uᵢₖ ln uᵢₖ
/// ```
pub fn partition_entropy(membership: &MembershipImage) -> Option<f64> {
    mean_over_classified(membership, |row| {
        -row.iter()
            .filter(|&&u| u > 0.0)
            .map(|&u| u * u.ln())
            .sum::<f64>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(rows: &[[f64; 2]]) -> MembershipImage {
        let data = rows.iter().flatten().copied().collect();
        MembershipImage::new(vec![rows.len()], 2, data)
    }

    #[test]
    fn test_crisp_partition() {
        let m = image(&[[1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(partition_coefficient(&m), Some(1.0));
        assert_eq!(modified_partition_coefficient(&m), Some(1.0));
        assert_eq!(partition_entropy(&m), Some(0.0));
    }

    #[test]
    fn test_uniform_partition() {
        let m = image(&[[0.5, 0.5], [0.5, 0.5]]);
        assert!((partition_coefficient(&m).unwrap() - 0.5).abs() < 1e-12);
        assert!(modified_partition_coefficient(&m).unwrap().abs() < 1e-12);
        assert!((partition_entropy(&m).unwrap() - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_background_excluded() {
        let m = image(&[[1.0, 0.0], [0.0, 0.0]]);
        assert_eq!(partition_coefficient(&m), Some(1.0));
        let empty = image(&[[0.0, 0.0]]);
        assert_eq!(partition_coefficient(&empty), None);
        assert_eq!(partition_entropy(&empty), None);
    }
}

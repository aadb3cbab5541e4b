//! Fuzzy c-means classifiers for N-dimensional images.
//!
//! Every pixel receives a membership in `[0, 1]` for each of `c` classes,
//! with the memberships of a pixel summing to 1. Classes are represented by
//! centroids in feature space, and the algorithm alternates between
//! recomputing memberships from the centroids and centroids from the
//! memberships until the centroids stop moving.
//!
//! ## Hard vs Fuzzy Classification
//!
//! K-means gives every pixel exactly one label. Near a tissue boundary a
//! voxel is often a mixture (partial volume), and a hard label throws that
//! information away. Fuzzy c-means keeps the mixture: the membership image
//! has one channel per class, and [`crate::MembershipImage::labels`] recovers
//! the hard labelling when needed.
//!
//! ## Algorithms
//!
//! ### FCM
//!
//! The classic algorithm (Bezdek). Minimises
//!
//! ```text
//! J_m = Σᵢ Σₖ uᵢₖᵐ ‖xₖ − vᵢ‖²
//! ```
//!
//! where `m > 1` is the fuzziness exponent: `m → 1` approaches hard
//! k-means, large `m` makes every membership tend to `1/c`.
//!
//! **When to use**: clean data, or as a baseline.
//!
//! ### KFCMS
//!
//! Kernel FCM with a spatial penalty (Chen & Zhang). Distances are measured
//! in the feature space of a Gaussian-type kernel, which is less sensitive to
//! outlying intensities, and each pixel's cost includes the kernel distance
//! of its neighbours to the same centroid, weighted by `α`.
//!
//! **When to use**: noisy images where isolated pixels should follow their
//! surroundings.
//!
//! ### MSKFCM
//!
//! Two-stage spatial kernel FCM. Stage 1 is kernel FCM; stage 2 reweights
//! each membership by how strongly the neighbourhood belongs to the same
//! class, with exponents `p` and `q`.
//!
//! **When to use**: MRI-like volumes with smooth regions and noise.
//!
//! ## Engine
//!
//! All three share one driver, [`FuzzyClassifier`], parameterised by a
//! [`MembershipRule`]. The driver owns iteration control and parallelism; the
//! rule only says how memberships and centroid sums are computed. Pixel
//! regions are processed in parallel with rayon (feature `parallel`).
//!
//! ## Usage
//!
//! ```rust
//! use haze::fuzzy::{Fcm, Kfcms};
//! use haze::distance::{KernelParameters, Rbf};
//! use haze::{FeatureImage, StructuringElement};
//! use ndarray::Array2;
//!
//! let mut slice = Array2::<f32>::zeros((8, 8));
//! for ((_, col), v) in slice.indexed_iter_mut() {
//!     if col >= 4 {
//!         *v = 100.0;
//!     }
//! }
//! let image = FeatureImage::from_scalar(slice.view()).unwrap();
//!
//! let fit = Fcm::new(2).with_seed(0).fit(&image).unwrap();
//! let labels = fit.membership.label_vec();
//! assert_eq!(labels[0], labels[8]);
//! assert_ne!(labels[0], labels[7]);
//!
//! let fit = Kfcms::new(2)
//!     .with_kernel(Rbf::new(KernelParameters::new(5000.0)))
//!     .with_structuring_element(StructuringElement::cuboid(&[1, 1]))
//!     .with_centroids(vec![vec![10.0], vec![90.0]])
//!     .fit(&image)
//!     .unwrap();
//! let labels = fit.membership.label_vec();
//! assert_eq!(labels[0], 0);
//! assert_eq!(labels[7], 1);
//! ```

mod accumulator;
mod centroids;
mod engine;
mod fcm;
mod init;
mod kfcms;
mod mskfcm;
mod traits;

pub use accumulator::Accumulator;
pub use centroids::Centroids;
pub use engine::{membership_from_costs, FuzzyClassifier, FuzzyFit, PassContext};
pub use fcm::{Fcm, FcmRule};
pub use kfcms::{Kfcms, KfcmsRule};
pub use mskfcm::{Mskfcm, MskfcmRule};
pub use traits::{Clustering, MembershipRule, SoftClustering};

//! # haze
//!
//! Fuzzy c-means classification of N-dimensional images: plain FCM, kernel
//! FCM with spatial constraints (KFCMS) and modified spatial kernel FCM
//! (MSKFCM), over kernel-induced distances.
//!
//! Images go in as [`FeatureImage`] (scalar or multi-component, any
//! dimensionality), memberships come out as a [`MembershipImage`] with one
//! channel per class. The classifiers share one iterative engine that splits
//! the image into regions and processes them in parallel (feature
//! `parallel`, on by default).
//!
//! ```rust
//! use haze::{Fcm, FeatureImage};
//!
//! let image = FeatureImage::from_shape_vec(vec![2, 3], 1, vec![0.0, 0.0, 9.0, 0.0, 9.0, 9.0]).unwrap();
//! let fit = Fcm::new(2).with_seed(7).fit(&image).unwrap();
//! let labels = fit.membership.labels().unwrap();
//! assert_eq!(labels[[0, 0]], labels[[1, 0]]);
//! assert_ne!(labels[[0, 0]], labels[[1, 2]]);
//! ```
//!
//! The crate logs through the `log` facade and installs no logger.

#![forbid(unsafe_code)]

pub mod distance;
/// Error types used across `haze`.
pub mod error;
pub mod fuzzy;
pub mod image;
pub mod neighborhood;
pub mod validity;

pub use distance::{DistanceMetric, Euclidean, Grbf, KernelInducedDistanceMetric, KernelParameters, Rbf};
pub use error::{Error, Result};
pub use fuzzy::{Clustering, Fcm, FuzzyClassifier, FuzzyFit, Kfcms, MembershipRule, Mskfcm, SoftClustering};
pub use image::{FeatureImage, MembershipImage, UNCLASSIFIED};
pub use neighborhood::StructuringElement;
pub use validity::{modified_partition_coefficient, partition_coefficient, partition_entropy};

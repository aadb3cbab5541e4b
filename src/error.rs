use core::fmt;

/// Result alias for `haze`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the fuzzy classifiers and their inputs.
///
/// Every variant is raised while validating a run, before the first
/// iteration starts. Conditions that arise mid-run (an empty cluster, hitting
/// the iteration cap) are not errors; see [`crate::FuzzyFit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty (no pixels, or no pixel left after background removal).
    EmptyInput,

    /// Vector dimension mismatch.
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Shape mismatch (string description).
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// Invalid number of classes requested.
    InvalidClassCount {
        /// Requested count.
        requested: usize,
    },

    /// Seed centroids do not match the number of classes.
    CentroidCountMismatch {
        /// Number of classes.
        expected: usize,
        /// Number of centroids supplied.
        found: usize,
    },

    /// A kernel classifier was run without a kernel-induced distance metric.
    MissingKernel,

    /// A spatial classifier was run with an empty structuring element.
    EmptyStructuringElement,

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// The worker pool could not be created.
    ThreadPool(String),

    /// Generic error with message.
    Other(String),
}

impl Error {
    /// True for misconfiguration of the classifier itself, as opposed to
    /// malformed input data or runtime plumbing.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidClassCount { .. }
                | Error::CentroidCountMismatch { .. }
                | Error::MissingKernel
                | Error::EmptyStructuringElement
                | Error::InvalidParameter { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, actual {actual}")
            }
            Error::InvalidClassCount { requested } => {
                write!(f, "cannot classify into {requested} classes")
            }
            Error::CentroidCountMismatch { expected, found } => {
                write!(f, "expected {expected} centroids (one per class), found {found}")
            }
            Error::MissingKernel => write!(f, "no kernel-induced distance metric set"),
            Error::EmptyStructuringElement => write!(f, "structuring element is empty"),
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::ThreadPool(msg) => write!(f, "thread pool: {msg}"),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

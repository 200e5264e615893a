//! Error types for neighbour-count sweeps.
//!
//! Every failure aborts the sweep that raised it. The driver wraps errors
//! with the K value and run index that were in progress.

use std::process::ExitCode;
use thiserror::Error;

/// Coarse classification of a [`SweepError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid N, fold count, run count or K grid.
    Configuration,
    /// Dataset missing, unreadable or corrupt.
    DataLoad,
    /// The evaluator failed during a run.
    Evaluation,
    /// Underlying I/O failure.
    Io,
}

impl ErrorKind {
    /// Stable lowercase name used in error reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::DataLoad => "data-load",
            Self::Evaluation => "evaluation",
            Self::Io => "io",
        }
    }
}

/// Main error type for sweep operations.
///
/// # Examples
///
/// ```
/// use aprender_knn_sweep::error::{ErrorKind, SweepError};
///
/// let err = SweepError::invalid_config("folds", 1, "at least 2");
/// assert_eq!(err.kind(), ErrorKind::Configuration);
/// assert!(err.to_string().contains("folds = 1"));
/// ```
#[derive(Error, Debug)]
pub enum SweepError {
    /// A configuration value violates its constraint.
    #[error("Invalid configuration: {param} = {value}, expected {constraint}")]
    Configuration {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// The dataset could not be loaded.
    #[error("Failed to load dataset '{dataset}': {message}")]
    DataLoad {
        /// Dataset name as requested
        dataset: String,
        /// Failure description
        message: String,
    },

    /// The evaluator could not produce an accuracy.
    #[error("Evaluation failed: {message}")]
    Evaluation {
        /// Failure description
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure raised while a specific (K, run) pair was in progress.
    #[error("K={k}, run {run}: {source}")]
    InRun {
        /// Neighbour count being evaluated
        k: usize,
        /// Zero-based run index
        run: usize,
        /// Underlying failure
        #[source]
        source: Box<SweepError>,
    },
}

impl SweepError {
    /// Create a configuration error.
    #[must_use]
    pub fn invalid_config(
        param: &str,
        value: impl ToString,
        constraint: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.into(),
        }
    }

    /// Create a dataset load error.
    #[must_use]
    pub fn data_load(dataset: &str, message: impl Into<String>) -> Self {
        Self::DataLoad {
            dataset: dataset.to_string(),
            message: message.into(),
        }
    }

    /// Create an evaluation error.
    #[must_use]
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Attach the (K, run) pair that was in progress.
    #[must_use]
    pub fn in_run(self, k: usize, run: usize) -> Self {
        Self::InRun {
            k,
            run,
            source: Box::new(self),
        }
    }

    /// Classify this error, looking through run context.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::DataLoad { .. } => ErrorKind::DataLoad,
            Self::Evaluation { .. } => ErrorKind::Evaluation,
            Self::Io(_) => ErrorKind::Io,
            Self::InRun { source, .. } => source.kind(),
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self.kind() {
            ErrorKind::Configuration => ExitCode::from(2),
            ErrorKind::DataLoad => ExitCode::from(3),
            ErrorKind::Evaluation => ExitCode::from(4),
            ErrorKind::Io => ExitCode::from(7),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, SweepError>;

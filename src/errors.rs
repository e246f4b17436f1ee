//! Configuration pipeline error taxonomy.

use thiserror::Error;

use crate::validation::ViolationSet;

/// Errors surfaced by the configuration pipeline.
///
/// Decode and validation failures aggregate every problem found at their
/// stage into a [`ViolationSet`] before aborting; nothing here is
/// fail-fast.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration location did not resolve to a readable source.
    #[error("configuration source not found: {location}")]
    SourceNotFound {
        /// The location that failed to resolve.
        location: String,
    },

    /// The source resolved but could not be read.
    #[error("unable to read configuration source {location}")]
    SourceUnreadable {
        /// The location that failed to read.
        location: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The source could not be decoded into the configuration type: syntax
    /// errors, unknown fields, type mismatches, malformed unit literals.
    #[error("{location} could not be parsed:\n{violations}")]
    Malformed {
        /// The location that was being decoded.
        location: String,
        /// Every decode problem found, in order.
        violations: ViolationSet,
    },

    /// The configuration decoded but failed validation.
    #[error("{location} has validation errors:\n{violations}")]
    Invalid {
        /// The location that was being validated.
        location: String,
        /// Every constraint and cross-field violation found, in order.
        violations: ViolationSet,
    },
}

impl ConfigError {
    /// The aggregated violations for decode or validation failures, if any.
    pub fn violations(&self) -> Option<&ViolationSet> {
        match self {
            Self::Malformed { violations, .. } | Self::Invalid { violations, .. } => {
                Some(violations)
            }
            _ => None,
        }
    }
}

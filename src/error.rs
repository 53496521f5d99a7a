//! Error types returned by the advisory matcher.

use crate::store::StoreError;

/// Errors produced while matching a package version against advisories.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The advisory store could not answer the lookup.
    #[error("failed to get {ecosystem} advisories: {source}")]
    Retrieval {
        ecosystem: String,
        #[source]
        source: StoreError,
    },

    /// An advisory carries a version constraint that cannot be parsed.
    #[error("invalid version constraint {constraint:?}: {source}")]
    ConstraintParse {
        constraint: String,
        #[source]
        source: semver::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

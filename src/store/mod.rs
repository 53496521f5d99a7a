//! Advisory storage.
//!
//! The matcher only needs the [`AdvisoryStore`] trait: given an ecosystem
//! prefix and a package name, return every known advisory. [`MemoryStore`]
//! is the bundled implementation, loaded from a JSON document or a directory
//! of advisory files.
//!
//! # Bucket Layout
//!
//! Advisories are grouped into buckets named `"<ecosystem>::<data source>"`,
//! for example `"npm::GitHub Security Advisory npm"`. A lookup for prefix
//! `"npm::"` reads every bucket starting with that prefix.
//!
//! # Example
//!
//! ```
//! use vulnrange::store::{AdvisoryStore, MemoryStore};
//! use vulnrange::Advisory;
//!
//! let mut store = MemoryStore::new();
//! store.insert(
//!     "npm::Node.js Security Working Group",
//!     "lodash",
//!     Advisory::new("CVE-2019-10744").with_vulnerable(["<4.17.12"]),
//! );
//!
//! let advisories = store.get_advisories("npm::", "lodash").unwrap();
//! assert_eq!(advisories.len(), 1);
//! ```

mod memory;

pub use memory::MemoryStore;

use crate::model::Advisory;
use std::path::PathBuf;
use std::sync::Arc;

/// Errors raised while loading or querying an advisory store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid advisory JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A file sits where the directory layout expects a bucket or package.
    #[error("unexpected advisory file location: {}", .path.display())]
    Layout { path: PathBuf },

    #[error("failed to walk advisory directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Source of advisories for the matcher.
///
/// Implementations must return every advisory for the exact package name
/// within buckets starting with `prefix`. The order returned is preserved
/// in detection output.
pub trait AdvisoryStore: Send + Sync {
    fn name(&self) -> &str;

    fn get_advisories(&self, prefix: &str, package_name: &str)
        -> Result<Vec<Advisory>, StoreError>;
}

impl<T: AdvisoryStore + ?Sized> AdvisoryStore for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get_advisories(
        &self,
        prefix: &str,
        package_name: &str,
    ) -> Result<Vec<Advisory>, StoreError> {
        (**self).get_advisories(prefix, package_name)
    }
}

impl<T: AdvisoryStore + ?Sized> AdvisoryStore for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get_advisories(
        &self,
        prefix: &str,
        package_name: &str,
    ) -> Result<Vec<Advisory>, StoreError> {
        (**self).get_advisories(prefix, package_name)
    }
}

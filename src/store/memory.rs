use super::{AdvisoryStore, StoreError};
use crate::model::Advisory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::ops::Bound;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Advisories per package name within one bucket.
type Bucket = BTreeMap<String, Vec<Advisory>>;

/// An advisory store held entirely in memory.
///
/// Buckets are kept in name order, and advisories for a package keep the
/// order they were inserted in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    buckets: BTreeMap<String, Bucket>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        bucket: impl Into<String>,
        package_name: impl Into<String>,
        advisory: Advisory,
    ) {
        self.buckets
            .entry(bucket.into())
            .or_default()
            .entry(package_name.into())
            .or_default()
            .push(advisory);
    }

    /// Total number of advisories across all buckets.
    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads a store from a directory tree or a single JSON document,
    /// depending on what `path` points at.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::from_json_file(path)
        }
    }

    /// Reads a JSON document shaped `{ bucket: { package: [advisory, ...] } }`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store: MemoryStore =
            serde_json::from_str(&content).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            buckets = store.buckets.len(),
            advisories = store.len(),
            "loaded advisory file"
        );
        Ok(store)
    }

    /// Reads a directory laid out as `<root>/<bucket>/<package...>/<ID>.json`.
    ///
    /// Package names may span several directories (`@scope/name`, Go module
    /// paths). An advisory without a `VulnerabilityID` takes the file stem.
    /// Files without a `.json` extension are skipped.
    pub fn load_dir(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let mut store = Self::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();

            let is_json = path.extension().is_some_and(|ext| ext == "json");
            if !entry.file_type().is_file() || !is_json {
                continue;
            }

            let layout_error = || StoreError::Layout {
                path: path.to_path_buf(),
            };
            let components: Vec<String> = path
                .strip_prefix(root)
                .map_err(|_| layout_error())?
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();

            // bucket, at least one package component, file
            if components.len() < 3 {
                return Err(layout_error());
            }
            let bucket = &components[0];
            let package_name = components[1..components.len() - 1].join("/");

            let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut advisory: Advisory =
                serde_json::from_str(&content).map_err(|source| StoreError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;

            if advisory.vulnerability_id.is_empty() {
                if let Some(stem) = path.file_stem() {
                    advisory.vulnerability_id = stem.to_string_lossy().into_owned();
                }
            }

            debug!(
                bucket = %bucket,
                package = %package_name,
                id = %advisory.vulnerability_id,
                "loaded advisory"
            );
            store.insert(bucket.as_str(), package_name, advisory);
        }

        info!(
            path = %root.display(),
            buckets = store.buckets.len(),
            advisories = store.len(),
            "loaded advisory directory"
        );
        Ok(store)
    }
}

impl AdvisoryStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get_advisories(
        &self,
        prefix: &str,
        package_name: &str,
    ) -> Result<Vec<Advisory>, StoreError> {
        let mut advisories = Vec::new();

        let candidates = self
            .buckets
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded));

        for (name, bucket) in candidates {
            if !name.starts_with(prefix) {
                break;
            }
            if let Some(found) = bucket.get(package_name) {
                advisories.extend(found.iter().cloned());
            }
        }

        Ok(advisories)
    }
}

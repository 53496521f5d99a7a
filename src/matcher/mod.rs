//! Matching installed versions against advisories.
//!
//! [`AdvisoryMatcher`] ties the pieces together: it asks an
//! [`AdvisoryStore`] for the package's advisories, lets the ecosystem's
//! [`Comparer`] decide which apply, and derives the fixed version for each
//! hit with [`fixed_versions`].
//!
//! # Example
//!
//! ```
//! use semver::Version;
//! use vulnrange::matcher::AdvisoryMatcher;
//! use vulnrange::store::MemoryStore;
//! use vulnrange::{Advisory, Ecosystem};
//!
//! let mut store = MemoryStore::new();
//! store.insert("npm::ghsa", "foo", Advisory::new("CVE-2024-0001").with_vulnerable(["<2.0.0"]));
//!
//! let matcher = AdvisoryMatcher::new(Ecosystem::Npm, store);
//! let found = matcher.detect("foo", &Version::new(1, 4, 0)).unwrap();
//!
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].fixed_version, "2.0.0");
//! ```

mod comparer;
mod fixed;
mod range;

pub use comparer::Comparer;
pub use fixed::fixed_versions;
pub use range::{match_versions, VersionRange};

use crate::error::{Error, Result};
use crate::model::{DetectedVulnerability, Ecosystem};
use crate::store::AdvisoryStore;
use semver::Version;

/// Detects advisories that apply to packages of one ecosystem.
///
/// The matcher keeps no state between calls; each [`detect`](Self::detect)
/// performs exactly one store lookup.
pub struct AdvisoryMatcher<S> {
    ecosystem: Ecosystem,
    comparer: Comparer,
    store: S,
}

impl<S: AdvisoryStore> AdvisoryMatcher<S> {
    pub fn new(ecosystem: Ecosystem, store: S) -> Self {
        Self {
            comparer: Comparer::for_ecosystem(&ecosystem),
            ecosystem,
            store,
        }
    }

    pub fn ecosystem(&self) -> &Ecosystem {
        &self.ecosystem
    }

    pub fn comparer(&self) -> Comparer {
        self.comparer
    }

    /// Returns one record per applicable advisory, in store order.
    ///
    /// # Errors
    ///
    /// [`Error::Retrieval`] if the store lookup fails, and
    /// [`Error::ConstraintParse`] if an advisory holds a malformed range.
    /// No partial results are returned in either case.
    pub fn detect(
        &self,
        package_name: &str,
        version: &Version,
    ) -> Result<Vec<DetectedVulnerability>> {
        let advisories = self
            .store
            .get_advisories(&self.ecosystem.prefix(), package_name)
            .map_err(|source| Error::Retrieval {
                ecosystem: self.ecosystem.to_string(),
                source,
            })?;

        let mut vulns = Vec::new();
        for advisory in &advisories {
            if !self.comparer.is_vulnerable(version, advisory)? {
                continue;
            }

            vulns.push(DetectedVulnerability {
                vulnerability_id: advisory.vulnerability_id.clone(),
                package_name: package_name.to_string(),
                installed_version: version.to_string(),
                fixed_version: fixed_versions(advisory),
            });
        }

        Ok(vulns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Advisory;
    use crate::store::{MemoryStore, StoreError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn store_with(package: &str, advisories: Vec<Advisory>) -> MemoryStore {
        let mut store = MemoryStore::new();
        for advisory in advisories {
            store.insert("npm::test", package, advisory);
        }
        store
    }

    /// Store that always fails, counting how often it was asked.
    struct FailingStore {
        calls: AtomicUsize,
    }

    impl AdvisoryStore for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        fn get_advisories(&self, _: &str, _: &str) -> std::result::Result<Vec<Advisory>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Io {
                path: "advisories.db".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        }
    }

    /// Store that records the lookup key it was given.
    struct RecordingStore {
        seen: std::sync::Mutex<Vec<(String, String)>>,
    }

    impl AdvisoryStore for RecordingStore {
        fn name(&self) -> &str {
            "recording"
        }

        fn get_advisories(
            &self,
            prefix: &str,
            package_name: &str,
        ) -> std::result::Result<Vec<Advisory>, StoreError> {
            self.seen
                .lock()
                .unwrap()
                .push((prefix.to_string(), package_name.to_string()));
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_detect_vulnerable_version() {
        let store = store_with("foo", vec![Advisory::new("CVE-1").with_vulnerable(["<2.0.0"])]);
        let matcher = AdvisoryMatcher::new(Ecosystem::Npm, store);

        let found = matcher.detect("foo", &v("1.4.0")).unwrap();
        assert_eq!(
            found,
            vec![DetectedVulnerability {
                vulnerability_id: "CVE-1".to_string(),
                package_name: "foo".to_string(),
                installed_version: "1.4.0".to_string(),
                fixed_version: "2.0.0".to_string(),
            }]
        );
    }

    #[test]
    fn test_detect_safe_version() {
        let store = store_with("bar", vec![Advisory::new("CVE-1").with_vulnerable(["<2.0.0"])]);
        let matcher = AdvisoryMatcher::new(Ecosystem::Npm, store);

        assert!(matcher.detect("bar", &v("3.0.0")).unwrap().is_empty());
    }

    #[test]
    fn test_detect_no_advisories() {
        let matcher = AdvisoryMatcher::new(Ecosystem::Npm, MemoryStore::new());
        assert!(matcher.detect("baz", &v("1.0.0")).unwrap().is_empty());
    }

    #[test]
    fn test_detect_preserves_store_order_without_dedup() {
        let store = store_with(
            "foo",
            vec![
                Advisory::new("CVE-3").with_vulnerable(["<2.0.0"]),
                Advisory::new("CVE-1").with_patched([">=1.0.0"]),
                Advisory::new("CVE-2"),
                Advisory::new("CVE-3").with_vulnerable([">=0.1.0, <0.9.0"]),
            ],
        );
        let matcher = AdvisoryMatcher::new(Ecosystem::Npm, store);

        let found = matcher.detect("foo", &v("0.5.0")).unwrap();
        let ids: Vec<_> = found.iter().map(|f| f.vulnerability_id.as_str()).collect();
        assert_eq!(ids, vec!["CVE-3", "CVE-1", "CVE-2", "CVE-3"]);
        assert_eq!(found[1].fixed_version, ">=1.0.0");
        assert_eq!(found[2].fixed_version, "");
        assert_eq!(found[3].fixed_version, "0.9.0");
    }

    #[test]
    fn test_detect_uses_namespaced_key() {
        let store = RecordingStore {
            seen: Default::default(),
        };
        let matcher = AdvisoryMatcher::new("composer".parse().unwrap(), &store);

        matcher.detect("symfony/http-kernel", &v("4.4.0")).unwrap();
        assert_eq!(
            *store.seen.lock().unwrap(),
            vec![("composer::".to_string(), "symfony/http-kernel".to_string())]
        );
    }

    #[test]
    fn test_detect_ignores_other_ecosystems() {
        let mut store = MemoryStore::new();
        store.insert("pip::ghsa", "requests", Advisory::new("PYSEC-1"));
        let matcher = AdvisoryMatcher::new(Ecosystem::Npm, store);

        assert!(matcher.detect("requests", &v("2.0.0")).unwrap().is_empty());
    }

    #[test]
    fn test_detect_retrieval_failure() {
        let store = FailingStore {
            calls: AtomicUsize::new(0),
        };
        let matcher = AdvisoryMatcher::new(Ecosystem::Cargo, &store);

        let err = matcher.detect("smallvec", &v("1.0.0")).unwrap_err();
        assert!(matches!(err, Error::Retrieval { ref ecosystem, .. } if ecosystem == "cargo"));
        assert!(err.to_string().starts_with("failed to get cargo advisories"));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detect_constraint_failure_has_no_partial_results() {
        let store = store_with(
            "foo",
            vec![
                Advisory::new("CVE-1").with_vulnerable(["<2.0.0"]),
                Advisory::new("CVE-2").with_vulnerable(["<<2.0.0"]),
            ],
        );
        let matcher = AdvisoryMatcher::new(Ecosystem::Npm, store);

        let err = matcher.detect("foo", &v("1.0.0")).unwrap_err();
        assert!(matches!(err, Error::ConstraintParse { .. }));
    }

    #[test]
    fn test_matcher_shared_across_threads() {
        let store = Arc::new(store_with(
            "foo",
            vec![Advisory::new("CVE-1").with_vulnerable(["<2.0.0"])],
        ));
        let matcher = Arc::new(AdvisoryMatcher::new(Ecosystem::Npm, store));

        let handles: Vec<_> = ["1.0.0", "2.5.0"]
            .into_iter()
            .map(|version| {
                let matcher = Arc::clone(&matcher);
                std::thread::spawn(move || matcher.detect("foo", &v(version)).unwrap().len())
            })
            .collect();

        let counts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(counts, vec![1, 0]);
    }

    #[test]
    fn test_detect_rubygems_pessimistic_ranges_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("advisories.json");
        std::fs::write(
            &path,
            r#"{
                "rubygems::ruby-advisory-db": {
                    "rack": [
                        {"VulnerabilityID": "CVE-2020-8161", "PatchedVersions": ["~> 2.1.3", ">= 2.2.0"]},
                        {"VulnerabilityID": "CVE-2019-16782", "PatchedVersions": ["~> 1.6.12", "=> 2.0.8"]},
                        {"VulnerabilityID": "CVE-2022-30123", "VulnerableVersions": [">= 2.0.0 < 2.0.9", "=< 1.6.13"]}
                    ]
                }
            }"#,
        )
        .unwrap();
        let matcher = AdvisoryMatcher::new(Ecosystem::RubyGems, MemoryStore::load(&path).unwrap());

        assert!(matcher.detect("rack", &v("2.1.4")).unwrap().is_empty());

        let found = matcher.detect("rack", &v("2.1.2")).unwrap();
        let ids: Vec<_> = found.iter().map(|f| f.vulnerability_id.as_str()).collect();
        assert_eq!(ids, vec!["CVE-2020-8161"]);
        assert_eq!(found[0].fixed_version, "~> 2.1.3, >= 2.2.0");

        let found = matcher.detect("rack", &v("1.6.0")).unwrap();
        let ids: Vec<_> = found.iter().map(|f| f.vulnerability_id.as_str()).collect();
        assert_eq!(ids, vec!["CVE-2020-8161", "CVE-2019-16782", "CVE-2022-30123"]);
        // Space-joined bounds are not split for the fixed-version string.
        assert_eq!(found[2].fixed_version, "");
    }

    #[test]
    fn test_matcher_selects_comparer() {
        let matcher = AdvisoryMatcher::new(Ecosystem::Maven, MemoryStore::new());
        assert_eq!(matcher.comparer(), Comparer::General);
        assert_eq!(matcher.ecosystem(), &Ecosystem::Maven);
    }
}

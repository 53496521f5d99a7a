use serde::{Deserialize, Serialize};

use super::Ecosystem;

/// A known issue for one package in one ecosystem.
///
/// Field names follow the advisory DB's JSON layout, so stored advisories
/// deserialize directly. Missing version lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Advisory {
    #[serde(rename = "VulnerabilityID")]
    pub vulnerability_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vulnerable_versions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patched_versions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unaffected_versions: Vec<String>,
}

impl Advisory {
    pub fn new(vulnerability_id: impl Into<String>) -> Self {
        Self {
            vulnerability_id: vulnerability_id.into(),
            ..Self::default()
        }
    }

    pub fn with_vulnerable<I, S>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vulnerable_versions = ranges.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_patched<I, S>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patched_versions = ranges.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unaffected<I, S>(mut self, ranges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unaffected_versions = ranges.into_iter().map(Into::into).collect();
        self
    }
}

/// An advisory that applies to an installed package version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedVulnerability {
    pub vulnerability_id: String,
    pub package_name: String,
    pub installed_version: String,
    /// Comma-joined fixed versions; empty when no fix is known.
    pub fixed_version: String,
}

/// Result of checking a single package version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub ecosystem: Ecosystem,
    pub package_name: String,
    pub installed_version: String,
    pub vulnerabilities: Vec<DetectedVulnerability>,
}

impl CheckReport {
    pub fn new(
        ecosystem: Ecosystem,
        package_name: impl Into<String>,
        installed_version: impl Into<String>,
        vulnerabilities: Vec<DetectedVulnerability>,
    ) -> Self {
        Self {
            ecosystem,
            package_name: package_name.into(),
            installed_version: installed_version.into(),
            vulnerabilities,
        }
    }

    pub fn is_vulnerable(&self) -> bool {
        !self.vulnerabilities.is_empty()
    }

    /// Drops vulnerabilities whose ID satisfies `ignored`.
    pub fn retain_unignored(&mut self, ignored: impl Fn(&str) -> bool) {
        self.vulnerabilities
            .retain(|v| !ignored(&v.vulnerability_id));
    }
}

//! Core data types for advisories, detections, and check reports.
//!
//! - [`Ecosystem`] - The package namespace an advisory belongs to
//! - [`Advisory`] - A known issue with its affected and fixed version ranges
//! - [`DetectedVulnerability`] - An advisory that applies to an installed version
//! - [`CheckReport`] - Everything found for one package check
//!
//! # Example
//!
//! ```
//! use vulnrange::{Advisory, Ecosystem};
//!
//! let ecosystem: Ecosystem = "npm".parse().unwrap();
//! assert_eq!(ecosystem.prefix(), "npm::");
//!
//! let advisory = Advisory::new("CVE-2021-23337").with_vulnerable(["<4.17.21"]);
//! assert_eq!(advisory.vulnerable_versions, vec!["<4.17.21"]);
//! ```

mod advisory;

pub use advisory::*;

use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Package ecosystem, used to namespace advisory lookups.
///
/// Identifiers the matcher has no special knowledge of are kept as
/// [`Ecosystem::Other`] and handled with default semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Ecosystem {
    Npm,
    Pip,
    RubyGems,
    Cargo,
    Composer,
    NuGet,
    Maven,
    Go,
    Other(String),
}

impl Ecosystem {
    /// All ecosystems with a dedicated identifier.
    pub const KNOWN: [Ecosystem; 8] = [
        Ecosystem::Npm,
        Ecosystem::Pip,
        Ecosystem::RubyGems,
        Ecosystem::Cargo,
        Ecosystem::Composer,
        Ecosystem::NuGet,
        Ecosystem::Maven,
        Ecosystem::Go,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Pip => "pip",
            Ecosystem::RubyGems => "rubygems",
            Ecosystem::Cargo => "cargo",
            Ecosystem::Composer => "composer",
            Ecosystem::NuGet => "nuget",
            Ecosystem::Maven => "maven",
            Ecosystem::Go => "go",
            Ecosystem::Other(id) => id,
        }
    }

    /// Namespaced key prefix under which this ecosystem's advisories are stored.
    pub fn prefix(&self) -> String {
        format!("{}::", self.as_str())
    }
}

impl std::str::FromStr for Ecosystem {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_lowercase();
        Ok(match id.as_str() {
            "npm" | "node" => Ecosystem::Npm,
            "pip" | "pypi" | "python" => Ecosystem::Pip,
            "rubygems" | "gem" | "ruby" => Ecosystem::RubyGems,
            "cargo" | "crates.io" | "rust" => Ecosystem::Cargo,
            "composer" | "php" => Ecosystem::Composer,
            "nuget" | "dotnet" => Ecosystem::NuGet,
            "maven" | "java" => Ecosystem::Maven,
            "go" | "golang" => Ecosystem::Go,
            _ => Ecosystem::Other(id),
        })
    }
}

impl From<String> for Ecosystem {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(ecosystem) => ecosystem,
            Err(never) => match never {},
        }
    }
}

impl From<Ecosystem> for String {
    fn from(ecosystem: Ecosystem) -> Self {
        ecosystem.as_str().to_string()
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

use semver::Version;

use super::range::match_versions;
use crate::error::Result;
use crate::model::{Advisory, Ecosystem};

/// Strategy deciding whether an advisory applies to a version.
///
/// Each ecosystem is mapped to exactly one variant in
/// [`Comparer::for_ecosystem`]. Ecosystems whose versions need their own
/// ordering rules get a new variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparer {
    /// Semantic-version ranges with "explicit vulnerable range wins" rules.
    General,
}

impl Comparer {
    pub fn for_ecosystem(ecosystem: &Ecosystem) -> Self {
        match ecosystem {
            // Maven qualifiers (e.g. `-SNAPSHOT`, `.Final`) still compare as semver here.
            Ecosystem::Maven => Comparer::General,
            Ecosystem::Npm
            | Ecosystem::Pip
            | Ecosystem::RubyGems
            | Ecosystem::Cargo
            | Ecosystem::Composer
            | Ecosystem::NuGet
            | Ecosystem::Go
            | Ecosystem::Other(_) => Comparer::General,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Comparer::General => "general",
        }
    }

    pub fn is_vulnerable(&self, version: &Version, advisory: &Advisory) -> Result<bool> {
        match self {
            Comparer::General => general_is_vulnerable(version, advisory),
        }
    }
}

/// An explicit vulnerable range is authoritative. Without one, the version
/// is vulnerable unless it is covered by a patched or unaffected range.
fn general_is_vulnerable(version: &Version, advisory: &Advisory) -> Result<bool> {
    if !advisory.vulnerable_versions.is_empty() {
        return match_versions(version, &advisory.vulnerable_versions);
    }

    if match_versions(version, &advisory.patched_versions)?
        || match_versions(version, &advisory.unaffected_versions)?
    {
        return Ok(false);
    }

    Ok(true)
}

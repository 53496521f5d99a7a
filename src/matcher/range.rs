//! Version range constraints as written in advisories.
//!
//! A range entry is one or more alternatives separated by `||`; each
//! alternative is a list of comparators, separated by commas or whitespace,
//! that must all hold. An advisory field holding several entries matches
//! when any entry does.
//!
//! Comparators follow [`semver::VersionReq`] with a few additions from the
//! advisory DB grammar: a bare version means exact equality, `!=` excludes a
//! single version, `~>`, `=>` and `=<` are aliases of `~`, `>=` and `<=`, and
//! a `v` prefix on the version is ignored.

use semver::{Version, VersionReq};

use crate::error::{Error, Result};

const OPERATOR_CHARS: [char; 6] = ['<', '>', '=', '~', '^', '!'];

/// A parsed range entry, e.g. `">=1.0.0, <1.5.0 || >=2.0.0, <2.0.3"`.
#[derive(Debug, Clone)]
pub struct VersionRange {
    alternatives: Vec<ConstraintGroup>,
}

#[derive(Debug, Clone)]
struct ConstraintGroup {
    req: VersionReq,
    excluded: Vec<Version>,
}

impl VersionRange {
    pub fn parse(entry: &str) -> Result<Self> {
        let alternatives = entry
            .split("||")
            .map(|group| ConstraintGroup::parse(group, entry))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { alternatives })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|group| group.matches(version))
    }
}

impl ConstraintGroup {
    fn parse(group: &str, entry: &str) -> Result<Self> {
        let mut comparators = Vec::new();
        let mut excluded = Vec::new();

        for comparator in group.split(',').flat_map(split_comparators) {
            if let Some(rest) = comparator.strip_prefix("!=") {
                let version = Version::parse(strip_v(rest))
                    .map_err(|source| constraint_error(entry, source))?;
                excluded.push(version);
            } else {
                comparators.push(normalize(&comparator));
            }
        }

        // A group made only of exclusions accepts everything else.
        let req = if comparators.is_empty() {
            VersionReq::STAR
        } else {
            VersionReq::parse(&comparators.join(", "))
                .map_err(|source| constraint_error(entry, source))?
        };

        Ok(Self { req, excluded })
    }

    fn matches(&self, version: &Version) -> bool {
        self.req.matches(version) && !self.excluded.contains(version)
    }
}

/// Splits one comma-separated token into whitespace-separated comparators,
/// e.g. `">= 1.0.0 < 2.0.0"` into `[">=1.0.0", "<2.0.0"]`.
///
/// Whitespace between an operator and its version is dropped. A blank
/// token yields one empty comparator so that it fails to parse.
fn split_comparators(token: &str) -> Vec<String> {
    let mut comparators: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in token.split_whitespace() {
        if has_version(&current) {
            comparators.push(std::mem::take(&mut current));
        }
        current.push_str(word);
    }

    if !current.is_empty() || comparators.is_empty() {
        comparators.push(current);
    }
    comparators
}

fn has_version(comparator: &str) -> bool {
    comparator.chars().any(|c| !OPERATOR_CHARS.contains(&c))
}

/// Rewrites a comparator into the form `VersionReq` understands.
fn normalize(comparator: &str) -> String {
    let split = comparator
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(comparator.len());
    let (op, rest) = comparator.split_at(split);
    let rest = strip_v(rest);

    let op = match op {
        "~>" => "~",
        "=>" => ">=",
        "=<" => "<=",
        op => op,
    };

    if op.is_empty() && rest != "*" {
        format!("={rest}")
    } else {
        format!("{op}{rest}")
    }
}

fn strip_v(version: &str) -> &str {
    version
        .strip_prefix(['v', 'V'])
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(version)
}

fn constraint_error(entry: &str, source: semver::Error) -> Error {
    Error::ConstraintParse {
        constraint: entry.to_string(),
        source,
    }
}

/// Reports whether `version` satisfies any of the range entries.
///
/// An empty list never matches. Every entry is parsed before any is
/// evaluated, so a malformed entry is reported even when an earlier one
/// would have matched.
pub fn match_versions(version: &Version, ranges: &[String]) -> Result<bool> {
    let ranges = ranges
        .iter()
        .map(|entry| VersionRange::parse(entry))
        .collect::<Result<Vec<_>>>()?;

    Ok(ranges.iter().any(|range| range.matches(version)))
}

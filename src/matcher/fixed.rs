use crate::model::Advisory;

/// Derives the display string of versions that fix `advisory`.
///
/// Patched ranges are used verbatim when present. Otherwise every strict
/// upper bound (`<X`, not `<=X`) in the vulnerable ranges is taken as a
/// fixed version, in order and without deduplication. Empty means no known
/// fix.
pub fn fixed_versions(advisory: &Advisory) -> String {
    if !advisory.patched_versions.is_empty() {
        return advisory.patched_versions.join(", ");
    }

    let fixed: Vec<&str> = advisory
        .vulnerable_versions
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|token| !token.starts_with("<="))
        .filter_map(|token| token.strip_prefix('<'))
        .map(str::trim)
        .collect();

    fixed.join(", ")
}

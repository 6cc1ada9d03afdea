/// Returns `true` if `document_name` looks like a changelog.
///
/// A document qualifies when any indicator is a case-insensitive substring of
/// its name, so `docs/CHANGELOG` and `release-notes` both match the default
/// indicators.
#[must_use]
pub fn is_changelog<S: AsRef<str>>(document_name: &str, indicators: &[S]) -> bool {
    let name = document_name.to_lowercase();
    indicators
        .iter()
        .any(|indicator| name.contains(&indicator.as_ref().to_lowercase()))
}

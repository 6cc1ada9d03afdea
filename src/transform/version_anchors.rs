use regex::Regex;
use tracing::instrument;

use super::{Outcome, PatternError, Transform, compile, is_changelog};
use crate::domain::{Document, Label, Registrar, Section, VersionAnchorsSettings};

/// Gives version headings in changelogs a predictable anchor.
///
/// With the default settings, a section titled `25.5.0 (2025-05-21)` gets the
/// id `version-25.5.0`, which is also registered as a cross-reference label.
#[derive(Debug)]
pub struct VersionAnchors {
    settings: VersionAnchorsSettings,
    pattern: Result<Regex, PatternError>,
}

impl VersionAnchors {
    /// Creates the transform, compiling the configured heading pattern.
    #[must_use]
    pub fn new(settings: VersionAnchorsSettings) -> Self {
        let pattern = compile(&settings.pattern, 1, true);
        if let Err(e) = &pattern {
            tracing::debug!("version anchors disabled: {e}");
        }
        Self { settings, pattern }
    }

    /// Returns the version in `heading`, if it is a version heading.
    #[must_use]
    pub fn version<'h>(&self, heading: &'h str) -> Option<&'h str> {
        let pattern = self.pattern.as_ref().ok()?;
        version_in(pattern, heading)
    }
}

fn version_in<'h>(pattern: &Regex, heading: &'h str) -> Option<&'h str> {
    pattern
        .captures(heading.trim())
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

impl Transform for VersionAnchors {
    fn name(&self) -> &'static str {
        "version_anchors"
    }

    #[instrument(level = "debug", skip_all, fields(document = document.name()))]
    fn apply(&self, document: &mut Document, registrar: &mut dyn Registrar) -> Outcome {
        if !is_changelog(document.name(), &self.settings.changelog_files) {
            return Outcome::NotApplicable;
        }

        let pattern = match &self.pattern {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!(
                    "invalid version_anchors.pattern, skipping '{}': {e}",
                    document.name()
                );
                return Outcome::Skipped(e.to_string());
            }
        };

        let mut matches = Vec::new();
        document.visit_sections(&mut |path: &[usize], section: &Section| {
            let title = section.title_text();
            if let Some(version) = version_in(pattern, &title) {
                let anchor = self.settings.format.anchor(version);
                matches.push((path.to_vec(), anchor, title.trim().to_string()));
            }
        });

        let changes = matches.len();
        for (path, anchor, title) in matches {
            tracing::debug!("anchoring '{title}' as '{anchor}'");
            document.set_section_id(&path, anchor.clone());
            registrar.register(Label {
                docname: document.name().to_string(),
                anchor,
                title,
            });
        }

        if changes > 0 {
            tracing::info!("added {changes} version anchor(s) to '{}'", document.name());
        }
        Outcome::Applied { changes }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{
        Block, DEFAULT_VERSION_PATTERN, Inline, LabelTable, VersionAnchorsConfig,
    };

    fn transform(pattern: &str, format: &str) -> VersionAnchors {
        VersionAnchors::new(
            VersionAnchorsSettings::try_from(VersionAnchorsConfig {
                pattern: pattern.to_string(),
                format: format.to_string(),
                ..VersionAnchorsConfig::default()
            })
            .unwrap(),
        )
    }

    fn default_transform() -> VersionAnchors {
        transform(DEFAULT_VERSION_PATTERN, "version-{version}")
    }

    fn changelog(name: &str) -> Document {
        Document::new(
            name,
            vec![Block::Section(Section {
                ids: vec!["changelog".to_string()],
                title: vec![Inline::text("Changelog")],
                children: vec![
                    Block::Section(Section::new(
                        "25.5.0 (2025-05-21)",
                        vec![Block::Paragraph(vec![Inline::text("Fixed (#1)")])],
                    )),
                    Block::Section(Section::new("  1.5 (Released on 2025-03-10)  ", Vec::new())),
                    Block::Section(Section::new("Unreleased", Vec::new())),
                ],
            })],
        )
    }

    #[test_case("1.2.3 (2025-01-24)", "1.2.3"; "patch")]
    #[test_case("25.5.0 (2025-05-21)", "25.5.0"; "calver")]
    #[test_case("0.1.0 (2025-12-31)", "0.1.0"; "zero major")]
    #[test_case("2.0 (2025-06-15)", "2.0"; "two parts")]
    #[test_case("1.5 (Released on 2025-03-10)", "1.5"; "text in parentheses")]
    #[test_case("10.20.30 (Beta release)", "10.20.30"; "multi digit")]
    fn default_pattern_finds_version(heading: &str, expected: &str) {
        assert_eq!(default_transform().version(heading), Some(expected));
    }

    #[test_case("Introduction"; "no version")]
    #[test_case("Version 1.2.3"; "prefixed")]
    #[test_case("Release 2.0.0"; "release prefix")]
    #[test_case("v1.5.0 (2025-01-01)"; "v prefix")]
    #[test_case("1.2.3.4 (2025-01-01)"; "four parts")]
    #[test_case("(2025-01-01) 1.2.0"; "wrong order")]
    #[test_case("1.2 - Bug fixes"; "no parentheses")]
    fn default_pattern_ignores_other_headings(heading: &str) {
        assert_eq!(default_transform().version(heading), None);
    }

    #[test_case(r"^Version\s+(\d+\.\d+(?:\.\d+)?).*$", "v{version}", "Version 1.2.3", "v1.2.3"; "version prefix")]
    #[test_case(r"^Release\s+(\d+\.\d+(?:\.\d+)?)", "release-{version}", "Release 2.0", "release-2.0"; "release prefix")]
    #[test_case(r"^v?(\d+\.\d+(?:\.\d+)?)", "{version}", "v3.1.4", "3.1.4"; "optional v")]
    #[test_case(DEFAULT_VERSION_PATTERN, "version-{version}", "1.0.0 (Final)", "version-1.0.0"; "default")]
    fn custom_patterns_and_formats(pattern: &str, format: &str, heading: &str, expected: &str) {
        let transform = transform(pattern, format);
        let mut document = Document::new(
            "changelog",
            vec![Block::Section(Section::new(heading, Vec::new()))],
        );

        transform.apply(&mut document, &mut LabelTable::default());

        assert_eq!(document.section(&[0]).unwrap().ids, vec![expected.to_string()]);
    }

    #[test]
    fn version_headings_get_anchors() {
        let mut document = changelog("changelog");
        let mut labels = LabelTable::default();

        let outcome = default_transform().apply(&mut document, &mut labels);

        assert_eq!(outcome, Outcome::Applied { changes: 2 });
        assert_eq!(
            document.section(&[0, 0]).unwrap().ids,
            vec!["version-25.5.0".to_string()]
        );
        assert!(document.ids().contains_key("version-25.5.0"));
        assert!(document.ids().contains_key("version-1.5"));
        assert_eq!(
            document.section_by_id("version-25.5.0").unwrap().title_text(),
            "25.5.0 (2025-05-21)"
        );

        let label = labels.get("version-1.5").unwrap();
        assert_eq!(label.docname, "changelog");
        assert_eq!(label.title, "1.5 (Released on 2025-03-10)");
    }

    #[test]
    fn other_sections_are_untouched() {
        let mut document = changelog("changelog");
        default_transform().apply(&mut document, &mut LabelTable::default());

        assert_eq!(document.section(&[0]).unwrap().ids, vec!["changelog".to_string()]);
        assert!(document.section(&[0, 2]).unwrap().ids.is_empty());
        assert!(document.ids().contains_key("changelog"));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let transform = default_transform();
        let mut once = changelog("HISTORY");
        let mut once_labels = LabelTable::default();
        transform.apply(&mut once, &mut once_labels);

        let mut twice = once.clone();
        let mut twice_labels = once_labels.clone();
        transform.apply(&mut twice, &mut twice_labels);

        assert_eq!(once, twice);
        assert_eq!(once_labels, twice_labels);
    }

    #[test]
    fn non_changelog_documents_are_untouched() {
        let mut document = changelog("api");
        let before = document.clone();
        let mut labels = LabelTable::default();

        assert_eq!(
            default_transform().apply(&mut document, &mut labels),
            Outcome::NotApplicable
        );
        assert_eq!(document, before);
        assert!(labels.is_empty());
    }

    #[test]
    fn invalid_pattern_skips_document() {
        let transform = transform(r"^(\d+", "version-{version}");
        let mut document = changelog("changelog");
        let before = document.clone();

        assert!(matches!(
            transform.apply(&mut document, &mut LabelTable::default()),
            Outcome::Skipped(_)
        ));
        assert_eq!(document, before);
    }

    #[test]
    fn pattern_without_group_skips_document() {
        let transform = transform(r"^\d+\.\d+.*$", "version-{version}");
        let mut document = changelog("changelog");

        assert!(matches!(
            transform.apply(&mut document, &mut Vec::<Label>::new()),
            Outcome::Skipped(_)
        ));
    }
}

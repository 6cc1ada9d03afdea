use std::ops::Range;

use regex::Regex;
use tracing::instrument;

use super::{Outcome, PatternError, Transform, compile, is_changelog};
use crate::domain::{Document, GithubLinksSettings, Inline, Reference, Registrar};

/// An issue reference found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef<'t> {
    /// Repository named in the reference, e.g. `owner/repo` in `(owner/repo#1)`.
    pub repo: Option<&'t str>,
    /// The issue or pull request number.
    pub number: &'t str,
    /// Byte range of the whole reference in the text.
    pub span: Range<usize>,
}

impl IssueRef<'_> {
    /// The visible link text: `owner/repo#123` or `#123`.
    #[must_use]
    pub fn link_text(&self) -> String {
        self.repo.map_or_else(
            || format!("#{}", self.number),
            |repo| format!("{repo}#{}", self.number),
        )
    }
}

/// Finds the non-overlapping issue references in `text`.
///
/// Matches where the number group did not participate are ignored.
pub fn find_references<'t>(pattern: &Regex, text: &'t str) -> impl Iterator<Item = IssueRef<'t>> {
    pattern.captures_iter(text).filter_map(|captures| {
        let whole = captures.get(0)?;
        Some(IssueRef {
            repo: captures.get(1).map(|m| m.as_str()),
            number: captures.get(2)?.as_str(),
            span: whole.range(),
        })
    })
}

/// Replaces issue references in changelog text with hyperlinks.
///
/// `(#123)` becomes `(`, a link reading `#123`, and `)`.
#[derive(Debug)]
pub struct GithubLinks {
    settings: GithubLinksSettings,
    default_repo: String,
    pattern: Result<Regex, PatternError>,
}

impl GithubLinks {
    /// Creates the transform, compiling the configured pattern.
    ///
    /// An unusable pattern is not an error here; it is reported when the
    /// transform is applied to a document.
    #[must_use]
    pub fn new(settings: GithubLinksSettings) -> Self {
        let pattern = compile(&settings.pattern, 2, false);
        if let Err(e) = &pattern {
            tracing::debug!("issue linking disabled: {e}");
        }
        Self {
            default_repo: settings.repo.to_string(),
            settings,
            pattern,
        }
    }

    /// Builds the link node for a reference.
    #[must_use]
    pub fn reference(&self, issue: &IssueRef<'_>) -> Reference {
        let repo = issue.repo.unwrap_or(&self.default_repo);
        let uri = self.settings.url.render(|field| match field {
            "repo" => Some(repo),
            "number" => Some(issue.number),
            _ => None,
        });

        let mut reference = Reference::new(issue.link_text(), uri);
        if self.settings.new_tab {
            reference.target = Some("_blank".to_string());
            reference.rel = Some("noopener".to_string());
        }
        reference
    }

    /// Splits `text` around references, returning the replacement nodes and
    /// the number of links created.
    fn link_text(&self, pattern: &Regex, text: String) -> (Vec<Inline>, usize) {
        let mut nodes = Vec::new();
        let mut links = 0;
        let mut last_end = 0;

        for issue in find_references(pattern, &text) {
            if issue.span.start > last_end {
                nodes.push(Inline::text(&text[last_end..issue.span.start]));
            }
            nodes.push(Inline::text("("));
            nodes.push(Inline::Reference(self.reference(&issue)));
            nodes.push(Inline::text(")"));
            last_end = issue.span.end;
            links += 1;
        }

        if links == 0 {
            return (vec![Inline::Text(text)], 0);
        }
        if last_end < text.len() {
            nodes.push(Inline::text(&text[last_end..]));
        }
        (nodes, links)
    }
}

impl Transform for GithubLinks {
    fn name(&self) -> &'static str {
        "github_links"
    }

    #[instrument(level = "debug", skip_all, fields(document = document.name()))]
    fn apply(&self, document: &mut Document, _registrar: &mut dyn Registrar) -> Outcome {
        if !is_changelog(document.name(), &self.settings.changelog_files) {
            return Outcome::NotApplicable;
        }

        let pattern = match &self.pattern {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!("invalid github_links.pattern, skipping '{}': {e}", document.name());
                return Outcome::Skipped(e.to_string());
            }
        };

        let mut changes = 0;
        document.visit_inlines_mut(&mut |inlines: &mut Vec<Inline>| {
            for inline in std::mem::take(inlines) {
                match inline {
                    Inline::Text(text) => {
                        let (nodes, links) = self.link_text(pattern, text);
                        changes += links;
                        inlines.extend(nodes);
                    }
                    other => inlines.push(other),
                }
            }
        });

        if changes > 0 {
            tracing::info!("linked {changes} issue reference(s) in '{}'", document.name());
        }
        Outcome::Applied { changes }
    }
}

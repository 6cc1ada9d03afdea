//! Document transforms run once per document during a build.

use regex::Regex;

use crate::domain::{Document, Registrar};

/// Changelog document detection.
pub mod changelog;
pub use changelog::is_changelog;

/// Issue reference linking.
pub mod github_links;
pub use github_links::GithubLinks;

/// Content roles.
pub mod roles;
pub use roles::{Role, VersionRole, version_role};

/// Version heading anchors.
pub mod version_anchors;
pub use version_anchors::VersionAnchors;

/// Priority used by the built-in transforms. Lower runs first.
pub const DEFAULT_PRIORITY: u16 = 500;

/// A single-pass rewrite of a document.
pub trait Transform: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Ordering key; transforms with lower priority run first.
    fn priority(&self) -> u16 {
        DEFAULT_PRIORITY
    }

    /// Applies the transform to `document`.
    ///
    /// Transforms never fail the build: problems that only affect this
    /// document are logged and reported as [`Outcome::Skipped`].
    fn apply(&self, document: &mut Document, registrar: &mut dyn Registrar) -> Outcome;
}

/// What a transform did to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The document is not one this transform handles.
    NotApplicable,
    /// The transform could not run; the document is unchanged.
    Skipped(String),
    /// The transform ran and made `changes` modifications.
    Applied {
        /// Number of nodes rewritten.
        changes: usize,
    },
}

/// A configured pattern that cannot be used.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {message}")]
    Syntax {
        /// The pattern as configured.
        pattern: String,
        /// The compiler's description of the problem.
        message: String,
    },

    /// The pattern has the wrong number of capture groups.
    #[error("pattern '{pattern}' must have exactly {expected} capture group(s), found {found}")]
    Groups {
        /// The pattern as configured.
        pattern: String,
        /// Required number of groups.
        expected: usize,
        /// Groups present in the pattern.
        found: usize,
    },
}

/// Compiles `source`, requiring exactly `groups` capture groups.
///
/// With `whole` set, the pattern must match the entire subject.
pub(crate) fn compile(source: &str, groups: usize, whole: bool) -> Result<Regex, PatternError> {
    let compiled = if whole {
        Regex::new(&format!("^(?:{source})$"))
    } else {
        Regex::new(source)
    };
    let regex = compiled.map_err(|e| PatternError::Syntax {
        pattern: source.to_string(),
        message: e.to_string(),
    })?;

    let found = regex.captures_len() - 1;
    if found != groups {
        return Err(PatternError::Groups {
            pattern: source.to_string(),
            expected: groups,
            found,
        });
    }
    Ok(regex)
}

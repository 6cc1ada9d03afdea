use crate::domain::{AnchorFormat, Inline, Reference};

/// A function content authors can invoke inline, e.g. `:version:`25.5.0``.
pub trait Role: Send + Sync {
    /// Produces the node that replaces the role invocation.
    fn run(&self, text: &str) -> Inline;
}

impl<F> Role for F
where
    F: Fn(&str) -> Inline + Send + Sync,
{
    fn run(&self, text: &str) -> Inline {
        self(text)
    }
}

/// Links a version string to its anchor in the current document.
///
/// `25.5.0` becomes a reference reading `25.5.0` that points at
/// `#version-25.5.0` with the default format.
#[must_use]
pub fn version_role(text: &str, format: &AnchorFormat) -> Reference {
    let version = text.trim();
    Reference::new(version, format!("#{}", format.anchor(version)))
}

/// The `version` role, bound to the configured anchor format.
#[derive(Debug, Clone, Default)]
pub struct VersionRole {
    format: AnchorFormat,
}

impl VersionRole {
    /// Role name used in content.
    pub const NAME: &'static str = "version";

    /// Creates the role for `format`.
    #[must_use]
    pub const fn new(format: AnchorFormat) -> Self {
        Self { format }
    }
}

impl Role for VersionRole {
    fn run(&self, text: &str) -> Inline {
        Inline::Reference(version_role(text, &self.format))
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("25.5.0", "version-{version}", "#version-25.5.0"; "default")]
    #[test_case(" 1.2 ", "v{version}", "#v1.2"; "trimmed")]
    #[test_case("2.0", "release-{version}", "#release-2.0"; "release")]
    fn version_role_points_at_anchor(text: &str, format: &str, uri: &str) {
        let reference = version_role(text, &format.parse().unwrap());
        assert_eq!(reference.uri, uri);
        assert_eq!(reference.text, text.trim());
        assert_eq!(reference.target, None);
    }

    #[test]
    fn version_role_runs_as_role() {
        let role = VersionRole::default();
        assert_eq!(
            role.run("25.5.0"),
            Inline::Reference(Reference::new("25.5.0", "#version-25.5.0"))
        );
    }

    #[test]
    fn closures_are_roles() {
        let shout = |text: &str| Inline::text(text.to_uppercase());
        assert_eq!(shout.run("hi"), Inline::text("HI"));
    }
}

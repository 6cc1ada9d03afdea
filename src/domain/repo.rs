use std::{fmt, str::FromStr};

use non_empty_string::NonEmptyString;

/// A GitHub repository identifier in `owner/repo` form.
///
/// Both segments must be non-empty once surrounding whitespace is ignored,
/// and there must be exactly one `/` separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RepoId {
    owner: NonEmptyString,
    name: NonEmptyString,
}

impl RepoId {
    /// Returns the owner (user or organisation) segment.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.owner.as_str()
    }

    /// Returns the repository name segment.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Error returned when a repository identifier is not in `owner/repo` form.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("repository must be in 'owner/repo' format, got: {0:?}")]
pub struct RepoError(String);

impl FromStr for RepoId {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RepoError(s.to_string());

        let (owner, name) = s.split_once('/').ok_or_else(invalid)?;
        if name.contains('/') || owner.trim().is_empty() || name.trim().is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            owner: NonEmptyString::new(owner.to_string()).map_err(|_| invalid())?,
            name: NonEmptyString::new(name.to_string()).map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<&str> for RepoId {
    type Error = RepoError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

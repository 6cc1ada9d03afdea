//! Theme defaults and changelog transforms for conda documentation sites.
//!
//! Changelog documents get two rewrites: issue references such as `(#123)`
//! become links, and version headings such as `25.5.0 (2025-05-21)` get a
//! stable anchor (`version-25.5.0`).

pub mod domain;
pub use domain::{Config, ConfigError, Document, Label, LabelTable, Registrar, Settings};

/// Role and transform orchestration for a build.
pub mod pipeline;
pub use pipeline::{Pipeline, Report};

pub mod theme;
pub use theme::ThemeOptions;

pub mod transform;
pub use transform::{GithubLinks, Outcome, Transform, VersionAnchors, is_changelog};

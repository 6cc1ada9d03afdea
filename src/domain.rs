//! Domain models: the document tree, configuration and cross-reference
//! labels.

mod config;
pub use config::{
    AnchorFormat, Config, ConfigError, DEFAULT_ANCHOR_FORMAT, DEFAULT_ISSUE_PATTERN,
    DEFAULT_ISSUE_URL, DEFAULT_VERSION_PATTERN, GithubLinksConfig, GithubLinksSettings, LoadError,
    Settings, VersionAnchorsConfig, VersionAnchorsSettings,
};

/// The document tree handed over by the host.
pub mod document;
pub use document::{Block, Document, Inline, Reference, Section};

mod labels;
pub use labels::{Label, LabelTable, Registrar};

/// `owner/repo` repository identifiers.
pub mod repo;
pub use repo::RepoId;

/// `{name}` placeholder templates.
pub mod template;
pub use template::Template;

use std::{fmt, io, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    repo::{RepoError, RepoId},
    template::{Template, TemplateError},
};
use crate::theme::ThemeOptions;

/// Default link target for issue references.
pub const DEFAULT_ISSUE_URL: &str = "https://github.com/{repo}/issues/{number}";

/// Default issue reference pattern: `(#123)` or `(owner/repo#123)`.
pub const DEFAULT_ISSUE_PATTERN: &str = r"\((?:([^/\s]+/[^/\s]+)#|#)(\d+)\)";

/// Default version heading pattern: `25.5.0 (2025-05-21)`.
pub const DEFAULT_VERSION_PATTERN: &str = r"^(\d+\.\d+(?:\.\d+)?)\s*\(.*?\)$";

/// Default anchor id format.
pub const DEFAULT_ANCHOR_FORMAT: &str = "version-{version}";

/// Version used to check that an anchor format produces usable ids.
const SAMPLE_VERSION: &str = "1.0.0";

fn default_changelog_files() -> Vec<String> {
    ["changelog", "release", "history", "news"]
        .map(String::from)
        .to_vec()
}

/// Configuration as written by the user.
///
/// Each section is optional; a missing section leaves that feature disabled.
/// Convert to [`Settings`] to validate it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTML theme options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeOptions>,

    /// Issue reference linking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_links: Option<GithubLinksConfig>,

    /// Version heading anchors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_anchors: Option<VersionAnchorsConfig>,
}

/// Options for issue reference linking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GithubLinksConfig {
    /// Default repository, `owner/repo`. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Link target template using `{repo}` and `{number}`.
    #[serde(default = "default_issue_url")]
    pub url: String,

    /// Reference pattern with two capture groups: optional repo, number.
    #[serde(default = "default_issue_pattern")]
    pub pattern: String,

    /// Document name substrings that mark a changelog.
    #[serde(default = "default_changelog_files")]
    pub changelog_files: Vec<String>,

    /// Whether links open in a new tab.
    #[serde(default)]
    pub new_tab: bool,
}

impl Default for GithubLinksConfig {
    fn default() -> Self {
        Self {
            repo: None,
            url: default_issue_url(),
            pattern: default_issue_pattern(),
            changelog_files: default_changelog_files(),
            new_tab: false,
        }
    }
}

fn default_issue_url() -> String {
    DEFAULT_ISSUE_URL.to_string()
}

fn default_issue_pattern() -> String {
    DEFAULT_ISSUE_PATTERN.to_string()
}

/// Options for version heading anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionAnchorsConfig {
    /// Heading pattern with one capture group for the version.
    #[serde(default = "default_version_pattern")]
    pub pattern: String,

    /// Anchor id template using `{version}`.
    #[serde(default = "default_anchor_format")]
    pub format: String,

    /// Document name substrings that mark a changelog.
    #[serde(default = "default_changelog_files")]
    pub changelog_files: Vec<String>,
}

impl Default for VersionAnchorsConfig {
    fn default() -> Self {
        Self {
            pattern: default_version_pattern(),
            format: default_anchor_format(),
            changelog_files: default_changelog_files(),
        }
    }
}

fn default_version_pattern() -> String {
    DEFAULT_VERSION_PATTERN.to_string()
}

fn default_anchor_format() -> String {
    DEFAULT_ANCHOR_FORMAT.to_string()
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Ok(content.parse()?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or the file
    /// cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), LoadError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

/// Errors that can occur when reading or writing a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid configuration TOML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Fatal configuration problems, reported before any document is processed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Issue linking is enabled without a default repository.
    #[error(
        "github_links.repo is required when issue linking is enabled; \
         set it in the [github_links] table, e.g. repo = \"owner/repo\""
    )]
    MissingRepo,

    /// The default repository is not `owner/repo`.
    #[error("github_links.repo is invalid: {0}")]
    InvalidRepo(#[from] RepoError),

    /// The issue URL template is malformed.
    #[error("github_links.url is invalid: {0}")]
    InvalidUrl(#[source] TemplateError),

    /// The anchor format does not mention `{version}`.
    #[error(
        "version_anchors.format must contain '{{version}}' placeholder. Got: '{0}'. \
         Example valid formats: 'version-{{version}}', 'v{{version}}', 'release-{{version}}'"
    )]
    MissingVersionPlaceholder(String),

    /// The anchor format is malformed or uses other placeholders.
    #[error("version_anchors.format is invalid: {0}")]
    InvalidAnchorFormat(#[source] TemplateError),

    /// The anchor format renders to an empty id.
    #[error("version_anchors.format produces empty anchor IDs. Got format: '{0}'")]
    EmptyAnchor(String),
}

/// Validated issue linking settings.
#[derive(Debug, Clone)]
pub struct GithubLinksSettings {
    /// Default repository for references without an explicit one.
    pub repo: RepoId,
    /// Link target template.
    pub url: Template,
    /// Reference pattern source. Compiled per transform; an invalid pattern
    /// disables the transform with a warning rather than failing the build.
    pub pattern: String,
    /// Changelog document indicators.
    pub changelog_files: Vec<String>,
    /// Whether links open in a new tab.
    pub new_tab: bool,
}

impl TryFrom<GithubLinksConfig> for GithubLinksSettings {
    type Error = ConfigError;

    fn try_from(config: GithubLinksConfig) -> Result<Self, Self::Error> {
        let repo = config
            .repo
            .as_deref()
            .filter(|repo| !repo.is_empty())
            .ok_or(ConfigError::MissingRepo)?
            .parse()?;
        let url = Template::parse(&config.url, &["repo", "number"])
            .map_err(ConfigError::InvalidUrl)?;

        Ok(Self {
            repo,
            url,
            pattern: config.pattern,
            changelog_files: config.changelog_files,
            new_tab: config.new_tab,
        })
    }
}

/// A validated anchor id format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorFormat(Template);

impl AnchorFormat {
    /// Renders the anchor id for `version`.
    #[must_use]
    pub fn anchor(&self, version: &str) -> String {
        self.0
            .render(|field| (field == "version").then_some(version))
    }
}

impl fmt::Display for AnchorFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for AnchorFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.contains("{version}") {
            return Err(ConfigError::MissingVersionPlaceholder(s.to_string()));
        }

        let format = Template::parse(s, &["version"])
            .map(Self)
            .map_err(ConfigError::InvalidAnchorFormat)?;

        if format.anchor(SAMPLE_VERSION).trim().is_empty() {
            return Err(ConfigError::EmptyAnchor(s.to_string()));
        }

        Ok(format)
    }
}

impl Default for AnchorFormat {
    fn default() -> Self {
        Self(
            Template::parse(DEFAULT_ANCHOR_FORMAT, &["version"])
                .expect("default anchor format is valid"),
        )
    }
}

/// Validated version anchor settings.
#[derive(Debug, Clone)]
pub struct VersionAnchorsSettings {
    /// Heading pattern source; see [`GithubLinksSettings::pattern`].
    pub pattern: String,
    /// Anchor id format.
    pub format: AnchorFormat,
    /// Changelog document indicators.
    pub changelog_files: Vec<String>,
}

impl TryFrom<VersionAnchorsConfig> for VersionAnchorsSettings {
    type Error = ConfigError;

    fn try_from(config: VersionAnchorsConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            format: config.format.parse()?,
            pattern: config.pattern,
            changelog_files: config.changelog_files,
        })
    }
}

/// Immutable, validated configuration shared by every document in a build.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Theme options with defaults applied.
    pub theme: ThemeOptions,
    /// Issue linking, if enabled.
    pub github_links: Option<GithubLinksSettings>,
    /// Version anchors, if enabled.
    pub version_anchors: Option<VersionAnchorsSettings>,
}

impl TryFrom<Config> for Settings {
    type Error = ConfigError;

    #[tracing::instrument(level = "debug", skip_all)]
    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let Config {
            theme,
            github_links,
            version_anchors,
        } = config;

        let settings = Self {
            theme: theme.unwrap_or_default().with_defaults(),
            github_links: github_links.map(TryInto::try_into).transpose()?,
            version_anchors: version_anchors.map(TryInto::try_into).transpose()?,
        };

        tracing::debug!(
            github_links = settings.github_links.is_some(),
            version_anchors = settings.version_anchors.is_some(),
            "configuration validated"
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;

    fn links(repo: Option<&str>) -> GithubLinksConfig {
        GithubLinksConfig {
            repo: repo.map(String::from),
            ..GithubLinksConfig::default()
        }
    }

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"[github_links]\nrepo = \"conda/conda\"\nnew_tab = true\n\n[version_anchors]\nformat = \"v{version}\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        let github_links = config.github_links.unwrap();

        assert_eq!(github_links.repo.as_deref(), Some("conda/conda"));
        assert!(github_links.new_tab);
        assert_eq!(github_links.url, DEFAULT_ISSUE_URL);
        assert_eq!(config.version_anchors.unwrap().format, "v{version}");
        assert!(config.theme.is_none());
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, LoadError::Io(_)));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[github_links]\nnew_tab = \"yes\"\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.to_string().starts_with("failed to parse config file:"));
    }

    #[test]
    fn save_then_load_preserves_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("conf.toml");
        let config = Config {
            github_links: Some(links(Some("conda/conda"))),
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn empty_file_returns_default() {
        let actual: Config = "".parse().unwrap();
        assert_eq!(actual, Config::default());
    }

    #[test]
    fn empty_sections_take_defaults() {
        let config: Config = "[github_links]\n[version_anchors]\n".parse().unwrap();
        assert_eq!(config.github_links.unwrap(), GithubLinksConfig::default());
        assert_eq!(
            config.version_anchors.unwrap(),
            VersionAnchorsConfig::default()
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!("[github_links]\nrepository = \"a/b\"\n".parse::<Config>().is_err());
    }

    #[test_case("owner/repo"; "plain")]
    #[test_case("123/456"; "numeric")]
    fn valid_repo_is_accepted(repo: &str) {
        let settings = GithubLinksSettings::try_from(links(Some(repo))).unwrap();
        assert_eq!(settings.repo.to_string(), repo);
    }

    #[test_case(None; "none")]
    #[test_case(Some(""); "empty")]
    fn missing_repo_is_fatal(repo: Option<&str>) {
        assert_eq!(
            GithubLinksSettings::try_from(links(repo)).unwrap_err(),
            ConfigError::MissingRepo
        );
    }

    #[test_case("repo"; "no owner")]
    #[test_case("owner/"; "no name")]
    #[test_case("/repo"; "empty owner")]
    #[test_case("owner repo"; "space")]
    fn malformed_repo_is_fatal(repo: &str) {
        assert!(matches!(
            GithubLinksSettings::try_from(links(Some(repo))),
            Err(ConfigError::InvalidRepo(_))
        ));
    }

    #[test]
    fn url_with_unknown_placeholder_is_fatal() {
        let config = GithubLinksConfig {
            url: "https://github.com/{repo}/issues/{id}".to_string(),
            ..links(Some("conda/conda"))
        };
        assert!(matches!(
            GithubLinksSettings::try_from(config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test_case("version-{version}", "version-25.5.0"; "default")]
    #[test_case("v{version}", "v25.5.0"; "short")]
    #[test_case("release-{version}", "release-25.5.0"; "release")]
    #[test_case("{version}", "25.5.0"; "bare")]
    fn anchor_format_renders(format: &str, expected: &str) {
        let format: AnchorFormat = format.parse().unwrap();
        assert_eq!(format.anchor("25.5.0"), expected);
    }

    #[test_case("version-only"; "no placeholder")]
    #[test_case("prefix-{ver}-suffix"; "wrong name")]
    #[test_case("version-{VERSION}"; "wrong case")]
    #[test_case("{version-typo}"; "typo")]
    fn anchor_format_without_placeholder_is_fatal(format: &str) {
        let error = format.parse::<AnchorFormat>().unwrap_err();
        assert_eq!(error, ConfigError::MissingVersionPlaceholder(format.to_string()));
        assert!(error.to_string().contains("must contain '{version}' placeholder"));
    }

    #[test_case("{version}-{extra}"; "extra placeholder")]
    #[test_case("{version}}"; "stray brace")]
    #[test_case("{version}{"; "unclosed brace")]
    fn malformed_anchor_format_is_fatal(format: &str) {
        assert!(matches!(
            format.parse::<AnchorFormat>(),
            Err(ConfigError::InvalidAnchorFormat(_))
        ));
    }

    #[test]
    fn default_anchor_format_matches_constant() {
        assert_eq!(AnchorFormat::default().to_string(), DEFAULT_ANCHOR_FORMAT);
    }

    #[test]
    fn settings_apply_theme_defaults() {
        let settings = Settings::try_from(Config::default()).unwrap();

        assert!(settings.github_links.is_none());
        assert!(settings.version_anchors.is_none());
        assert_eq!(settings.theme.favicons.len(), 1);
    }

    #[test]
    fn settings_surface_first_fatal_error() {
        let config: Config = "[github_links]\n[version_anchors]\nformat = \"v\"\n"
            .parse()
            .unwrap();
        assert_eq!(
            Settings::try_from(config).unwrap_err(),
            ConfigError::MissingRepo
        );
    }
}

//! HTML theme options and the defaults the conda theme fills in.

use serde::{Deserialize, Serialize};

/// The theme's registered name.
pub const THEME_NAME: &str = "conda_sphinx_theme";

/// Logo used for both colour schemes unless the user sets one.
pub const DEFAULT_LOGO: &str = "_static/conda_logo_full.svg";

/// Script that reports page views to GoatCounter.
pub const GOATCOUNTER_SCRIPT: &str = "js/count.js";

/// User-facing theme options.
///
/// Options the theme does not interpret are carried through unchanged in
/// [`ThemeOptions::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeOptions {
    /// Logo images.
    #[serde(default)]
    pub logo: Logo,

    /// Favicons, in the order they should appear in the page head.
    #[serde(default)]
    pub favicons: Vec<Favicon>,

    /// GoatCounter endpoint. Unset or empty disables analytics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goatcounter_url: Option<String>,

    /// Every other option, passed to the base theme as-is.
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// Logo images for light and dark colour schemes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logo {
    /// Image shown with the dark colour scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_dark: Option<String>,

    /// Image shown with the light colour scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_light: Option<String>,

    /// Other logo keys, e.g. `text` or `alt_text`.
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// A `<link>` favicon entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favicon {
    /// Path of the icon, relative to the static directory.
    pub href: String,
    /// Link relation, usually `icon`.
    #[serde(default = "default_favicon_rel")]
    pub rel: String,
    /// MIME type of the icon.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

impl Favicon {
    /// The favicon shipped with the theme.
    #[must_use]
    pub fn conda() -> Self {
        Self {
            href: "favicon.ico".to_string(),
            rel: default_favicon_rel(),
            mime: Some("image/svg+xml".to_string()),
        }
    }
}

fn default_favicon_rel() -> String {
    "icon".to_string()
}

/// A script the host should add to every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    /// Path of the script, relative to the static directory.
    pub path: String,
    /// Extra attributes on the `<script>` tag.
    pub attributes: Vec<(String, String)>,
}

impl ThemeOptions {
    /// Fills in the theme's defaults.
    ///
    /// Missing logo images get the conda logo, and the conda favicon is
    /// appended after any user favicons. Values the user set are kept.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.logo
            .image_dark
            .get_or_insert_with(|| DEFAULT_LOGO.to_string());
        self.logo
            .image_light
            .get_or_insert_with(|| DEFAULT_LOGO.to_string());
        self.favicons.push(Favicon::conda());
        self
    }

    /// Returns the GoatCounter endpoint if analytics are enabled.
    #[must_use]
    pub fn goatcounter(&self) -> Option<&str> {
        self.goatcounter_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Scripts the host should include, derived from the options.
    #[must_use]
    pub fn script_files(&self) -> Vec<ScriptFile> {
        self.goatcounter()
            .map(|url| ScriptFile {
                path: GOATCOUNTER_SCRIPT.to_string(),
                attributes: vec![("data-goatcounter".to_string(), url.to_string())],
            })
            .into_iter()
            .collect()
    }
}

//! Layered configuration for wa2html.
//!
//! Sources, from lowest to highest precedence:
//!
//! ```text
//! built-in defaults
//! <config dir>/config.toml, config.yaml, config.json   (platform config dir for "wa2html")
//! --config FILE                                         (format chosen by extension)
//! WA2HTML_* environment variables                       (nested keys separated by "__")
//! ```
//!
//! Command-line flags are applied on top by the binary.
//!
//! ```toml
//! output = "converted"
//! decorate = true
//!
//! [templates]
//! header = "/home/me/.config/wa2html/header.html"
//!
//! [[sites]]
//! host = "*.substack.com"
//! remove = ["div.subscribe-widget", "footer"]
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const APPLICATION: &str = "wa2html";
pub const ENV_PREFIX: &str = "WA2HTML_";

/// Replacement decoration templates. `None` keeps the built-in one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<PathBuf>,
}

/// Extra site quirk entry: elements to strip from pages served by `host`
/// before decoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRule {
    /// Exact host, or `*.domain` for any subdomain.
    pub host: String,
    /// Removal selectors, e.g. `div#banner` or `article h1:first`.
    pub remove: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving `<name>.html` and `<name>_files/`.
    pub output: PathBuf,
    /// Inject the header, footer and publish meta tag.
    pub decorate: bool,
    pub templates: Templates,
    /// Appended to the built-in site quirk table.
    pub sites: Vec<SiteRule>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from("."),
            decorate: false,
            templates: Templates::default(),
            sites: Vec::new(),
        }
    }
}

/// The platform configuration directory for this application, if the home
/// directory can be determined.
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().to_path_buf())
}

impl Config {
    /// Loads the layered configuration, using the platform configuration
    /// directory and an optional explicit file.
    #[instrument(skip_all, fields(explicit = ?explicit))]
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(user_config_dir().as_deref(), explicit)?)
    }

    /// Assembles every configuration source without extracting it.
    pub fn figment(directory: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(directory) = directory {
            tracing::debug!(directory = %directory.display(), "Looking for configuration files");
            figment = figment
                .merge(Toml::file(directory.join("config.toml")))
                .merge(Yaml::file(directory.join("config.yaml")))
                .merge(Json::file(directory.join("config.json")));
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would only fail later, halfway through a batch.
    pub fn validate(&self) -> Result<()> {
        for site in &self.sites {
            if site.host.trim().is_empty() {
                exn::bail!(ErrorKind::Invalid("site rule with an empty host".to_string()));
            }
            if site.remove.is_empty() {
                exn::bail!(ErrorKind::Invalid(format!("site rule for '{}' removes nothing", site.host)));
            }
        }
        for template in [&self.templates.header, &self.templates.footer].into_iter().flatten() {
            if !template.is_file() {
                exn::bail!(ErrorKind::Invalid(format!("template not found: {}", template.display())));
            }
        }
        Ok(())
    }
}

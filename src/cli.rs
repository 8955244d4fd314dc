use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use wa2html_config::Config;

/// Argument standing for "every archive in the working directory", as typed
/// into a shell that did not expand it.
pub const DEFAULT_PATTERN: &str = "*.webarchive";
const ARCHIVE_EXTENSION: &str = "webarchive";

#[derive(Debug, Parser)]
#[command(name = "wa2html", version, about = "Convert Safari .webarchive files into .html files")]
pub struct Args {
    /// Log every extracted resource and unresolved reference.
    #[arg(short, long)]
    pub verbose: bool,
    /// Add a header, footer and publish-time meta tag to each page.
    #[arg(long)]
    pub decorate: bool,
    /// Directory receiving the HTML files and resource folders.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Show the project homepage and exit.
    #[arg(long)]
    pub about: bool,
    /// Archives to convert. Defaults to every *.webarchive file in the working directory.
    #[arg(value_name = "WEBARCHIVE")]
    pub paths: Vec<PathBuf>,
}

impl Args {
    /// Applies flags on top of the loaded configuration. Flags only ever turn
    /// decoration on.
    pub fn apply(&self, config: &mut Config) {
        config.decorate |= self.decorate;
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
    }

    /// The archives to convert, in order. No arguments, or the literal
    /// [`DEFAULT_PATTERN`], expands to the archives found in `directory`.
    pub fn inputs(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        if self.paths.is_empty() {
            return discover(directory);
        }
        let mut inputs = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            if path.as_os_str() == DEFAULT_PATTERN {
                inputs.extend(discover(directory)?);
            } else {
                inputs.push(path.clone());
            }
        }
        Ok(inputs)
    }
}

/// Lists the `*.webarchive` files directly inside `directory`, sorted by name.
pub fn discover(directory: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(directory).or_raise(|| ErrorKind::Io(directory.to_path_buf()))?;
    let mut found = Vec::new();
    for entry in entries {
        let path = entry.or_raise(|| ErrorKind::Io(directory.to_path_buf()))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == ARCHIVE_EXTENSION) {
            found.push(path);
        }
    }
    found.sort();
    tracing::debug!(directory = %directory.display(), found = found.len(), "Discovered archives");
    Ok(found)
}

//! The per-file conversion pipeline.
//!
//! ```text
//! name.webarchive ─decode─▶ Archive ─extract─▶ <output>/name_files/<MIMEType>/<index><ext>
//!                                   └─build page (parse, decorate)─▶ rewrite ─▶ <output>/name.html
//! ```

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;
use wa2html_archive::error::ErrorKind as ArchiveErrorKind;
use wa2html_archive::{Archive, extract};
use wa2html_config::Config;
use wa2html_document::error::ErrorKind as DocumentErrorKind;
use wa2html_document::{Decorator, Page, Quirks, RewriteReport, SiteQuirks};

const ARCHIVE_EXTENSION: &str = ".webarchive";
/// `data:` URLs longer than this are shortened in log output.
const LOGGED_DATA_URL_LENGTH: usize = 70;

/// Summary of one converted archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub source: PathBuf,
    /// The written HTML document.
    pub html: PathBuf,
    /// Directory holding the extracted resources.
    pub resources: PathBuf,
    /// Number of distinct resource URLs extracted.
    pub extracted: usize,
    pub report: RewriteReport,
}

/// Converts webarchives into HTML files plus resource directories, all
/// written below one output directory.
#[derive(Default)]
pub struct Converter {
    output: PathBuf,
    decorator: Option<Decorator>,
}
impl Converter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self { output: output.into(), decorator: None }
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorator = Some(decorator);
        self
    }

    /// Builds a converter from loaded configuration, reading template
    /// overrides and compiling site rules up front.
    pub fn from_config(config: &Config) -> Result<Self> {
        let converter = Self::new(&config.output);
        if !config.decorate {
            return Ok(converter);
        }
        let mut quirks = Quirks::builtin();
        for site in &config.sites {
            quirks = quirks.with_site(SiteQuirks::new(&site.host, &site.remove).or_raise(|| ErrorKind::Config)?);
        }
        let read = |path: &Option<PathBuf>| -> Result<Option<String>> {
            path.as_ref().map(|path| fs::read_to_string(path).or_raise(|| ErrorKind::Config)).transpose()
        };
        let decorator = Decorator::with_templates(read(&config.templates.header)?, read(&config.templates.footer)?)
            .or_raise(|| ErrorKind::Config)?
            .with_quirks(quirks);
        Ok(converter.with_decorator(decorator))
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn decorates(&self) -> bool {
        self.decorator.is_some()
    }

    /// Output locations for `source`: the HTML file and the resource directory.
    pub fn destinations(&self, source: &Path) -> (PathBuf, PathBuf) {
        let name = source.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
        let stem = name.strip_suffix(ARCHIVE_EXTENSION).unwrap_or(&name);
        (self.output.join(format!("{stem}.html")), self.output.join(format!("{stem}_files")))
    }

    /// Converts one archive.
    ///
    /// Resources are extracted before the page is parsed. When the main
    /// resource is not HTML, its raw bytes are written to the HTML path and
    /// [`ErrorKind::Parse`] is still returned.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn convert(&self, path: impl AsRef<Path>) -> Result<Conversion> {
        let path = path.as_ref();
        let (html, resources) = self.destinations(path);
        let archive = match Archive::open(path) {
            Ok(archive) => archive,
            Err(err) if matches!(&*err, ArchiveErrorKind::Io(_)) => {
                return Err(err).or_raise(|| ErrorKind::Io(path.to_path_buf()));
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Decode(path.to_path_buf())),
        };
        fs::create_dir_all(&self.output).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;

        let extracted = extract(&archive, &resources).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        for (url, local) in extracted.iter() {
            tracing::debug!("save {} as {}", loggable_url(url), local.display());
        }

        let mut page = match Page::build(&archive, self.decorator.as_ref()) {
            Ok(page) => page,
            Err(err) if matches!(&*err, DocumentErrorKind::MalformedHtml(_)) => {
                if let Err(write_err) = fs::write(&html, &archive.main.data) {
                    tracing::warn!(html = %html.display(), error = %write_err, "Failed to write raw page content");
                }
                return Err(err).or_raise(|| ErrorKind::Parse(path.to_path_buf()));
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Decorate(path.to_path_buf())),
        };
        let report = page.rewrite(&extracted.references(&self.output));
        let document = page.to_html().or_raise(|| ErrorKind::Parse(path.to_path_buf()))?;
        fs::write(&html, document).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;

        tracing::info!(
            html = %html.display(),
            extracted = extracted.len(),
            rewritten = report.rewritten,
            missed = report.missed,
            "Converted"
        );
        Ok(Conversion { source: path.to_path_buf(), html, resources, extracted: extracted.len(), report })
    }

    /// Converts archives one at a time, stopping at the first failure. Output
    /// already written for earlier archives is kept.
    pub fn convert_all<I, P>(&self, paths: I) -> Result<Vec<Conversion>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths.into_iter().map(|path| self.convert(path)).collect()
    }
}

fn loggable_url(url: &str) -> Cow<'_, str> {
    if url.starts_with("data:") && url.chars().count() > LOGGED_DATA_URL_LENGTH {
        Cow::Owned(format!("{}...", url.chars().take(LOGGED_DATA_URL_LENGTH).collect::<String>()))
    } else {
        Cow::Borrowed(url)
    }
}

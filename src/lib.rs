//! Converts Safari `.webarchive` files into standalone `.html` files.
//!
//! Each archive's subresources are written to `<name>_files/<MIMEType>/<index><ext>`
//! next to `<name>.html`, and the page's `img`, `script` and `link` references are
//! rewritten to point at them. Decoration optionally adds a header, a footer and
//! a publish-time `<meta>` tag.

pub mod cli;
mod convert;
pub mod error;

pub use crate::convert::{Conversion, Converter};

use crate::cli::Args;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;
use tracing::instrument;
use wa2html_config::Config;

/// Loads configuration, applies `args` over it, then converts the requested
/// archives, stopping at the first failure.
#[instrument(skip_all, fields(decorate = args.decorate))]
pub fn run(args: &Args, directory: &Path) -> Result<Vec<Conversion>> {
    let mut config = Config::load(args.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    args.apply(&mut config);
    let converter = Converter::from_config(&config)?;
    let inputs = args.inputs(directory)?;
    if inputs.is_empty() {
        tracing::info!(directory = %directory.display(), "No .webarchive files found");
        return Ok(Vec::new());
    }
    let conversions = converter.convert_all(&inputs)?;
    tracing::info!(
        converted = conversions.len(),
        output = %converter.output().display(),
        decorated = converter.decorates(),
        "Done"
    );
    Ok(conversions)
}

//! Header and footer templates compiled into the binary with
//! [`rust-embed`](rust_embed). Configuration may replace either one.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "templates/"]
pub struct Builtins;
impl Builtins {
    /// Source of a built-in template by file name, e.g. `header.html`.
    /// Errors name the template as `builtin:<name>`.
    pub fn template(name: &str) -> Result<String> {
        let missing = || ErrorKind::AssetNotFound(format!("builtin:{name}"));
        let file = Self::get(name).ok_or_raise(missing)?;
        String::from_utf8(file.data.into_owned()).or_raise(missing)
    }
}

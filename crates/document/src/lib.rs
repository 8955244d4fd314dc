mod consts;
mod decorate;
mod document;
mod dom;
pub mod error;
mod metadata;
mod page;
mod quirks;
mod rewrite;

pub use crate::consts::{ATTRIBUTION_URL, PUBLISH_META_NAME};
pub use crate::decorate::{Builtins, Context, Decorator, FOOTER_TEMPLATE, HEADER_TEMPLATE};
pub use crate::document::Document;
pub use crate::metadata::{Metadata, parse_published};
pub use crate::page::Page;
pub use crate::quirks::{HostPattern, Quirks, Removal, SiteQuirks};
pub use crate::rewrite::{RewriteReport, rewrite};

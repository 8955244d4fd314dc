mod decode;
pub mod error;
mod extract;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
mod index;
mod model;
mod path;
mod reference;

pub use crate::extract::{ExtractionMap, FALLBACK_EXTENSION, References, extension, extract, local_path};
pub use crate::index::ResourceIndex;
pub use crate::model::{Archive, Resource};
pub use crate::path::{FALLBACK_MIME_DIRECTORY, mime_directory};
pub use crate::reference::resolve_reference;

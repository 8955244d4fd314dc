use crate::error::{ErrorKind, Result};
use crate::index::ResourceIndex;
use exn::ResultExt;
use std::io::Cursor;
use std::path::Path;
use tracing::instrument;

/// One embedded asset (or the page itself) as stored in the webarchive.
///
/// Immutable once decoded; every resource is owned by exactly one [`Archive`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    /// Declared source URL (`WebResourceURL`), the key used for rewriting.
    pub url: String,
    /// Declared MIME type (`WebResourceMIMEType`).
    pub mime_type: String,
    /// Text encoding name, only meaningful for textual resources.
    pub text_encoding: Option<String>,
    /// Name of the frame the resource was loaded into, if any.
    pub frame_name: Option<String>,
    /// Raw payload (`WebResourceData`).
    pub data: Vec<u8>,
}

/// A decoded webarchive: the page's main resource plus its subresources.
///
/// Decoding produces a plain value with no hidden caches. Derived lookup
/// structures are built explicitly (see [`Archive::index`]) and borrow from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    /// The page's own HTML payload.
    pub main: Resource,
    /// Embedded resources, in the order they appear in the container.
    pub subresources: Vec<Resource>,
    /// Number of nested frame archives present in the container. These are
    /// counted, never processed.
    pub subframes: usize,
}

impl Archive {
    /// Reads and decodes the webarchive at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        Self::decode(&bytes)
    }

    /// Decodes a binary or XML property list into an [`Archive`].
    ///
    /// A missing `WebMainResource` is fatal; a missing `WebSubresources` array
    /// is treated as empty.
    #[instrument(skip(bytes), fields(size = bytes.len(), subresources = tracing::field::Empty))]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let value = plist::Value::from_reader(Cursor::new(bytes)).or_raise(|| ErrorKind::MalformedContainer)?;
        let archive = Self::try_from(value)?;
        tracing::Span::current().record("subresources", archive.subresources.len());
        if archive.subframes > 0 {
            tracing::warn!(subframes = archive.subframes, "Subframe archives are not supported and were ignored");
        }
        Ok(archive)
    }

    /// Builds the URL lookup index over this archive's subresources.
    ///
    /// See [`ResourceIndex`] for the duplicate-URL rule.
    pub fn index(&self) -> ResourceIndex<'_> {
        ResourceIndex::build(&self.subresources)
    }

    /// Resolves a possibly-relative reference against the main resource's URL.
    ///
    /// See [`resolve_reference`](crate::resolve_reference).
    pub fn resolve_reference(&self, reference: &str) -> String {
        crate::resolve_reference(reference, &self.main.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ArchiveBuilder;
    use std::fs;

    #[test]
    fn opens_archive_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.webarchive");
        let builder = ArchiveBuilder::new("https://example.com/", "<p>hi</p>").resource(
            "https://example.com/a.png",
            "image/png",
            b"png",
        );
        fs::write(&path, builder.to_binary()).unwrap();
        assert_eq!(Archive::open(&path).unwrap(), builder.build());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.webarchive");
        assert_eq!(*Archive::open(&path).unwrap_err(), ErrorKind::Io(path));
    }

    #[test]
    fn unreadable_contents_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.webarchive");
        fs::write(&path, b"\0\x01 not a property list").unwrap();
        assert_eq!(*Archive::open(&path).unwrap_err(), ErrorKind::MalformedContainer);
    }
}

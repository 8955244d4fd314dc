//! Resource extraction: writes every subresource to disk under a
//! deterministic name and records where each original URL ended up.
//!
//! Layout, relative to the destination directory:
//!
//! ```text
//! <MIMEType>/<index><extension>      e.g. image/png/3.png, application/javascript/7.js
//! ```
//!
//! `<index>` is the resource's position in the archive's subresource list,
//! which makes every name unique and re-running an extraction reproduce the
//! same files.

mod mime;

pub use self::mime::{FALLBACK_EXTENSION, extension};
use crate::error::{ErrorKind, Result};
use crate::model::Archive;
use crate::path::mime_directory;
use exn::ResultExt;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::instrument;

/// Original reference → href of the local copy, relative to the HTML file.
pub type References = BTreeMap<String, String>;

/// Mapping from each subresource's declared URL to the file it was written to.
///
/// Built once per conversion and read-only afterwards. Duplicate URLs follow
/// the same last-write-wins rule as [`ResourceIndex`](crate::ResourceIndex).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionMap {
    entries: BTreeMap<String, PathBuf>,
}
impl ExtractionMap {
    pub fn get(&self, url: &str) -> Option<&Path> {
        self.entries.get(url).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(url, path)| (url.as_str(), path.as_path()))
    }

    /// Converts every local path into a `/`-separated href relative to `base`,
    /// the directory the HTML document will be written to.
    ///
    /// Paths outside of `base` are kept whole.
    pub fn references(&self, base: impl AsRef<Path>) -> References {
        let base = base.as_ref();
        self.entries
            .iter()
            .map(|(url, path)| (url.clone(), href(path.strip_prefix(base).unwrap_or(path))))
            .collect()
    }
}
impl FromIterator<(String, PathBuf)> for ExtractionMap {
    fn from_iter<T: IntoIterator<Item = (String, PathBuf)>>(iter: T) -> Self {
        let entries = iter.into_iter().fold(BTreeMap::new(), |mut entries, (url, path)| {
            entries.insert(url, path);
            entries
        });
        Self { entries }
    }
}

/// Computes `destination/<MIMEType>/<index><extension>` for a subresource.
pub fn local_path(destination: impl AsRef<Path>, index: usize, mime_type: &str) -> PathBuf {
    destination.as_ref().join(mime_directory(mime_type)).join(format!("{index}{}", extension(mime_type)))
}

/// Writes every subresource of `archive` below `destination`.
///
/// Intermediate directories are created as needed and existing files are
/// overwritten. The first failure aborts the extraction; files written before
/// it are left in place.
#[instrument(skip_all, fields(destination = %destination.as_ref().display(), resources = archive.subresources.len()))]
pub fn extract(archive: &Archive, destination: impl AsRef<Path>) -> Result<ExtractionMap> {
    let destination = destination.as_ref();
    let entries = archive
        .subresources
        .iter()
        .enumerate()
        .map(|(index, resource)| {
            let path = local_path(destination, index, &resource.mime_type);
            write(&path, &resource.data)?;
            Ok((resource.url.clone(), path))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(entries.into_iter().collect())
}

fn write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
    }
    fs::write(path, data).or_raise(|| ErrorKind::Io(path.to_path_buf()))
}

fn href(path: &Path) -> String {
    let mut segments: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => segments.push(encode_segment(&segment.to_string_lossy())),
            // Leading empty segment, so the join produces an absolute path.
            Component::RootDir if segments.is_empty() => segments.push(String::new()),
            Component::RootDir => {},
            Component::Prefix(prefix) => segments.push(prefix.as_os_str().to_string_lossy().into_owned()),
            Component::CurDir => segments.push(".".to_string()),
            Component::ParentDir => segments.push("..".to_string()),
        }
    }
    segments.join("/")
}

/// Percent-encodes the few characters that would change the meaning of a
/// relative URL path segment.
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => encoded.push_str("%25"),
            ' ' => encoded.push_str("%20"),
            '#' => encoded.push_str("%23"),
            '?' => encoded.push_str("%3F"),
            c => encoded.push(c),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ArchiveBuilder;

    fn sample() -> Archive {
        ArchiveBuilder::new("https://example.com/page", "<html></html>")
            .resource("https://example.com/logo.png", "image/png", b"\x89PNG")
            .resource("https://example.com/photo", "image/jpeg", b"\xff\xd8\xff")
            .resource("https://example.com/app.js", "application/x-javascript", b"alert(1)")
            .resource("https://example.com/font", "font/opentype", b"OTTO")
            .resource("https://example.com/blob", "application/x-made-up", b"blob")
            .build()
    }

    fn relative_files(root: &Path) -> Vec<String> {
        fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(&path, root, out);
                } else {
                    out.push(href(path.strip_prefix(root).unwrap()));
                }
            }
        }
        let mut out = Vec::new();
        walk(root, root, &mut out);
        out.sort();
        out
    }

    #[test]
    fn writes_one_file_per_resource() {
        let dir = tempfile::tempdir().unwrap();
        let archive = sample();
        let map = extract(&archive, dir.path()).unwrap();
        assert_eq!(map.len(), archive.subresources.len());
        for resource in &archive.subresources {
            let path = map.get(&resource.url).unwrap();
            assert_eq!(fs::read(path).unwrap(), resource.data);
        }
        assert_eq!(
            relative_files(dir.path()),
            [
                "application/x-javascript/2.js",
                "application/x-made-up/4.dat",
                "font/opentype/3.otf",
                "image/jpeg/1.jpg",
                "image/png/0.png",
            ]
        );
    }

    #[test]
    fn extraction_is_deterministic() {
        let archive = sample();
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let a = extract(&archive, first.path()).unwrap();
        let b = extract(&archive, second.path()).unwrap();
        assert_eq!(relative_files(first.path()), relative_files(second.path()));
        assert_eq!(a.references(first.path()), b.references(second.path()));
        for (url, path) in a.iter() {
            assert_eq!(fs::read(path).unwrap(), fs::read(b.get(url).unwrap()).unwrap());
        }
    }

    #[test]
    fn last_duplicate_url_wins() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ArchiveBuilder::new("https://example.com/", "")
            .resource("https://example.com/dup.png", "image/png", b"first")
            .resource("https://example.com/dup.png", "image/png", b"second")
            .build();
        let map = extract(&archive, dir.path()).unwrap();
        assert_eq!(map.len(), 1);
        let path = map.get("https://example.com/dup.png").unwrap();
        assert_eq!(path, dir.path().join("image/png/1.png"));
        assert_eq!(fs::read(path).unwrap(), b"second");
        // Both are still written; only the mapping prefers the later one.
        assert!(dir.path().join("image/png/0.png").exists());
    }

    #[test]
    fn overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("image/png/0.png");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, b"stale and much longer than the new content").unwrap();
        let archive = ArchiveBuilder::new("https://example.com/", "").resource("a", "image/png", b"new").build();
        extract(&archive, dir.path()).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn hostile_mime_type_stays_inside_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("page_files");
        let archive = ArchiveBuilder::new("https://example.com/", "")
            .resource("https://example.com/x", "../../escape", b"x")
            .resource("https://example.com/y", "", b"y")
            .build();
        let map = extract(&archive, &destination).unwrap();
        assert_eq!(
            map.get("https://example.com/x").unwrap(),
            destination.join("application/octet-stream/0.dat")
        );
        assert_eq!(
            map.get("https://example.com/y").unwrap(),
            destination.join("application/octet-stream/1.dat")
        );
        assert!(!dir.path().join("escape").exists());
    }

    #[test]
    fn unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("page_files");
        fs::write(&blocker, b"a file, not a directory").unwrap();
        let err = extract(&sample(), &blocker).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io(_)));
    }

    #[test]
    fn references_are_relative_hrefs() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ArchiveBuilder::new("https://example.com/", "")
            .resource("https://example.com/a.png", "image/png", b"a")
            .build();
        let map = extract(&archive, dir.path().join("My Page #1_files")).unwrap();
        let references = map.references(dir.path());
        assert_eq!(references["https://example.com/a.png"], "My%20Page%20%231_files/image/png/0.png");
    }

    #[test]
    fn references_outside_base_keep_full_path() {
        let map: ExtractionMap = [("u".to_string(), PathBuf::from("/elsewhere/image/png/0.png"))].into_iter().collect();
        assert_eq!(map.references("/somewhere")["u"], "/elsewhere/image/png/0.png");
    }
}

//! Directory names derived from MIME types.
//!
//! Every extracted resource lands in a directory named after its declared
//! MIME type, and nothing stops a hostile archive from declaring `../../etc`.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Directory used when a declared MIME type is not usable as a relative path.
pub const FALLBACK_MIME_DIRECTORY: &str = "application/octet-stream";

/// The directory, relative to the extraction root, holding resources of
/// `mime_type`.
///
/// Empty and `.` segments collapse, and `..` may cancel an earlier segment.
/// A MIME type that climbs out of the root, carries a NUL byte, has a
/// platform prefix or collapses to nothing maps to
/// [`FALLBACK_MIME_DIRECTORY`].
///
/// ```
/// use std::path::Path;
/// use wa2html_archive::{FALLBACK_MIME_DIRECTORY, mime_directory};
/// assert_eq!(mime_directory("image/svg+xml"), Path::new("image/svg+xml"));
/// assert_eq!(mime_directory("../etc"), Path::new(FALLBACK_MIME_DIRECTORY));
/// ```
pub fn mime_directory(mime_type: &str) -> PathBuf {
    match segments(mime_type) {
        Some(segments) if !segments.is_empty() => segments.into_iter().collect(),
        _ => {
            tracing::warn!(mime_type, fallback = FALLBACK_MIME_DIRECTORY, "MIME type unusable as a directory name");
            PathBuf::from(FALLBACK_MIME_DIRECTORY)
        },
    }
}

fn segments(mime_type: &str) -> Option<Vec<&OsStr>> {
    let mut segments = Vec::new();
    for component in Path::new(mime_type).components() {
        match component {
            Component::Normal(segment) if !segment.as_encoded_bytes().contains(&0) => segments.push(segment),
            Component::Normal(_) | Component::Prefix(_) => return None,
            Component::ParentDir => {
                segments.pop()?;
            },
            Component::CurDir | Component::RootDir => {},
        }
    }
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image/png", "image/png")]
    #[case("application/x-javascript", "application/x-javascript")]
    #[case("image/svg+xml", "image/svg+xml")]
    #[case("text/css; charset=utf-8", "text/css; charset=utf-8")]
    #[case("image//png", "image/png")]
    #[case("./image/./png/", "image/png")]
    #[case("/image/png", "image/png")]
    #[case("image/../font/woff2", "font/woff2")]
    fn usable_mime_types(#[case] mime_type: &str, #[case] expected: &str) {
        assert_eq!(mime_directory(mime_type), Path::new(expected));
    }

    #[rstest]
    #[case::parent("../image")]
    #[case::climbs_out("image/../../png")]
    #[case::only_parent("..")]
    #[case::nul("image\0/png")]
    #[case::empty("")]
    #[case::dot(".")]
    #[case::slashes("//")]
    fn unusable_mime_types_fall_back(#[case] mime_type: &str) {
        assert_eq!(mime_directory(mime_type), Path::new(FALLBACK_MIME_DIRECTORY));
    }
}

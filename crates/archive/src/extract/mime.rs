use std::borrow::Cow;

/// Extension used when nothing better is known about a MIME type.
pub const FALLBACK_EXTENSION: &str = ".dat";

/// Fixed overrides, consulted before the system table. The system table
/// either lacks these or lists a less familiar extension first.
const OVERRIDES: &[(&str, &str)] = &[
    ("application/javascript", ".js"),
    ("application/x-javascript", ".js"),
    ("image/jpeg", ".jpg"),
    ("font/opentype", ".otf"),
];

/// Picks a file extension (with leading dot) for a MIME type.
///
/// Parameters such as `; charset=utf-8` and letter case are ignored.
///
/// ```
/// use wa2html_archive::extension;
/// assert_eq!(extension("image/jpeg"), ".jpg");
/// assert_eq!(extension("text/css; charset=utf-8"), ".css");
/// assert_eq!(extension("application/x-made-up"), ".dat");
/// ```
pub fn extension(mime_type: &str) -> Cow<'static, str> {
    let essence = mime_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if let Some((_, ext)) = OVERRIDES.iter().find(|(mime, _)| *mime == essence) {
        return Cow::Borrowed(*ext);
    }
    mime_guess::get_mime_extensions_str(&essence)
        .and_then(|extensions| extensions.first())
        .map(|ext| Cow::Owned(format!(".{ext}")))
        .unwrap_or(Cow::Borrowed(FALLBACK_EXTENSION))
}

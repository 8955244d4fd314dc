use url::{ParseError, Position, Url};

/// Turns a relative or protocol-relative reference into an absolute URL by
/// borrowing the scheme and host of `base`.
///
/// Only the missing scheme and/or host are filled in; path, query and
/// fragment are kept exactly as written. Nothing is resolved against the
/// base's directory, so `img/a.png` becomes `https://host/img/a.png`.
///
/// A reference with a scheme but no host, such as `https:/a.png`, keeps its
/// own scheme and gains the base's host: `https://host/a.png`.
///
/// This is a best-effort hint. When the reference is already absolute, or
/// either side does not parse (or the base has no host), the reference is
/// returned unchanged rather than raising an error.
///
/// ```
/// use wa2html_archive::resolve_reference;
/// assert_eq!(resolve_reference("/a/b.png", "https://example.com/page"), "https://example.com/a/b.png");
/// assert_eq!(resolve_reference("//cdn.example.com/c.js", "https://example.com/page"), "https://cdn.example.com/c.js");
/// assert_eq!(resolve_reference("https://other.com/c.png", "https://example.com/page"), "https://other.com/c.png");
/// assert_eq!(resolve_reference("https:/a.png", "https://example.com/page"), "https://example.com/a.png");
/// ```
pub fn resolve_reference(reference: &str, base: &str) -> String {
    let Ok(base) = Url::parse(base) else {
        return reference.to_string();
    };
    if !base.has_host() || reference.is_empty() {
        return reference.to_string();
    }
    let authority = &base[Position::BeforeHost..Position::AfterPort];
    if let Some((scheme, path)) = split_scheme(reference)
        && path.starts_with('/')
        && !path.starts_with("//")
    {
        return format!("{scheme}://{authority}{path}");
    }
    match Url::parse(reference) {
        // Already carries a scheme (absolute, or opaque like `data:`/`mailto:`).
        Ok(_) => reference.to_string(),
        Err(ParseError::RelativeUrlWithoutBase) => {
            if reference.starts_with("//") {
                return format!("{}:{}", base.scheme(), reference);
            }
            let separator = if reference.starts_with(['/', '?', '#']) { "" } else { "/" };
            format!("{}://{}{}{}", base.scheme(), authority, separator, reference)
        },
        Err(_) => reference.to_string(),
    }
}

/// Splits `scheme:rest` when the prefix is a syntactically valid scheme.
fn split_scheme(reference: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = reference.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BASE: &str = "https://example.com/page";

    #[rstest]
    #[case("/a/b.png", "https://example.com/a/b.png")]
    #[case("https://other.com/c.png", "https://other.com/c.png")]
    #[case("//cdn.example.com/lib.js", "https://cdn.example.com/lib.js")]
    #[case("img/x.png", "https://example.com/img/x.png")]
    #[case("/style.css?v=3#top", "https://example.com/style.css?v=3#top")]
    #[case("?page=2", "https://example.com?page=2")]
    #[case("/a/../b.png", "https://example.com/a/../b.png")]
    #[case("/with%20space.png", "https://example.com/with%20space.png")]
    #[case("data:image/png;base64,AAAA", "data:image/png;base64,AAAA")]
    #[case("mailto:someone@example.com", "mailto:someone@example.com")]
    #[case("", "")]
    #[case("https:/a.png", "https://example.com/a.png")]
    #[case("http:/img/b.png?v=1", "http://example.com/img/b.png?v=1")]
    #[case("https:a.png", "https:a.png")]
    #[case("file:///tmp/a.png", "file:///tmp/a.png")]
    fn resolves_against_base(#[case] reference: &str, #[case] expected: &str) {
        assert_eq!(resolve_reference(reference, BASE), expected);
    }

    #[test]
    fn keeps_base_port_and_scheme() {
        assert_eq!(resolve_reference("/x.js", "http://localhost:8080/app/"), "http://localhost:8080/x.js");
        assert_eq!(resolve_reference("//cdn.test/x.js", "http://localhost:8080/"), "http://cdn.test/x.js");
    }

    #[test]
    fn drops_base_userinfo() {
        assert_eq!(resolve_reference("/x.js", "https://user:pw@example.com/"), "https://example.com/x.js");
    }

    #[rstest]
    #[case("not a url")]
    #[case("")]
    #[case("about:blank")]
    fn unusable_base_returns_reference(#[case] base: &str) {
        assert_eq!(resolve_reference("/a/b.png", base), "/a/b.png");
    }

    #[test]
    fn unparsable_reference_is_unchanged() {
        assert_eq!(resolve_reference("http://bad host/x.png", BASE), "http://bad host/x.png");
    }
}

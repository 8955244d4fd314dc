use crate::decorate::Decorator;
use crate::document::Document;
use crate::error::Result;
use crate::rewrite::{RewriteReport, rewrite};
use tracing::instrument;
use wa2html_archive::{Archive, References, Resource, ResourceIndex};

/// A processed archive: the decoded [`Archive`] together with the structures
/// derived from it.
///
/// Built in one explicit step from an archive that is never mutated, so the
/// index and document are always in sync with it.
#[derive(Debug)]
pub struct Page<'a> {
    archive: &'a Archive,
    index: ResourceIndex<'a>,
    document: Document,
}
impl<'a> Page<'a> {
    /// Builds the resource index, parses the main resource and, when a
    /// decorator is given, decorates the document once.
    #[instrument(skip_all, fields(url = %archive.main.url, decorate = decorator.is_some()))]
    pub fn build(archive: &'a Archive, decorator: Option<&Decorator>) -> Result<Self> {
        let mut document = Document::parse_with_encoding(&archive.main.data, archive.main.text_encoding.as_deref())?;
        if let Some(decorator) = decorator {
            decorator.decorate(&mut document, &archive.main.url)?;
        }
        Ok(Self { archive, index: archive.index(), document })
    }

    pub fn index(&self) -> &ResourceIndex<'a> {
        &self.index
    }

    /// Finds the subresource a reference on this page points at, trying the
    /// reference as written and then resolved against the page URL.
    pub fn find_resource(&self, reference: &str) -> Option<&'a Resource> {
        self.index.find(reference).or_else(|| self.index.find(&self.archive.resolve_reference(reference)))
    }

    /// Points references at their extracted copies. See [`rewrite`].
    pub fn rewrite(&mut self, references: &References) -> RewriteReport {
        rewrite(&self.document, references, &self.archive.main.url)
    }

    pub fn to_html(&self) -> Result<String> {
        self.document.to_html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wa2html_archive::fixtures::ArchiveBuilder;

    fn archive() -> Archive {
        ArchiveBuilder::new(
            "https://example.com/post",
            r#"<html><head><title>Post</title><link rel="stylesheet" href="/s.css"></head><body><img src="img/a.png"></body></html>"#,
        )
        .resource("https://example.com/s.css", "text/css", b"body{}")
        .resource("https://example.com/img/a.png", "image/png", b"png")
        .build()
    }

    #[test]
    fn builds_index_and_document() {
        let archive = archive();
        let page = Page::build(&archive, None).unwrap();
        assert_eq!(page.index().len(), 2);
        assert_eq!(page.find_resource("/s.css").unwrap().data, b"body{}");
        assert_eq!(page.find_resource("https://example.com/img/a.png").unwrap().mime_type, "image/png");
        assert!(page.find_resource("/nope.js").is_none());
        assert!(page.to_html().unwrap().contains("<title>Post</title>"));
    }

    #[test]
    fn rewrites_against_page_url() {
        let archive = archive();
        let mut page = Page::build(&archive, None).unwrap();
        let references: References = [
            ("https://example.com/s.css".to_string(), "post_files/text/css/0.css".to_string()),
            ("https://example.com/img/a.png".to_string(), "post_files/image/png/1.png".to_string()),
        ]
        .into_iter()
        .collect();
        let report = page.rewrite(&references);
        assert_eq!(report, RewriteReport { rewritten: 2, skipped: 0, missed: 0 });
        let html = page.to_html().unwrap();
        assert!(html.contains(r#"href="post_files/text/css/0.css""#));
        assert!(html.contains(r#"src="post_files/image/png/1.png""#));
    }

    #[test]
    fn decorates_when_asked() {
        let archive = archive();
        let decorator = Decorator::new().unwrap();
        let page = Page::build(&archive, Some(&decorator)).unwrap();
        assert!(page.to_html().unwrap().contains("inostar:publish"));
        let plain = Page::build(&archive, None).unwrap();
        assert!(!plain.to_html().unwrap().contains("inostar:publish"));
    }

    #[test]
    fn honours_declared_text_encoding() {
        let archive = ArchiveBuilder::new(
            "https://example.com/",
            b"<meta charset=\"iso-8859-1\"><title>Caf\xE9</title><p>na\xEFve r\xE9sum\xE9</p>",
        )
        .encoding(Some("ISO-8859-1"))
        .build();
        let html = Page::build(&archive, None).unwrap().to_html().unwrap();
        assert!(html.contains(r#"<meta charset="utf-8">"#));
        assert!(html.contains("<title>Café</title>"));
        assert!(html.contains("<p>naïve résumé</p>"));
    }

    #[test]
    fn binary_main_resource_fails_to_build() {
        let archive = ArchiveBuilder::new("https://example.com/", b"\x00\x01\x02garbage").build();
        let err = Page::build(&archive, None).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedHtml(_)));
    }
}

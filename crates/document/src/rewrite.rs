//! Reference rewriting: points `img`, `link` and `script` elements at the
//! extracted local copies of their resources.
//!
//! Lookup order for each reference: the raw attribute value, then the value
//! resolved against the page URL (see [`resolve_reference`]). A reference
//! found in neither form is a miss and is left exactly as written.

use crate::document::Document;
use crate::dom;
use markup5ever_rcdom::Handle;
use tracing::instrument;
use wa2html_archive::{References, resolve_reference};

/// Tally of one rewriting pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// References replaced by a local path.
    pub rewritten: usize,
    /// Elements deliberately left alone: canonical links, missing or empty
    /// attributes, inline `data:` URIs.
    pub skipped: usize,
    /// References with no extracted resource under either form.
    pub missed: usize,
}

/// The attribute holding the reference for an element we rewrite.
fn reference_attribute(node: &Handle) -> Option<&'static str> {
    match dom::local_name(node)? {
        name if name.eq_ignore_ascii_case("img") || name.eq_ignore_ascii_case("script") => Some("src"),
        name if name.eq_ignore_ascii_case("link") => Some("href"),
        _ => None,
    }
}

fn is_canonical(node: &Handle) -> bool {
    dom::is_element(node, "link")
        && dom::attribute(node, "rel").is_some_and(|rel| rel.trim().eq_ignore_ascii_case("canonical"))
}

fn is_data_uri(value: &str) -> bool {
    value.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Rewrites every reference in `document` that has an entry in `references`
/// (original URL → local href), resolving relative references against
/// `page_url`.
#[instrument(skip_all, fields(page_url = %page_url, references = references.len()))]
pub fn rewrite(document: &Document, references: &References, page_url: &str) -> RewriteReport {
    let mut report = RewriteReport::default();
    for node in document.elements() {
        let Some(attribute) = reference_attribute(&node) else {
            continue;
        };
        if is_canonical(&node) {
            report.skipped += 1;
            continue;
        }
        let value = dom::attribute(&node, attribute).unwrap_or_default();
        if value.is_empty() || is_data_uri(&value) {
            report.skipped += 1;
            continue;
        }
        let local = references.get(&value).or_else(|| references.get(&resolve_reference(&value, page_url)));
        match local {
            Some(local) => {
                dom::set_attribute(&node, attribute, local);
                report.rewritten += 1;
            },
            None => {
                tracing::debug!(reference = %value, "No extracted resource, leaving reference untouched");
                report.missed += 1;
            },
        }
    }
    report
}

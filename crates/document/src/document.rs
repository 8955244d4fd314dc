use crate::dom;
use crate::error::{ErrorKind, Result};
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use exn::ResultExt;
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};
use std::borrow::Cow;
use std::fmt;
use tracing::instrument;

/// Number of leading bytes inspected when deciding whether a payload is markup.
const SNIFF_LENGTH: usize = 1445;

/// A parsed, mutable HTML document.
///
/// Parsing follows the standard HTML error-recovery rules, so broken markup
/// still yields a tree. Only payloads that are not text at all are rejected.
pub struct Document {
    dom: RcDom,
}
impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}
impl Document {
    /// Parses the raw bytes of a main resource that declares no encoding.
    /// See [`Document::parse_with_encoding`].
    pub fn parse(bytes: impl AsRef<[u8]>) -> Result<Self> {
        Self::parse_with_encoding(bytes, None)
    }

    /// Parses the raw bytes of a main resource whose archive declares
    /// `encoding` (a WHATWG label such as `ISO-8859-1` or `Shift_JIS`).
    ///
    /// The character encoding comes from, in order: a byte-order mark, the
    /// declared encoding, a `<meta>` charset in the markup, UTF-8. Malformed
    /// sequences become U+FFFD. The document is always serialized as UTF-8,
    /// so charset declarations in the markup are rewritten to `utf-8`.
    #[instrument(skip(bytes), fields(size = bytes.as_ref().len()))]
    pub fn parse_with_encoding(bytes: impl AsRef<[u8]>, encoding: Option<&str>) -> Result<Self> {
        let bytes = bytes.as_ref();
        let (encoding, body) = match Encoding::for_bom(bytes) {
            Some((encoding, bom)) => (Some(encoding), &bytes[bom..]),
            None => (encoding.and_then(|label| Encoding::for_label_no_replacement(label.trim().as_bytes())), bytes),
        };
        if !encoding.is_some_and(is_utf16) {
            sniff(body)?;
        }
        let dom = match encoding {
            Some(encoding) => dom::parse(&decode(body, encoding)),
            None => {
                let dom = dom::parse(&decode(body, UTF_8));
                match markup_encoding(&dom) {
                    Some(declared) if declared != UTF_8 => dom::parse(&decode(body, declared)),
                    _ => dom,
                }
            },
        };
        let document = Self { dom };
        document.declare_utf8();
        Ok(document)
    }

    pub fn parse_str(html: &str) -> Self {
        Self { dom: dom::parse(html) }
    }

    /// Serializes the whole document, doctype included, as UTF-8 HTML.
    pub fn to_html(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        serialize(&mut buffer, &SerializableHandle::from(self.dom.document.clone()), opts)
            .or_raise(|| ErrorKind::Serialize)?;
        String::from_utf8(buffer).or_raise(|| ErrorKind::Serialize)
    }

    pub fn head(&self) -> Option<Handle> {
        self.first("head")
    }

    pub fn body(&self) -> Option<Handle> {
        self.first("body")
    }

    /// Every element of the document, in document order.
    pub(crate) fn elements(&self) -> impl Iterator<Item = Handle> {
        dom::descendants(&self.dom.document).into_iter().filter(|node| dom::local_name(node).is_some())
    }

    /// Rewrites `<meta>` charset declarations that name anything but UTF-8.
    fn declare_utf8(&self) {
        for node in self.elements() {
            let Some((attribute, label)) = meta_charset(&node) else {
                continue;
            };
            if Encoding::for_label(label.as_bytes()) == Some(UTF_8) {
                continue;
            }
            match attribute {
                CharsetAttribute::Charset => dom::set_attribute(&node, "charset", "utf-8"),
                CharsetAttribute::Content => dom::set_attribute(&node, "content", "text/html; charset=utf-8"),
            };
        }
    }

    fn first(&self, tag: &str) -> Option<Handle> {
        self.elements().find(|node| dom::is_element(node, tag))
    }
}

fn sniff(bytes: &[u8]) -> Result<()> {
    let head = &bytes[..bytes.len().min(SNIFF_LENGTH)];
    if let Some(position) = head.iter().position(|byte| is_binary_byte(*byte)) {
        exn::bail!(ErrorKind::MalformedHtml(format!("binary data at byte {position}")));
    }
    Ok(())
}

fn decode<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "Replaced malformed byte sequences");
    }
    text
}

fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE
}

/// Where a `<meta>` element declares a charset: `charset="…"`, or
/// `http-equiv="Content-Type" content="text/html; charset=…"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharsetAttribute {
    Charset,
    Content,
}

fn meta_charset(node: &Handle) -> Option<(CharsetAttribute, String)> {
    if !dom::is_element(node, "meta") {
        return None;
    }
    if let Some(charset) = dom::attribute(node, "charset") {
        return Some((CharsetAttribute::Charset, charset.trim().to_string()));
    }
    let http_equiv = dom::attribute(node, "http-equiv")?;
    if !http_equiv.trim().eq_ignore_ascii_case("content-type") {
        return None;
    }
    let content = dom::attribute(node, "content")?;
    let lower = content.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let label = content[start..].split(';').next().unwrap_or_default();
    Some((CharsetAttribute::Content, label.trim().trim_matches(['"', '\'']).to_string()))
}

/// The first usable charset declared by a `<meta>` element. UTF-16 labels
/// mean UTF-8 here, as the markup was readable as ASCII.
fn markup_encoding(dom: &RcDom) -> Option<&'static Encoding> {
    dom::descendants(&dom.document)
        .iter()
        .filter_map(meta_charset)
        .find_map(|(_, label)| Encoding::for_label(label.as_bytes()))
        .map(Encoding::output_encoding)
}

/// Control bytes that never appear in text.
fn is_binary_byte(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

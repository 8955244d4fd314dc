//! Optional cosmetic decoration of a converted page.
//!
//! Decorating a page, in order:
//!
//! 1. strips site chrome listed in the [`Quirks`] table for the page's host,
//! 2. appends `<meta name="inostar:publish" content="…">` to `<head>`,
//! 3. prepends the header fragment and appends the footer fragment to `<body>`.
//!
//! Header and footer are [upon] templates. The built-in ones are embedded
//! (see [`Builtins`]) and either can be replaced. Templates see these
//! variables, all plain strings:
//!
//! | Variable      | Description                                               |
//! |---------------|-----------------------------------------------------------|
//! | `link`        | The page's own URL                                        |
//! | `origin`      | `og:site_name`, else the URL's host, else `origin`        |
//! | `title`       | Text of the page's `<title>`                              |
//! | `published`   | Publish time as `YYYY-MM-DD HH:MM:SS`                     |
//! | `attribution` | Homepage of this tool                                     |
//!
//! Nothing is escaped implicitly. Use the `escape` formatter
//! (`{{ title | escape }}`) for anything that ends up in markup.

mod assets;

pub use self::assets::Builtins;
use crate::consts::{ATTRIBUTION_URL, PUBLISH_META_NAME};
use crate::document::Document;
use crate::dom;
use crate::error::{ErrorKind, Result};
use crate::metadata::Metadata;
use crate::quirks::Quirks;
use exn::ResultExt;
use scraper::Html;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::instrument;
use upon::{Engine, Template};
use url::Url;

pub const HEADER_TEMPLATE: &str = "header.html";
pub const FOOTER_TEMPLATE: &str = "footer.html";

const PUBLISHED_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
/// RFC 1123 with a numeric zone: `Mon, 02 Jan 2006 15:04:05 -0700`.
const RFC1123Z: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
);

/// Values interpolated into the header, footer and meta tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub link: String,
    pub origin: String,
    pub title: String,
    pub published: OffsetDateTime,
}
impl Context {
    pub fn new(page_url: &str, metadata: &Metadata) -> Self {
        let origin = metadata
            .site_name
            .clone()
            .or_else(|| Url::parse(page_url).ok().and_then(|url| url.host_str().map(str::to_string)))
            .unwrap_or_else(|| "origin".to_string());
        Self {
            link: page_url.to_string(),
            origin,
            title: metadata.title.clone(),
            published: metadata.publish_time(),
        }
    }

    fn parameters(&self) -> Result<upon::Value> {
        let published = self.published.format(PUBLISHED_FORMAT).or_raise(|| ErrorKind::Template)?;
        Ok(upon::value! {
            link: self.link.as_str(),
            origin: self.origin.as_str(),
            title: self.title.as_str(),
            published: published,
            attribution: ATTRIBUTION_URL,
        })
    }
}

/// Renders and injects the decoration. Built once and reused for every page
/// in a batch.
pub struct Decorator {
    engine: Engine<'static>,
    header: Template<'static>,
    footer: Template<'static>,
    quirks: Quirks,
}
impl Decorator {
    /// A decorator using the built-in templates and quirk table.
    pub fn new() -> Result<Self> {
        Self::with_templates(None, None)
    }

    /// A decorator using the given template sources, falling back to the
    /// built-in template for each one that is `None`.
    ///
    /// Templates are compiled here so syntax errors surface before any page
    /// is converted.
    pub fn with_templates(header: Option<String>, footer: Option<String>) -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let header = match header {
            Some(source) => source,
            None => Builtins::template(HEADER_TEMPLATE)?,
        };
        let footer = match footer {
            Some(source) => source,
            None => Builtins::template(FOOTER_TEMPLATE)?,
        };
        let header = engine.compile(header).or_raise(|| ErrorKind::Template)?;
        let footer = engine.compile(footer).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, header, footer, quirks: Quirks::builtin() })
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn header(&self, context: &Context) -> Result<String> {
        self.header.render(&self.engine, context.parameters()?).to_string().or_raise(|| ErrorKind::Template)
    }

    pub fn footer(&self, context: &Context) -> Result<String> {
        self.footer.render(&self.engine, context.parameters()?).to_string().or_raise(|| ErrorKind::Template)
    }

    pub fn meta(&self, context: &Context) -> Result<String> {
        let published = context.published.format(RFC1123Z).or_raise(|| ErrorKind::Template)?;
        Ok(format!(r#"<meta name="{PUBLISH_META_NAME}" content="{}">"#, addons::escape(&published)))
    }

    /// Decorates `document`, the page served from `page_url`. Meant to be
    /// called at most once per document.
    #[instrument(skip_all, fields(page_url = %page_url))]
    pub fn decorate(&self, document: &mut Document, page_url: &str) -> Result<()> {
        let mut html = Html::parse_document(&document.to_html()?);
        let removed = self.quirks.apply(&mut html, page_url);
        if removed > 0 {
            *document = Document::parse_str(&html.html());
        }
        let context = Context::new(page_url, &Metadata::from_document(&html));
        let (meta, header, footer) = (self.meta(&context)?, self.header(&context)?, self.footer(&context)?);
        if let Some(head) = document.head() {
            dom::append(&head, dom::fragment(&meta, "head"));
        }
        match document.body() {
            Some(body) => {
                dom::prepend(&body, dom::fragment(&header, "body"));
                dom::append(&body, dom::fragment(&footer, "body"));
            },
            None => tracing::warn!("Document has no <body>, header and footer were not added"),
        }
        tracing::debug!(removed, title = %context.title, origin = %context.origin, "Decorated page");
        Ok(())
    }
}

/// Custom [`upon`] extensions for HTML output.
mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Escapes the five characters that are special in HTML text and
    /// attribute values.
    pub(crate) fn escape(s: &str) -> String {
        let mut escaped = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '\'' => escaped.push_str("&#39;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&#34;"),
                c => escaped.push(c),
            }
        }
        escaped
    }

    fn escape_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => f.write_str(&escape(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Registers the `escape` formatter on the given engine.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("escape", escape_formatter);
    }
}

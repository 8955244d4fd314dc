use crate::consts::{PUBLISHED_TIME_SELECTOR, SITE_NAME_SELECTOR, TITLE_SELECTOR};
use scraper::Html;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

/// `2006-01-02T15:04:05+0100`: RFC 3339 without the colon in the offset.
const COMPACT_OFFSET: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory][offset_minute]");

/// Page metadata used to build the decoration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Text of the first `<title>` element, trimmed.
    pub title: String,
    /// `og:site_name`, when present and not blank.
    pub site_name: Option<String>,
    /// Raw `article:published_time` content.
    pub published: Option<String>,
}
impl Metadata {
    pub fn from_html(html: &str) -> Self {
        Self::from_document(&Html::parse_document(html))
    }

    pub fn from_document(html: &Html) -> Self {
        let content = |element: scraper::ElementRef<'_>| {
            element.value().attr("content").map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        };
        Self {
            title: html
                .select(&TITLE_SELECTOR)
                .next()
                .map(|title| title.text().collect::<String>().trim().to_string())
                .unwrap_or_default(),
            site_name: html.select(&SITE_NAME_SELECTOR).find_map(content),
            published: html.select(&PUBLISHED_TIME_SELECTOR).find_map(content),
        }
    }

    /// The page's publish time, or the current time when the page does not
    /// declare a usable one.
    pub fn publish_time(&self) -> OffsetDateTime {
        match self.published.as_deref().and_then(parse_published) {
            Some(published) => published,
            None => {
                tracing::debug!(published = ?self.published, "No usable publish time, using the current time");
                OffsetDateTime::now_utc()
            },
        }
    }
}

/// Parses an `article:published_time` value: RFC 3339, or the same with a
/// compact `+0100` offset.
pub fn parse_published(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    OffsetDateTime::parse(value, &Rfc3339).or_else(|_| OffsetDateTime::parse(value, COMPACT_OFFSET)).ok()
}

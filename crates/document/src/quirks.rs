//! Site quirk table: per-host chrome elements stripped before decoration.
//!
//! Some publishing platforms wrap an article in navigation, tooltips and
//! duplicated headings that make no sense once the page is saved. Each entry
//! pairs a host pattern with a list of removal selectors:
//!
//! ```text
//! telegra.ph      → div#_tl_tooltip, header, article h1:first, …
//! *.example.com   → any subdomain of example.com
//! ```
//!
//! Removals are CSS selectors, optionally followed by `:first` to remove
//! only the first match in document order. They run against a [`Html`]
//! tree, before the page is decorated.

use crate::error::{Error, ErrorKind, Result};
use scraper::{Html, Selector};
use std::fmt;
use std::str::FromStr;
use url::Url;

const FIRST_ONLY: &str = ":first";

/// Matches the host of a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostPattern {
    /// The host must be exactly this.
    Exact(String),
    /// Any subdomain of this domain, written `*.domain`. The bare domain does
    /// not match.
    Subdomains(String),
}
impl HostPattern {
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        match self {
            Self::Exact(expected) => host == *expected,
            Self::Subdomains(domain) => {
                host.strip_suffix(domain.as_str()).is_some_and(|prefix| prefix.len() > 1 && prefix.ends_with('.'))
            },
        }
    }
}
impl FromStr for HostPattern {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let pattern = s.trim().to_ascii_lowercase();
        let (pattern, wildcard) = match pattern.strip_prefix("*.") {
            Some(domain) => (domain.to_string(), true),
            None => (pattern, false),
        };
        if pattern.is_empty() || pattern.contains(['*', '/', ' ']) {
            exn::bail!(ErrorKind::InvalidSelector(s.to_string()));
        }
        Ok(if wildcard { Self::Subdomains(pattern) } else { Self::Exact(pattern) })
    }
}
impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(host) => f.write_str(host),
            Self::Subdomains(domain) => write!(f, "*.{domain}"),
        }
    }
}

/// A removal selector: any CSS selector, such as `div#_tl_tooltip` or
/// `div.banner > a[href*=ads]`, optionally suffixed with `:first`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    source: String,
    selector: Selector,
    first_only: bool,
}
impl Removal {
    pub fn first_only(&self) -> bool {
        self.first_only
    }

    /// Detaches every matching element (or only the first) and returns how
    /// many were removed.
    pub fn apply(&self, html: &mut Html) -> usize {
        let matched: Vec<_> = html.select(&self.selector).map(|element| element.id()).collect();
        let take = if self.first_only { 1 } else { matched.len() };
        let mut removed = 0;
        for id in matched.into_iter().take(take) {
            if let Some(mut node) = html.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
        removed
    }
}
impl FromStr for Removal {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let source = s.trim();
        let (chain, first_only) = match source.strip_suffix(FIRST_ONLY) {
            Some(chain) => (chain.trim_end(), true),
            None => (source, false),
        };
        if chain.is_empty() {
            exn::bail!(ErrorKind::InvalidSelector(s.to_string()));
        }
        let selector = match Selector::parse(chain) {
            Ok(selector) => selector,
            Err(err) => exn::bail!(ErrorKind::InvalidSelector(format!("{s}: {err}"))),
        };
        Ok(Self { source: source.to_string(), selector, first_only })
    }
}
impl fmt::Display for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The removals that apply to one host pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteQuirks {
    pub host: HostPattern,
    pub removals: Vec<Removal>,
}
impl SiteQuirks {
    pub fn new<S: AsRef<str>>(host: &str, removals: impl IntoIterator<Item = S>) -> Result<Self> {
        Ok(Self {
            host: host.parse()?,
            removals: removals.into_iter().map(|r| r.as_ref().parse()).collect::<Result<Vec<_>>>()?,
        })
    }
}

/// Ordered table of [`SiteQuirks`]. Every entry whose host pattern matches
/// is applied, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quirks {
    sites: Vec<SiteQuirks>,
}
impl Default for Quirks {
    fn default() -> Self {
        Self::builtin()
    }
}
impl Quirks {
    pub fn empty() -> Self {
        Self { sites: Vec::new() }
    }

    /// The table shipped with the tool.
    pub fn builtin() -> Self {
        let telegraph = SiteQuirks {
            host: HostPattern::Exact("telegra.ph".to_string()),
            removals: ["div#_tl_link_tooltip", "div#_tl_tooltip", "div#_tl_blocks", "header", "aside", "article h1:first"]
                .into_iter()
                .filter_map(|selector| selector.parse().ok())
                .collect(),
        };
        Self { sites: vec![telegraph] }
    }

    pub fn with_site(mut self, site: SiteQuirks) -> Self {
        self.sites.push(site);
        self
    }

    pub fn sites(&self) -> &[SiteQuirks] {
        &self.sites
    }

    /// Removals that apply to the page at `page_url`, in table order.
    pub fn matching(&self, page_url: &str) -> Vec<&Removal> {
        let Some(host) = Url::parse(page_url).ok().and_then(|url| url.host_str().map(str::to_string)) else {
            return Vec::new();
        };
        self.sites.iter().filter(|site| site.host.matches(&host)).flat_map(|site| site.removals.iter()).collect()
    }

    /// Applies every matching removal to `html`, returning the number of
    /// elements removed.
    pub fn apply(&self, html: &mut Html, page_url: &str) -> usize {
        self.matching(page_url)
            .into_iter()
            .map(|removal| {
                let removed = removal.apply(html);
                tracing::debug!(%removal, removed, "Applied site quirk");
                removed
            })
            .sum()
    }
}

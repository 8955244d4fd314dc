use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(TITLE_SELECTOR, "title");
selector!(SITE_NAME_SELECTOR, r#"meta[property="og:site_name"][content]"#);
selector!(PUBLISHED_TIME_SELECTOR, r#"meta[property="article:published_time"][content]"#);

/// Name of the `<meta>` tag that records the publish time on decorated pages.
pub const PUBLISH_META_NAME: &str = "inostar:publish";

/// Link embedded in the footer of decorated pages.
pub const ATTRIBUTION_URL: &str = "https://github.com/gonejack/webarchive-to-html";

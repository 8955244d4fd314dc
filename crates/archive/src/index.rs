use crate::model::Resource;
use std::collections::BTreeMap;

/// URL → resource lookup over an archive's subresources.
///
/// Built by folding the subresources in declared order into an ordered map.
/// When several resources declare the same URL the **last one wins**: later
/// entries overwrite earlier ones, matching the extraction map built by
/// [`extract`](crate::extract()).
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex<'a> {
    by_url: BTreeMap<&'a str, &'a Resource>,
}
impl<'a> ResourceIndex<'a> {
    pub fn build(resources: &'a [Resource]) -> Self {
        let by_url = resources.iter().fold(BTreeMap::new(), |mut index, resource| {
            index.insert(resource.url.as_str(), resource);
            index
        });
        Self { by_url }
    }

    pub fn find(&self, url: &str) -> Option<&'a Resource> {
        self.by_url.get(url).copied()
    }

    /// Number of distinct URLs.
    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::ArchiveBuilder;

    #[test]
    fn finds_by_declared_url() {
        let archive = ArchiveBuilder::new("https://example.com/", "")
            .resource("https://example.com/a.png", "image/png", b"a")
            .resource("https://example.com/b.png", "image/png", b"b")
            .build();
        let index = archive.index();
        assert_eq!(index.len(), 2);
        assert_eq!(index.find("https://example.com/b.png").unwrap().data, b"b");
        assert!(index.find("https://example.com/c.png").is_none());
        assert!(index.find("/a.png").is_none());
    }

    #[test]
    fn last_duplicate_wins() {
        let archive = ArchiveBuilder::new("https://example.com/", "")
            .resource("https://example.com/dup.png", "image/png", b"first")
            .resource("https://example.com/other.png", "image/png", b"other")
            .resource("https://example.com/dup.png", "image/png", b"second")
            .build();
        let index = archive.index();
        assert_eq!(index.len(), 2);
        assert_eq!(index.find("https://example.com/dup.png").unwrap().data, b"second");
    }

    #[test]
    fn empty_archive_has_empty_index() {
        let archive = ArchiveBuilder::new("https://example.com/", "").without_subresources().build();
        assert!(archive.index().is_empty());
    }
}

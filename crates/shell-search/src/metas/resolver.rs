//! Resolves result identifiers to display metadata.
//!
//! Cached identifiers are answered directly. Misses are fetched with one
//! bulk attribute call; the fetch runs outside the provider actor and its
//! result is fed back through [`MetasResolver::complete`].

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use url::Url;

use super::cache::MetadataCache;
use super::record::{MetaIcon, MetaRecord};
use crate::config::UnresolvedPolicy;
use crate::error::{ProviderError, ProviderResult};
use crate::platform::{AttributeResolver, BookmarkList, FileInfo};

/// Outcome of checking a request against the cache.
#[derive(Debug)]
pub enum Lookup {
    /// Every identifier was cached.
    Ready(ProviderResult<Vec<Arc<MetaRecord>>>),
    /// These identifiers must be fetched first, de-duplicated in first-seen
    /// order.
    Fetch(Vec<String>),
}

pub struct MetasResolver {
    cache: MetadataCache,
    bookmarks: Arc<dyn BookmarkList>,
    attributes: Arc<dyn AttributeResolver>,
    icon_size: u32,
    policy: UnresolvedPolicy,
}

impl MetasResolver {
    pub fn new(
        bookmarks: Arc<dyn BookmarkList>,
        attributes: Arc<dyn AttributeResolver>,
        icon_size: u32,
        policy: UnresolvedPolicy,
    ) -> Self {
        Self {
            cache: MetadataCache::new(),
            bookmarks,
            attributes,
            icon_size,
            policy,
        }
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn lookup(&self, ids: &[String]) -> Lookup {
        let missing = self.cache.missing(ids);
        if missing.is_empty() {
            Lookup::Ready(self.answer(ids))
        } else {
            Lookup::Fetch(missing)
        }
    }

    /// Bulk attribute fetch for `missing`, detached from `self`.
    pub fn fetch(&self, missing: Vec<String>) -> impl Future<Output = Vec<FileInfo>> + Send + 'static {
        let attributes = Arc::clone(&self.attributes);
        async move { attributes.fetch_attributes(missing).await }
    }

    /// Caches a record per fetched attribute set, then answers `ids` in
    /// input order.
    pub fn complete(
        &mut self,
        ids: &[String],
        infos: Vec<FileInfo>,
    ) -> ProviderResult<Vec<Arc<MetaRecord>>> {
        for info in &infos {
            let record = self.build_record(info);
            self.cache.insert(record);
        }
        self.answer(ids)
    }

    /// Lookup, fetch and complete in one call.
    pub async fn resolve(&mut self, ids: &[String]) -> ProviderResult<Vec<Arc<MetaRecord>>> {
        match self.lookup(ids) {
            Lookup::Ready(result) => result,
            Lookup::Fetch(missing) => {
                let infos = self.fetch(missing).await;
                self.complete(ids, infos)
            }
        }
    }

    pub fn build_record(&self, info: &FileInfo) -> MetaRecord {
        let bookmark = self.bookmarks.item_with_uri(&info.uri);
        let name = bookmark
            .as_ref()
            .map(|bookmark| bookmark.name.clone())
            .unwrap_or_else(|| info.display_name.clone());

        let icon = if let Some(thumbnail) = info.thumbnail_path.as_deref() {
            MetaIcon::Named(file_icon_descriptor(thumbnail))
        } else if let Some(icon) = bookmark.and_then(|bookmark| bookmark.icon) {
            MetaIcon::Named(icon)
        } else if let Some(icon) = info.icon.as_ref() {
            MetaIcon::Named(icon.clone())
        } else {
            MetaIcon::Pixels(self.attributes.render_generic_icon(info, self.icon_size))
        };

        MetaRecord {
            id: info.uri.clone(),
            name,
            icon,
        }
    }

    fn answer(&self, ids: &[String]) -> ProviderResult<Vec<Arc<MetaRecord>>> {
        let (records, unresolved) = self.cache.collect(ids);
        if unresolved.is_empty() {
            return Ok(records);
        }
        match self.policy {
            UnresolvedPolicy::Omit => {
                tracing::warn!(ids = ?unresolved, "omitting unresolved results");
                Ok(records)
            }
            UnresolvedPolicy::FailBatch => Err(ProviderError::UnresolvedIdentifiers(unresolved)),
        }
    }
}

fn file_icon_descriptor(path: &Path) -> String {
    Url::from_file_path(path)
        .map(|uri| uri.to_string())
        .unwrap_or_else(|()| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::platform::Bookmark;
    use crate::test_support::{ids, info, FakeAttributes, FakeBookmarks};

    fn resolver(
        bookmarks: Vec<Bookmark>,
        attributes: Arc<FakeAttributes>,
        policy: UnresolvedPolicy,
    ) -> MetasResolver {
        MetasResolver::new(Arc::new(FakeBookmarks::new(bookmarks)), attributes, 16, policy)
    }

    #[tokio::test]
    async fn duplicate_ids_share_one_record() {
        let attributes = Arc::new(FakeAttributes::new(vec![
            info("file:///u1", "one", Some("text-x-generic")),
            info("file:///u2", "two", Some("text-x-generic")),
        ]));
        let mut resolver = resolver(Vec::new(), attributes.clone(), UnresolvedPolicy::Omit);

        let records = resolver
            .resolve(&ids(&["file:///u1", "file:///u2", "file:///u1"]))
            .await
            .expect("records");

        assert_eq!(records.len(), 3);
        assert!(Arc::ptr_eq(&records[0], &records[2]));
        assert_eq!(resolver.cache().len(), 2);
        assert_eq!(attributes.calls(), 1);
        assert_eq!(attributes.requested(), vec![ids(&["file:///u1", "file:///u2"])]);
    }

    #[tokio::test]
    async fn cached_ids_are_not_fetched_again() {
        let attributes = Arc::new(FakeAttributes::new(vec![info("file:///u1", "one", None)]));
        let mut resolver = resolver(Vec::new(), attributes.clone(), UnresolvedPolicy::Omit);

        let first = resolver.resolve(&ids(&["file:///u1"])).await.expect("first");
        assert!(matches!(resolver.lookup(&ids(&["file:///u1"])), Lookup::Ready(_)));
        let second = resolver.resolve(&ids(&["file:///u1"])).await.expect("second");

        assert!(Arc::ptr_eq(&first[0], &second[0]));
        assert_eq!(attributes.calls(), 1);
    }

    #[test]
    fn bookmark_name_and_icon_take_precedence() {
        let attributes = Arc::new(FakeAttributes::new(Vec::new()));
        let resolver = resolver(
            vec![Bookmark {
                uri: "file:///home/user/Documents".to_string(),
                name: "My Documents".to_string(),
                icon: Some("folder-documents".to_string()),
            }],
            attributes,
            UnresolvedPolicy::Omit,
        );

        let record = resolver.build_record(&info("file:///home/user/Documents", "Documents", Some("folder")));
        assert_eq!(record.name, "My Documents");
        assert_eq!(record.icon, MetaIcon::Named("folder-documents".to_string()));
    }

    #[test]
    fn thumbnail_beats_every_other_icon() {
        let resolver = resolver(Vec::new(), Arc::new(FakeAttributes::new(Vec::new())), UnresolvedPolicy::Omit);
        let mut photo = info("file:///home/user/photo.png", "photo.png", Some("image-x-generic"));
        photo.thumbnail_path = Some(PathBuf::from("/home/user/.cache/thumbnails/large/abc.png"));

        let record = resolver.build_record(&photo);
        assert_eq!(
            record.icon,
            MetaIcon::Named("file:///home/user/.cache/thumbnails/large/abc.png".to_string())
        );
    }

    #[test]
    fn generic_icon_is_rendered_inline() {
        let resolver = resolver(Vec::new(), Arc::new(FakeAttributes::new(Vec::new())), UnresolvedPolicy::Omit);
        let record = resolver.build_record(&info("file:///blob", "blob", None));

        match record.icon {
            MetaIcon::Pixels(image) => {
                assert_eq!(image.width, 16);
                assert_eq!(image.data.len(), 16 * 16 * 4);
            }
            other => panic!("expected pixels, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unresolved_ids_follow_policy() {
        let known = || vec![info("file:///u1", "one", None)];

        let mut omit = resolver(Vec::new(), Arc::new(FakeAttributes::new(known())), UnresolvedPolicy::Omit);
        let records = omit
            .resolve(&ids(&["file:///u1", "file:///gone"]))
            .await
            .expect("omit");
        assert_eq!(records.len(), 1);

        let mut fail = resolver(Vec::new(), Arc::new(FakeAttributes::new(known())), UnresolvedPolicy::FailBatch);
        let error = fail
            .resolve(&ids(&["file:///u1", "file:///gone"]))
            .await
            .expect_err("fail");
        match error {
            ProviderError::UnresolvedIdentifiers(missing) => assert_eq!(missing, vec!["file:///gone"]),
            other => panic!("unexpected error: {other}"),
        }
        // The resolvable part is still cached.
        assert!(fail.cache().contains("file:///u1"));
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use filesearch::EngineFactory;

use crate::error::ProviderResult;
use crate::metas::PixelImage;

use super::types::{Bookmark, Drive, FileInfo, Mount, Volume};

/// The user's ordered bookmark list.
pub trait BookmarkList: Send + Sync {
    /// Picks up changes to the backing store. Called before each search.
    fn refresh(&self) {}

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn item_at(&self, index: usize) -> Option<Bookmark>;

    fn item_with_uri(&self, uri: &str) -> Option<Bookmark> {
        (0..self.len())
            .filter_map(|index| self.item_at(index))
            .find(|bookmark| bookmark.uri == uri)
    }
}

pub trait VolumeMonitor: Send + Sync {
    fn connected_drives(&self) -> Vec<Drive> {
        Vec::new()
    }
    fn volumes(&self) -> Vec<Volume> {
        Vec::new()
    }
    fn mounts(&self) -> Vec<Mount> {
        Vec::new()
    }
}

#[async_trait]
pub trait AttributeResolver: Send + Sync {
    /// Fetches attributes for all `uris` in one call. URIs without a backing
    /// resource are left out of the result.
    async fn fetch_attributes(&self, uris: Vec<String>) -> Vec<FileInfo>;

    /// Renders the generic icon for `info` as pixels of `size`x`size`.
    fn render_generic_icon(&self, info: &FileInfo, size: u32) -> PixelImage;
}

pub trait Launcher: Send + Sync {
    fn open_uri(&self, uri: &str) -> ProviderResult<()>;
}

/// Everything the provider needs from the outside world.
#[derive(Clone)]
pub struct Collaborators {
    pub bookmarks: Arc<dyn BookmarkList>,
    pub volumes: Arc<dyn VolumeMonitor>,
    pub attributes: Arc<dyn AttributeResolver>,
    pub launcher: Arc<dyn Launcher>,
    pub engines: Arc<dyn EngineFactory>,
}

pub mod portable;

mod adapters;
pub mod factory;
pub mod types;

pub use adapters::portable::{
    parse_bookmarks, parse_mounts, FsAttributeResolver, GtkBookmarks, ProcMounts, XdgLauncher,
};
pub use adapters::{AttributeResolver, BookmarkList, Collaborators, Launcher, VolumeMonitor};
pub use factory::default_collaborators;
pub use types::{Bookmark, Drive, FileInfo, Mount, Volume};

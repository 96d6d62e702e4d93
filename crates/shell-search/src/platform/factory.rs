use std::sync::Arc;

use filesearch::{WalkEngineFactory, WalkOptions};

use super::adapters::portable::{FsAttributeResolver, GtkBookmarks, ProcMounts, XdgLauncher};
use super::adapters::Collaborators;
use crate::config::ProviderConfig;

pub fn default_collaborators(config: &ProviderConfig) -> Collaborators {
    let walk = WalkOptions {
        max_depth: config.walk_max_depth,
        batch_size: config.walk_batch_size,
        ..WalkOptions::default()
    };

    Collaborators {
        bookmarks: Arc::new(GtkBookmarks::load_default()),
        volumes: Arc::new(ProcMounts::default()),
        attributes: Arc::new(FsAttributeResolver::new()),
        launcher: Arc::new(XdgLauncher::new()),
        engines: Arc::new(WalkEngineFactory::new(walk)),
    }
}

//! Fake collaborators shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use filesearch::{EngineFactory, FilesearchError, FilesearchResult, Query, SearchEngine, SearchListener};

use crate::error::{ProviderError, ProviderResult};
use crate::metas::PixelImage;
use crate::platform::{
    AttributeResolver, Bookmark, BookmarkList, Collaborators, Drive, FileInfo, Launcher, Mount,
    Volume, VolumeMonitor,
};

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub fn info(uri: &str, name: &str, icon: Option<&str>) -> FileInfo {
    FileInfo {
        uri: uri.to_string(),
        display_name: name.to_string(),
        icon: icon.map(str::to_string),
        thumbnail_path: None,
    }
}

pub fn bookmark(uri: &str, name: &str) -> Bookmark {
    Bookmark {
        uri: uri.to_string(),
        name: name.to_string(),
        icon: Some("folder".to_string()),
    }
}

pub fn mount(name: &str, root_uri: &str) -> Mount {
    Mount {
        name: name.to_string(),
        root_uri: root_uri.to_string(),
        shadowed: false,
        has_volume: false,
    }
}

#[derive(Default)]
pub struct FakeBookmarks {
    items: Vec<Bookmark>,
}

impl FakeBookmarks {
    pub fn new(items: Vec<Bookmark>) -> Self {
        Self { items }
    }
}

impl BookmarkList for FakeBookmarks {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn item_at(&self, index: usize) -> Option<Bookmark> {
        self.items.get(index).cloned()
    }
}

#[derive(Default)]
pub struct FakeVolumes {
    pub drives: Vec<Drive>,
    pub volumes: Vec<Volume>,
    pub mounts: Vec<Mount>,
}

impl VolumeMonitor for FakeVolumes {
    fn connected_drives(&self) -> Vec<Drive> {
        self.drives.clone()
    }

    fn volumes(&self) -> Vec<Volume> {
        self.volumes.clone()
    }

    fn mounts(&self) -> Vec<Mount> {
        self.mounts.clone()
    }
}

/// Answers from a fixed table and records every bulk request.
#[derive(Default)]
pub struct FakeAttributes {
    known: HashMap<String, FileInfo>,
    requested: Mutex<Vec<Vec<String>>>,
    calls: AtomicUsize,
}

impl FakeAttributes {
    pub fn new(infos: Vec<FileInfo>) -> Self {
        Self {
            known: infos
                .into_iter()
                .map(|info| (info.uri.clone(), info))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<Vec<String>> {
        self.requested.lock().expect("requested lock").clone()
    }
}

#[async_trait]
impl AttributeResolver for FakeAttributes {
    async fn fetch_attributes(&self, uris: Vec<String>) -> Vec<FileInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .expect("requested lock")
            .push(uris.clone());
        uris.iter()
            .filter_map(|uri| self.known.get(uri).cloned())
            .collect()
    }

    fn render_generic_icon(&self, _info: &FileInfo, size: u32) -> PixelImage {
        PixelImage::solid(size, [0, 0, 0, 0xff])
    }
}

#[derive(Default)]
pub struct FakeLauncher {
    pub fail: bool,
    opened: Mutex<Vec<String>>,
}

impl FakeLauncher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("opened lock").clone()
    }
}

impl Launcher for FakeLauncher {
    fn open_uri(&self, uri: &str) -> ProviderResult<()> {
        self.opened.lock().expect("opened lock").push(uri.to_string());
        if self.fail {
            return Err(ProviderError::collaborator("launcher", "no handler"));
        }
        Ok(())
    }
}

/// Observes every engine created by a [`ScriptedEngines`] factory.
#[derive(Default)]
pub struct EngineProbe {
    pub created: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub fail_start: bool,
    listeners: Mutex<Vec<Arc<dyn SearchListener>>>,
    queries: Mutex<Vec<Query>>,
}

impl EngineProbe {
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn last_listener(&self) -> Arc<dyn SearchListener> {
        self.listeners
            .lock()
            .expect("listeners lock")
            .last()
            .cloned()
            .expect("no engine started")
    }

    pub fn last_query(&self) -> Query {
        self.queries
            .lock()
            .expect("queries lock")
            .last()
            .cloned()
            .expect("no query set")
    }
}

/// Engine driven by the test through the captured listener.
struct ScriptedEngine {
    probe: Arc<EngineProbe>,
    query: Option<Query>,
}

impl SearchEngine for ScriptedEngine {
    fn set_query(&mut self, query: Query) {
        self.query = Some(query);
    }

    fn start(&mut self, listener: Arc<dyn SearchListener>) -> FilesearchResult<()> {
        if self.probe.fail_start {
            return Err(FilesearchError::UnsupportedLocation("scripted".to_string()));
        }
        let query = self.query.clone().ok_or(FilesearchError::MissingQuery)?;
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
        self.probe.queries.lock().expect("queries lock").push(query);
        self.probe
            .listeners
            .lock()
            .expect("listeners lock")
            .push(listener);
        Ok(())
    }

    fn stop(&mut self) {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct ScriptedEngines {
    pub probe: Arc<EngineProbe>,
}

impl ScriptedEngines {
    pub fn new(probe: EngineProbe) -> Self {
        Self {
            probe: Arc::new(probe),
        }
    }
}

impl EngineFactory for ScriptedEngines {
    fn create_engine(&self) -> Box<dyn SearchEngine> {
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Box::new(ScriptedEngine {
            probe: Arc::clone(&self.probe),
            query: None,
        })
    }
}

/// Fakes wired together, with handles kept for assertions.
pub struct Fakes {
    pub probe: Arc<EngineProbe>,
    pub attributes: Arc<FakeAttributes>,
    pub launcher: Arc<FakeLauncher>,
    pub collaborators: Collaborators,
}

pub fn fakes(
    bookmarks: Vec<Bookmark>,
    volumes: FakeVolumes,
    infos: Vec<FileInfo>,
    probe: EngineProbe,
    launcher: FakeLauncher,
) -> Fakes {
    let engines = ScriptedEngines::new(probe);
    let probe = Arc::clone(&engines.probe);
    let attributes = Arc::new(FakeAttributes::new(infos));
    let launcher = Arc::new(launcher);
    let collaborators = Collaborators {
        bookmarks: Arc::new(FakeBookmarks::new(bookmarks)),
        volumes: Arc::new(volumes),
        attributes: attributes.clone(),
        launcher: launcher.clone(),
        engines: Arc::new(engines),
    };
    Fakes {
        probe,
        attributes,
        launcher,
        collaborators,
    }
}

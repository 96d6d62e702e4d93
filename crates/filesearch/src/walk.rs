//! Portable engine that walks the query location and matches file names.
//!
//! The walk runs on a dedicated thread, reports matches in batches and
//! checks its stop token between entries. Symlinked directories are not
//! followed.

use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use url::Url;

use crate::cancel::StopToken;
use crate::engine::{EngineFactory, SearchEngine, SearchListener};
use crate::error::{FilesearchError, FilesearchResult};
use crate::hit::SearchHit;
use crate::query::Query;

#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Maximum directory depth below the query location.
    pub max_depth: usize,
    /// Number of hits reported per `hits_added` call.
    pub batch_size: usize,
    /// Whether dot-files and dot-directories are searched.
    pub include_hidden: bool,
    /// Directories skipped entirely.
    pub ignore_directories: Vec<PathBuf>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: 12,
            batch_size: 64,
            include_hidden: false,
            ignore_directories: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct WalkEngine {
    options: WalkOptions,
    query: Option<Query>,
    stop: Option<StopToken>,
}

impl WalkEngine {
    pub fn new(options: WalkOptions) -> Self {
        Self {
            options,
            query: None,
            stop: None,
        }
    }
}

impl SearchEngine for WalkEngine {
    fn set_query(&mut self, query: Query) {
        self.query = Some(query);
    }

    fn start(&mut self, listener: Arc<dyn SearchListener>) -> FilesearchResult<()> {
        if self.stop.is_some() {
            return Err(FilesearchError::AlreadyRunning);
        }
        let query = self.query.clone().ok_or(FilesearchError::MissingQuery)?;
        let root = query
            .location_path()
            .ok_or_else(|| FilesearchError::UnsupportedLocation(query.location().to_string()))?;

        let words = query.words();
        let options = self.options.clone();
        let stop = StopToken::new();
        let worker_stop = stop.clone();

        std::thread::Builder::new()
            .name("filesearch-walk".to_string())
            .spawn(move || {
                let walk = WalkData::new(&root, &words, &options, &worker_stop, listener.as_ref());
                walk.run();
            })?;

        tracing::debug!(query = query.text(), "walk engine started");
        self.stop = Some(stop);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stop) = self.stop.as_ref() {
            stop.stop();
        }
    }
}

impl Drop for WalkEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Creates a [`WalkEngine`] per search with shared options.
#[derive(Debug, Clone, Default)]
pub struct WalkEngineFactory {
    options: WalkOptions,
}

impl WalkEngineFactory {
    pub fn new(options: WalkOptions) -> Self {
        Self { options }
    }
}

impl EngineFactory for WalkEngineFactory {
    fn create_engine(&self) -> Box<dyn SearchEngine> {
        Box::new(WalkEngine::new(self.options.clone()))
    }
}

/// State of one walk, owned by the worker thread.
struct WalkData<'a> {
    root: &'a Path,
    words: &'a [String],
    options: &'a WalkOptions,
    stop: &'a StopToken,
    listener: &'a dyn SearchListener,
    batch: Vec<SearchHit>,
    visited: usize,
}

impl<'a> WalkData<'a> {
    fn new(
        root: &'a Path,
        words: &'a [String],
        options: &'a WalkOptions,
        stop: &'a StopToken,
        listener: &'a dyn SearchListener,
    ) -> Self {
        Self {
            root,
            words,
            options,
            stop,
            listener,
            batch: Vec::new(),
            visited: 0,
        }
    }

    fn run(mut self) {
        let entries = match fs::read_dir(self.root) {
            Ok(entries) => entries,
            Err(error) => {
                if !self.stop.is_stopped() {
                    self.listener
                        .failed(format!("cannot read {}: {error}", self.root.display()));
                }
                return;
            }
        };

        let completed = self.walk_entries(entries, 0).and_then(|()| self.flush());
        if completed.is_none() {
            tracing::debug!(visited = self.visited, "walk stopped");
            return;
        }
        tracing::debug!(visited = self.visited, "walk finished");
        self.listener.finished();
    }

    fn walk_entries(&mut self, entries: ReadDir, depth: usize) -> Option<()> {
        for entry in entries.flatten() {
            self.visited += 1;
            self.stop.ensure_running_sparse(self.visited)?;

            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if !self.options.include_hidden && name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            if self.should_ignore(&path) {
                continue;
            }
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if self.matches(&name) {
                if let Some(hit) = hit_for_entry(&path, &entry) {
                    self.batch.push(hit);
                    if self.batch.len() >= self.options.batch_size {
                        self.flush()?;
                    }
                }
            }

            if file_type.is_dir() && depth + 1 < self.options.max_depth {
                match fs::read_dir(&path) {
                    Ok(children) => self.walk_entries(children, depth + 1)?,
                    Err(error) => tracing::trace!("skipping {}: {error}", path.display()),
                }
            }
        }
        Some(())
    }

    fn flush(&mut self) -> Option<()> {
        self.stop.ensure_running()?;
        if !self.batch.is_empty() {
            self.listener.hits_added(std::mem::take(&mut self.batch));
        }
        Some(())
    }

    fn should_ignore(&self, path: &Path) -> bool {
        self.options
            .ignore_directories
            .iter()
            .any(|ignored| path == ignored || path.starts_with(ignored))
    }

    fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.words.iter().all(|word| name.contains(word.as_str()))
    }
}

fn hit_for_entry(path: &Path, entry: &fs::DirEntry) -> Option<SearchHit> {
    let uri = Url::from_file_path(path).ok()?;
    let metadata = entry.metadata().ok();
    let modified_at = metadata
        .as_ref()
        .and_then(|metadata| metadata.modified().ok())
        .map(DateTime::<Utc>::from);
    let accessed_at = metadata
        .as_ref()
        .and_then(|metadata| metadata.accessed().ok())
        .map(DateTime::<Utc>::from);

    Some(
        SearchHit::new(uri.to_string())
            .with_modified_at(modified_at)
            .with_accessed_at(accessed_at),
    )
}

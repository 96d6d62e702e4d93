use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use filesearch::{FilesearchResult, Query, SearchEngine, SearchHit, SearchListener};
use tokio::sync::oneshot;

use crate::keepalive::KeepAliveGuard;
use crate::matcher::QueryTerms;
use crate::platform::{BookmarkList, Mount, VolumeMonitor};

/// Receives the ranked result URIs of one search.
pub type ResultReply = oneshot::Sender<Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Running,
    Completed,
    Cancelled,
    Errored,
}

/// One in-flight search: the engine, the hits gathered so far and the
/// caller waiting for the result list.
///
/// The reply is sent exactly once. Terminal transitions consume the session;
/// a session dropped without one replies with an empty list.
pub struct SearchSession {
    generation: u64,
    query: Query,
    terms: QueryTerms,
    hits: HashMap<String, SearchHit>,
    reply: Option<ResultReply>,
    engine: Option<Box<dyn SearchEngine>>,
    keepalive: Option<KeepAliveGuard>,
    state: SessionState,
    started_at: Instant,
}

impl SearchSession {
    pub fn new(
        generation: u64,
        query: Query,
        terms: QueryTerms,
        reply: ResultReply,
        engine: Box<dyn SearchEngine>,
        keepalive: KeepAliveGuard,
    ) -> Self {
        Self {
            generation,
            query,
            terms,
            hits: HashMap::new(),
            reply: Some(reply),
            engine: Some(engine),
            keepalive: Some(keepalive),
            state: SessionState::Created,
            started_at: Instant::now(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.hits.contains_key(uri)
    }

    /// Adds bookmarks and mounts whose names match the query terms.
    pub fn add_quick_matches(&mut self, bookmarks: &dyn BookmarkList, volumes: &dyn VolumeMonitor) {
        let mut matches = Vec::new();

        for index in 0..bookmarks.len() {
            let Some(bookmark) = bookmarks.item_at(index) else {
                continue;
            };
            if self.terms.matches(&bookmark.name) {
                matches.push(bookmark.uri);
            }
        }

        let drive_mounts = volumes
            .connected_drives()
            .into_iter()
            .flat_map(|drive| drive.volumes)
            .filter_map(|volume| volume.mount);
        let volume_mounts = volumes
            .volumes()
            .into_iter()
            .filter(|volume| !volume.has_drive)
            .filter_map(|volume| volume.mount);
        let loose_mounts = volumes
            .mounts()
            .into_iter()
            .filter(|mount| !mount.shadowed && !mount.has_volume);

        let mounts: Vec<Mount> = drive_mounts.chain(volume_mounts).chain(loose_mounts).collect();
        for mount in mounts {
            if self.terms.matches(&mount.name) {
                matches.push(mount.root_uri);
            }
        }

        tracing::debug!(
            generation = self.generation,
            count = matches.len(),
            "quick matches added"
        );
        self.hits_added(matches.into_iter().map(SearchHit::new).collect());
    }

    /// Hands the query to the engine and starts it.
    pub fn start(&mut self, listener: Arc<dyn SearchListener>) -> FilesearchResult<()> {
        if let Some(engine) = self.engine.as_mut() {
            engine.set_query(self.query.clone());
            engine.start(listener)?;
        }
        self.state = SessionState::Running;
        tracing::debug!(
            generation = self.generation,
            query = self.query.text(),
            "search started"
        );
        Ok(())
    }

    /// Scores and upserts hits; a later hit for a URI replaces the earlier one.
    pub fn hits_added(&mut self, hits: Vec<SearchHit>) {
        for mut hit in hits {
            hit.compute_scores(&self.query);
            self.hits.insert(hit.uri().to_string(), hit);
        }
    }

    pub fn hits_subtracted(&mut self, uris: Vec<String>) {
        for uri in uris {
            self.hits.remove(&uri);
        }
    }

    /// URIs by relevance, highest first. Equal scores order by URI.
    pub fn ranked_uris(&self) -> Vec<String> {
        let mut hits: Vec<&SearchHit> = self.hits.values().collect();
        hits.sort_unstable_by(|a, b| {
            b.relevance()
                .partial_cmp(&a.relevance())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.uri().cmp(b.uri()))
        });
        hits.into_iter().map(|hit| hit.uri().to_string()).collect()
    }

    pub fn complete(self) {
        let uris = self.ranked_uris();
        self.finish(SessionState::Completed, uris);
    }

    pub fn fail(self, message: &str) {
        tracing::warn!(generation = self.generation, "search failed: {message}");
        self.finish(SessionState::Errored, Vec::new());
    }

    pub fn cancel(self) {
        self.finish(SessionState::Cancelled, Vec::new());
    }

    fn finish(mut self, state: SessionState, uris: Vec<String>) {
        self.state = state;
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
        self.hits.clear();
        self.keepalive.take();

        tracing::debug!(
            generation = self.generation,
            state = ?state,
            results = uris.len(),
            elapsed_ms = self.started_at.elapsed().as_millis() as u64,
            "search finished"
        );
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(uris);
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(Vec::new());
        }
    }
}

//! Engine interface consumed by search sessions.
//!
//! An engine is created per search. The caller sets a query, starts the
//! engine with a single listener and may stop it at any time. After `stop`
//! the engine drops its listener; notifications already in flight can still
//! arrive, so listeners must tolerate late calls.

use std::sync::Arc;

use crate::error::FilesearchResult;
use crate::hit::SearchHit;
use crate::query::Query;

/// Receives incremental results from a running engine.
///
/// Methods may be called from any thread.
pub trait SearchListener: Send + Sync {
    fn hits_added(&self, hits: Vec<SearchHit>);
    fn hits_subtracted(&self, uris: Vec<String>);
    fn finished(&self);
    fn failed(&self, message: String);
}

pub trait SearchEngine: Send {
    fn set_query(&mut self, query: Query);

    /// Starts searching for the current query. Results are reported to
    /// `listener` until the search finishes, fails or is stopped.
    fn start(&mut self, listener: Arc<dyn SearchListener>) -> FilesearchResult<()>;

    /// Asks the engine to stop. Idempotent; a stopped engine reports nothing
    /// further on its own.
    fn stop(&mut self);
}

/// Creates a fresh engine for each search.
pub trait EngineFactory: Send + Sync {
    fn create_engine(&self) -> Box<dyn SearchEngine>;
}

impl<F> EngineFactory for F
where
    F: Fn() -> Box<dyn SearchEngine> + Send + Sync,
{
    fn create_engine(&self) -> Box<dyn SearchEngine> {
        self()
    }
}

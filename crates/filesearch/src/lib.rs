//! File search engine interface and a portable directory-walking engine.
//!
//! This crate provides:
//! - `Query` and `SearchHit` with relevance scoring
//! - The `SearchEngine` / `SearchListener` contract used by search sessions
//! - `WalkEngine`, a cancellable name-matching walk of the query location

pub mod cancel;
pub mod engine;
pub mod error;
pub mod hit;
pub mod query;
pub mod walk;

// Re-export main types
pub use cancel::StopToken;
pub use engine::{EngineFactory, SearchEngine, SearchListener};
pub use error::{FilesearchError, FilesearchResult};
pub use hit::SearchHit;
pub use query::Query;
pub use walk::{WalkEngine, WalkEngineFactory, WalkOptions};

//! Search hits and relevance scoring.

use chrono::{DateTime, Utc};
use url::Url;

use crate::query::Query;

/// Hits more than this many directories below the query location get no
/// proximity bonus.
const MAX_PROXIMITY_DEPTH: usize = 10;
const MAX_MATCH_BONUS: f64 = 500.0;

/// A candidate result reported by an engine or a quick-match pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    uri: String,
    fts_rank: f64,
    modified_at: Option<DateTime<Utc>>,
    accessed_at: Option<DateTime<Utc>>,
    relevance: f64,
}

impl SearchHit {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            fts_rank: 0.0,
            modified_at: None,
            accessed_at: None,
            relevance: 0.0,
        }
    }

    pub fn with_fts_rank(mut self, rank: f64) -> Self {
        self.fts_rank = rank;
        self
    }

    pub fn with_modified_at(mut self, time: Option<DateTime<Utc>>) -> Self {
        self.modified_at = time;
        self
    }

    pub fn with_accessed_at(mut self, time: Option<DateTime<Utc>>) -> Self {
        self.accessed_at = time;
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Content score supplied by the engine (full-text rank), `0.0` if none.
    pub fn fts_rank(&self) -> f64 {
        self.fts_rank
    }

    /// Score computed against the query by [`SearchHit::compute_scores`].
    pub fn relevance(&self) -> f64 {
        self.relevance
    }

    pub fn compute_scores(&mut self, query: &Query) {
        self.compute_scores_at(query, Utc::now());
    }

    /// Scores the hit as the sum of three bonuses:
    /// proximity to the query location, recency of modification or access,
    /// and the engine's content rank.
    pub fn compute_scores_at(&mut self, query: &Query, now: DateTime<Utc>) {
        let proximity_bonus = Url::parse(&self.uri)
            .ok()
            .and_then(|target| directory_distance(query.location(), &target))
            .filter(|distance| *distance < MAX_PROXIMITY_DEPTH)
            .map(|distance| 10_000.0 - 1_000.0 * distance as f64)
            .unwrap_or(0.0);

        let days_since = |time: Option<DateTime<Utc>>| {
            time.map(|time| now.signed_duration_since(time).num_days())
                .unwrap_or(i64::MAX)
        };
        let idle_days = days_since(self.modified_at).min(days_since(self.accessed_at));
        let recent_bonus = match idle_days {
            days if days > 90 => 0.0,
            days if days > 30 => 10.0,
            days if days > 14 => 30.0,
            days if days > 7 => 50.0,
            days if days > 1 => 70.0,
            _ => 100.0,
        };

        let match_bonus = if self.fts_rank > 0.0 {
            (10.0 * self.fts_rank).min(MAX_MATCH_BONUS)
        } else {
            0.0
        };

        self.relevance = proximity_bonus + recent_bonus + match_bonus;
    }
}

/// Number of directories between `location` and the parent of `target`,
/// or `None` when `target` is not strictly inside `location`.
fn directory_distance(location: &Url, target: &Url) -> Option<usize> {
    if location.scheme() != target.scheme()
        || location.host_str() != target.host_str()
        || location.port() != target.port()
    {
        return None;
    }

    let base = path_segments(location);
    let path = path_segments(target);
    if path.len() <= base.len() || path[..base.len()] != base[..] {
        return None;
    }
    Some(path.len() - base.len() - 1)
}

fn path_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default()
}

use std::sync::Arc;

use filesearch::{EngineFactory, Query};
use tokio::sync::mpsc;
use url::Url;

use crate::keepalive::KeepAlive;
use crate::matcher::{is_single_character_query, QueryTerms};
use crate::platform::{BookmarkList, Collaborators, VolumeMonitor};
use crate::runtime::protocol::ProviderEvent;

use super::listener::{SessionEvent, SessionListener};
use super::session::{ResultReply, SearchSession};

/// Owns the single current search session.
///
/// Starting a search cancels the previous one first. Engine events carry
/// the generation of the session that produced them; events for any other
/// generation are dropped.
pub struct SessionManager {
    engines: Arc<dyn EngineFactory>,
    bookmarks: Arc<dyn BookmarkList>,
    volumes: Arc<dyn VolumeMonitor>,
    keepalive: KeepAlive,
    location: Url,
    events: mpsc::UnboundedSender<ProviderEvent>,
    generation: u64,
    current: Option<SearchSession>,
}

impl SessionManager {
    pub fn new(
        collaborators: &Collaborators,
        keepalive: KeepAlive,
        location: Url,
        events: mpsc::UnboundedSender<ProviderEvent>,
    ) -> Self {
        Self {
            engines: Arc::clone(&collaborators.engines),
            bookmarks: Arc::clone(&collaborators.bookmarks),
            volumes: Arc::clone(&collaborators.volumes),
            keepalive,
            location,
            events,
            generation: 0,
            current: None,
        }
    }

    pub fn start_search(&mut self, reply: ResultReply, terms: Vec<String>) {
        self.cancel();

        if is_single_character_query(&terms) {
            tracing::debug!("skipping single character search");
            let _ = reply.send(Vec::new());
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        let query = Query::from_terms(&terms, self.location.clone());
        let mut session = SearchSession::new(
            generation,
            query,
            QueryTerms::from_terms(&terms),
            reply,
            self.engines.create_engine(),
            self.keepalive.hold(),
        );
        self.bookmarks.refresh();
        session.add_quick_matches(self.bookmarks.as_ref(), self.volumes.as_ref());

        let listener = Arc::new(SessionListener::new(generation, self.events.clone()));
        match session.start(listener) {
            Ok(()) => self.current = Some(session),
            Err(error) => session.fail(&error.to_string()),
        }
    }

    pub fn start_subsearch(
        &mut self,
        reply: ResultReply,
        previous_results: Vec<String>,
        terms: Vec<String>,
    ) {
        tracing::debug!(previous = previous_results.len(), "subsearch requested");
        self.start_search(reply, terms);
    }

    pub fn handle_event(&mut self, generation: u64, event: SessionEvent) {
        if self.current_generation() != Some(generation) {
            tracing::debug!(generation, "dropping event from stale search");
            return;
        }

        match event {
            SessionEvent::HitsAdded(hits) => {
                if let Some(session) = self.current.as_mut() {
                    tracing::debug!(generation, count = hits.len(), "hits added");
                    session.hits_added(hits);
                }
            }
            SessionEvent::HitsSubtracted(uris) => {
                if let Some(session) = self.current.as_mut() {
                    tracing::debug!(generation, count = uris.len(), "hits subtracted");
                    session.hits_subtracted(uris);
                }
            }
            SessionEvent::Finished => {
                if let Some(session) = self.current.take() {
                    session.complete();
                }
            }
            SessionEvent::Failed(message) => {
                if let Some(session) = self.current.take() {
                    session.fail(&message);
                }
            }
        }
    }

    /// Cancels the current session, if any.
    pub fn cancel(&mut self) {
        if let Some(session) = self.current.take() {
            tracing::debug!(generation = session.generation(), "cancelling search");
            session.cancel();
        }
    }

    pub fn current_generation(&self) -> Option<u64> {
        self.current.as_ref().map(SearchSession::generation)
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use filesearch::SearchHit;
    use tokio::sync::oneshot;

    use super::*;
    use crate::platform::GtkBookmarks;
    use crate::test_support::{bookmark, fakes, ids, EngineProbe, FakeLauncher, FakeVolumes, Fakes};

    struct Harness {
        manager: SessionManager,
        events: mpsc::UnboundedReceiver<ProviderEvent>,
        keepalive: KeepAlive,
        fakes: Fakes,
    }

    fn harness(probe: EngineProbe) -> Harness {
        let fakes = fakes(
            vec![bookmark("file:///home/user/Documents", "My Documents")],
            FakeVolumes::default(),
            Vec::new(),
            probe,
            FakeLauncher::default(),
        );
        let keepalive = KeepAlive::new();
        let (tx, events) = mpsc::unbounded_channel();
        let manager = SessionManager::new(
            &fakes.collaborators,
            keepalive.clone(),
            Url::parse("file:///home/user/").expect("url"),
            tx,
        );
        Harness {
            manager,
            events,
            keepalive,
            fakes,
        }
    }

    impl Harness {
        fn search(&mut self, terms: &[&str]) -> oneshot::Receiver<Vec<String>> {
            let (reply, rx) = oneshot::channel();
            self.manager.start_search(reply, ids(terms));
            rx
        }

        /// Feeds every queued engine event back into the manager.
        fn pump(&mut self) {
            while let Ok(event) = self.events.try_recv() {
                if let ProviderEvent::Session { generation, event } = event {
                    self.manager.handle_event(generation, event);
                }
            }
        }
    }

    #[test]
    fn single_character_query_skips_the_engine() {
        let mut harness = harness(EngineProbe::default());
        let mut rx = harness.search(&["a"]);

        assert_eq!(rx.try_recv().expect("reply"), Vec::<String>::new());
        assert_eq!(harness.fakes.probe.created(), 0);
        assert!(!harness.manager.is_active());
        assert_eq!(harness.keepalive.holds(), 0);
    }

    #[test]
    fn new_search_cancels_the_previous_caller_once() {
        let mut harness = harness(EngineProbe::default());
        let mut first = harness.search(&["notes"]);
        let stale = harness.fakes.probe.last_listener();

        let mut second = harness.search(&["report"]);
        assert_eq!(first.try_recv().expect("first reply"), Vec::<String>::new());
        assert_eq!(harness.fakes.probe.stops(), 1);
        assert_eq!(harness.keepalive.holds(), 1);

        // Late events from the first engine change nothing.
        stale.hits_added(vec![SearchHit::new("file:///home/user/notes.txt")]);
        stale.finished();
        harness.pump();
        assert!(second.try_recv().is_err());
        assert_eq!(harness.manager.current_generation(), Some(2));

        let current = harness.fakes.probe.last_listener();
        current.hits_added(vec![SearchHit::new("file:///home/user/report.pdf")]);
        current.finished();
        harness.pump();

        assert_eq!(
            second.try_recv().expect("second reply"),
            vec!["file:///home/user/report.pdf"]
        );
        assert!(!harness.manager.is_active());
        assert_eq!(harness.keepalive.holds(), 0);
    }

    #[test]
    fn quick_matches_are_reported_with_engine_hits() {
        let mut harness = harness(EngineProbe::default());
        let mut rx = harness.search(&["my", "doc"]);

        let listener = harness.fakes.probe.last_listener();
        listener.hits_added(vec![SearchHit::new("file:///home/user/Documents/my.doc")]);
        listener.finished();
        harness.pump();

        assert_eq!(
            rx.try_recv().expect("reply"),
            vec![
                "file:///home/user/Documents",
                "file:///home/user/Documents/my.doc",
            ]
        );
    }

    #[test]
    fn each_search_sees_the_current_bookmarks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bookmarks");
        std::fs::write(&path, "file:///home/user/Music Music\n").expect("write");

        let mut harness = harness(EngineProbe::default());
        let mut collaborators = harness.fakes.collaborators.clone();
        collaborators.bookmarks = Arc::new(GtkBookmarks::load(&path));
        let (tx, events) = mpsc::unbounded_channel();
        harness.events = events;
        harness.manager = SessionManager::new(
            &collaborators,
            harness.keepalive.clone(),
            Url::parse("file:///home/user/").expect("url"),
            tx,
        );

        let mut first = harness.search(&["proj"]);
        harness.fakes.probe.last_listener().finished();
        harness.pump();
        assert_eq!(first.try_recv().expect("first reply"), Vec::<String>::new());

        std::fs::write(
            &path,
            "file:///home/user/Music Music\nfile:///home/user/Projects Projects\n",
        )
        .expect("rewrite");
        let mut second = harness.search(&["proj"]);
        harness.fakes.probe.last_listener().finished();
        harness.pump();
        assert_eq!(
            second.try_recv().expect("second reply"),
            vec!["file:///home/user/Projects"]
        );
    }

    #[test]
    fn added_then_subtracted_hit_is_absent() {
        let mut harness = harness(EngineProbe::default());
        let mut rx = harness.search(&["notes"]);

        let listener = harness.fakes.probe.last_listener();
        listener.hits_added(vec![SearchHit::new("file:///home/user/notes.txt")]);
        listener.hits_subtracted(ids(&["file:///home/user/notes.txt"]));
        listener.finished();
        harness.pump();

        assert_eq!(rx.try_recv().expect("reply"), Vec::<String>::new());
    }

    #[test]
    fn engine_failure_replies_empty() {
        let mut harness = harness(EngineProbe::default());
        let mut rx = harness.search(&["notes"]);

        let listener = harness.fakes.probe.last_listener();
        listener.hits_added(vec![SearchHit::new("file:///home/user/notes.txt")]);
        listener.failed("index unavailable".to_string());
        harness.pump();

        assert_eq!(rx.try_recv().expect("reply"), Vec::<String>::new());
        assert!(!harness.manager.is_active());
    }

    #[test]
    fn engine_start_error_replies_empty() {
        let mut harness = harness(EngineProbe::failing());
        let mut rx = harness.search(&["notes"]);

        assert_eq!(rx.try_recv().expect("reply"), Vec::<String>::new());
        assert!(!harness.manager.is_active());
        assert_eq!(harness.keepalive.holds(), 0);
    }

    #[test]
    fn cancel_after_completion_is_a_no_op() {
        let mut harness = harness(EngineProbe::default());
        let mut rx = harness.search(&["notes"]);
        harness.fakes.probe.last_listener().finished();
        harness.pump();
        assert!(rx.try_recv().is_ok());

        harness.manager.cancel();
        harness.manager.cancel();
        assert!(!harness.manager.is_active());
        assert_eq!(harness.fakes.probe.stops(), 1);
    }

    #[test]
    fn subsearch_behaves_like_a_new_search() {
        let mut harness = harness(EngineProbe::default());
        let mut first = harness.search(&["notes"]);
        let (reply, mut second) = oneshot::channel();
        harness.manager.start_subsearch(
            reply,
            ids(&["file:///home/user/notes.txt"]),
            ids(&["notes", "2024"]),
        );

        assert_eq!(first.try_recv().expect("first"), Vec::<String>::new());
        assert_eq!(harness.fakes.probe.last_query().text(), "notes 2024");
        harness.fakes.probe.last_listener().finished();
        harness.pump();
        assert_eq!(second.try_recv().expect("second"), Vec::<String>::new());
    }
}

use std::sync::Arc;

use tokio::sync::mpsc;
use url::Url;

use crate::config::ProviderConfig;
use crate::keepalive::KeepAlive;
use crate::metas::{Lookup, MetasResolver};
use crate::platform::{Collaborators, Launcher};
use crate::runtime::protocol::{MetasReply, ProviderEvent};
use crate::session::SessionManager;

/// Serializes every state change of the provider through one mailbox.
pub(crate) struct ProviderActor {
    sessions: SessionManager,
    metas: MetasResolver,
    launcher: Arc<dyn Launcher>,
    keepalive: KeepAlive,
    event_tx: mpsc::UnboundedSender<ProviderEvent>,
    event_rx: mpsc::UnboundedReceiver<ProviderEvent>,
}

impl ProviderActor {
    pub(crate) fn new(
        config: &ProviderConfig,
        collaborators: Collaborators,
        keepalive: KeepAlive,
        location: Url,
        event_tx: mpsc::UnboundedSender<ProviderEvent>,
        event_rx: mpsc::UnboundedReceiver<ProviderEvent>,
    ) -> Self {
        let sessions = SessionManager::new(
            &collaborators,
            keepalive.clone(),
            location,
            event_tx.clone(),
        );
        let metas = MetasResolver::new(
            collaborators.bookmarks,
            collaborators.attributes,
            config.icon_size,
            config.unresolved,
        );
        Self {
            sessions,
            metas,
            launcher: collaborators.launcher,
            keepalive,
            event_tx,
            event_rx,
        }
    }

    pub(crate) async fn run(mut self) {
        while let Some(event) = self.event_rx.recv().await {
            match event {
                ProviderEvent::GetInitialResultSet { terms, reply } => {
                    self.sessions.start_search(reply, terms);
                }
                ProviderEvent::GetSubsearchResultSet {
                    previous_results,
                    terms,
                    reply,
                } => {
                    self.sessions.start_subsearch(reply, previous_results, terms);
                }
                ProviderEvent::GetResultMetas { results, reply } => {
                    self.handle_result_metas(results, reply);
                }
                ProviderEvent::ActivateResult { result } => self.handle_activate(result),
                ProviderEvent::Session { generation, event } => {
                    self.sessions.handle_event(generation, event);
                }
                ProviderEvent::AttributesReady {
                    results,
                    infos,
                    reply,
                } => {
                    let _ = reply.send(self.metas.complete(&results, infos));
                }
                ProviderEvent::Shutdown { reply } => {
                    self.sessions.cancel();
                    let _ = reply.send(());
                    break;
                }
            }
        }
        tracing::debug!(cached = self.metas.cache().len(), "provider actor stopped");
    }

    fn handle_result_metas(&mut self, results: Vec<String>, reply: MetasReply) {
        match self.metas.lookup(&results) {
            Lookup::Ready(result) => {
                let _ = reply.send(result);
            }
            Lookup::Fetch(missing) => {
                tracing::debug!(
                    requested = results.len(),
                    missing = missing.len(),
                    "fetching result attributes"
                );
                let fetch = self.metas.fetch(missing);
                let hold = self.keepalive.hold();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let infos = fetch.await;
                    let _ = event_tx.send(ProviderEvent::AttributesReady {
                        results,
                        infos,
                        reply,
                    });
                    drop(hold);
                });
            }
        }
    }

    fn handle_activate(&self, result: String) {
        let launcher = Arc::clone(&self.launcher);
        tokio::task::spawn_blocking(move || {
            if let Err(error) = launcher.open_uri(&result) {
                tracing::warn!(uri = %result, "failed to activate result: {error}");
            }
        });
    }
}

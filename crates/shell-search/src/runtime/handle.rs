use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::keepalive::KeepAlive;
use crate::metas::MetaRecord;
use crate::platform::Collaborators;
use crate::runtime::actor::ProviderActor;
use crate::runtime::protocol::ProviderEvent;

/// Cloneable entry point to a running provider.
#[derive(Clone)]
pub struct ProviderHandle {
    event_tx: mpsc::UnboundedSender<ProviderEvent>,
    keepalive: KeepAlive,
}

impl ProviderHandle {
    pub fn keepalive(&self) -> &KeepAlive {
        &self.keepalive
    }

    pub fn is_closed(&self) -> bool {
        self.event_tx.is_closed()
    }

    /// Ranked result URIs for `terms`. Cancels any search in progress.
    pub async fn get_initial_result_set(&self, terms: Vec<String>) -> ProviderResult<Vec<String>> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(ProviderEvent::GetInitialResultSet { terms, reply })?;
        reply_rx.await.map_err(|_| ProviderError::ServiceStopped)
    }

    pub async fn get_subsearch_result_set(
        &self,
        previous_results: Vec<String>,
        terms: Vec<String>,
    ) -> ProviderResult<Vec<String>> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(ProviderEvent::GetSubsearchResultSet {
            previous_results,
            terms,
            reply,
        })?;
        reply_rx.await.map_err(|_| ProviderError::ServiceStopped)
    }

    /// Display metadata for `results`, in request order.
    pub async fn get_result_metas(
        &self,
        results: Vec<String>,
    ) -> ProviderResult<Vec<Arc<MetaRecord>>> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(ProviderEvent::GetResultMetas { results, reply })?;
        reply_rx.await.map_err(|_| ProviderError::ServiceStopped)?
    }

    /// Opens `result` in the background. Launch failures are only logged.
    pub fn activate_result(&self, result: String) -> ProviderResult<()> {
        self.send(ProviderEvent::ActivateResult { result })
    }

    /// Cancels the current search and stops the actor.
    pub async fn shutdown(&self) -> ProviderResult<()> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(ProviderEvent::Shutdown { reply })?;
        reply_rx.await.map_err(|_| ProviderError::ServiceStopped)
    }

    fn send(&self, event: ProviderEvent) -> ProviderResult<()> {
        self.keepalive.touch();
        self.event_tx
            .send(event)
            .map_err(|_| ProviderError::ServiceStopped)
    }
}

pub fn spawn_provider(
    config: &ProviderConfig,
    collaborators: Collaborators,
) -> ProviderResult<ProviderHandle> {
    config.validate()?;
    let location = config.search_location()?;
    let keepalive = KeepAlive::new();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let actor = ProviderActor::new(
        config,
        collaborators,
        keepalive.clone(),
        location,
        event_tx.clone(),
        event_rx,
    );

    let persist = config.persist.then(|| keepalive.hold());
    if persist.is_some() {
        tracing::info!("persist mode, idle shutdown disabled");
    }

    tokio::spawn(async move {
        let _persist = persist;
        actor.run().await;
    });

    Ok(ProviderHandle {
        event_tx,
        keepalive,
    })
}

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::error::{ProviderError, ProviderResult};
use crate::runtime::ProviderHandle;

pub mod error;
pub mod search;

/// HTTP/JSON transport in front of a [`ProviderHandle`].
pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    pub async fn bind(addr: SocketAddr, provider: ProviderHandle) -> ProviderResult<Self> {
        let state = Arc::new(ServerState { provider });
        let app = Router::new()
            .route("/health", get(health))
            .route("/search/initial", post(search::initial_result_set))
            .route("/search/subsearch", post(search::subsearch_result_set))
            .route("/search/metas", post(search::result_metas))
            .route("/search/activate", post(search::activate_result))
            .with_state(state);
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(error) = result {
                tracing::warn!("search provider transport stopped: {error}");
            }
        });

        tracing::info!(%addr, "search provider listening");
        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> ProviderResult<()> {
        if let Some(sender) = self.shutdown.take() {
            sender.send(()).map_err(|_| {
                ProviderError::collaborator("transport", "failed to send server shutdown signal")
            })
        } else {
            Ok(())
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

async fn health() -> &'static str {
    "ok"
}

pub(crate) struct ServerState {
    pub(crate) provider: ProviderHandle,
}

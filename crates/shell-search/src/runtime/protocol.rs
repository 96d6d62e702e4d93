use std::sync::Arc;

use tokio::sync::oneshot;

use crate::error::ProviderResult;
use crate::metas::MetaRecord;
use crate::platform::FileInfo;
use crate::session::{ResultReply, SessionEvent};

pub type MetasReply = oneshot::Sender<ProviderResult<Vec<Arc<MetaRecord>>>>;

/// Mailbox messages of the provider actor.
pub enum ProviderEvent {
    GetInitialResultSet {
        terms: Vec<String>,
        reply: ResultReply,
    },
    GetSubsearchResultSet {
        previous_results: Vec<String>,
        terms: Vec<String>,
        reply: ResultReply,
    },
    GetResultMetas {
        results: Vec<String>,
        reply: MetasReply,
    },
    ActivateResult {
        result: String,
    },
    Session {
        generation: u64,
        event: SessionEvent,
    },
    AttributesReady {
        results: Vec<String>,
        infos: Vec<FileInfo>,
        reply: MetasReply,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

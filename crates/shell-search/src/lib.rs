//! Shell search provider.
//!
//! Brokers incremental file searches from a shell launcher to a search
//! engine, ranks the hits and serves cached display metadata for them.
//! All provider state lives in a single actor task; see [`runtime`].

pub mod config;
pub mod error;
pub mod keepalive;
pub mod matcher;
pub mod metas;
pub mod platform;
pub mod runtime;
pub mod server;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::config::{ProviderConfig, UnresolvedPolicy};
pub use crate::error::{ProviderError, ProviderResult};
pub use crate::keepalive::KeepAlive;
pub use crate::metas::{MetaIcon, MetaRecord, PixelImage};
pub use crate::runtime::{spawn_provider, ProviderHandle};
pub use crate::server::Server;

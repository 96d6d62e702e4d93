pub mod actor;
pub mod handle;
pub mod protocol;

pub use handle::{spawn_provider, ProviderHandle};

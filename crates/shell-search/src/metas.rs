//! Display metadata for result identifiers.

pub mod cache;
pub mod record;
pub mod resolver;

pub use cache::MetadataCache;
pub use record::{MetaIcon, MetaRecord, PixelImage};
pub use resolver::{Lookup, MetasResolver};

//! Documentation discovery, Touches resolution, and mtime-based freshness.

pub mod discovery;
pub mod freshness;
pub mod resolve;

pub use discovery::{discover_docs, DiscoveredDoc, Visibility};
pub use freshness::{compute_freshness, warm_staleness, FreshnessRecord, WarmStaleness};
pub use resolve::{resolve_docs_for_touches, ResolvedDoc};

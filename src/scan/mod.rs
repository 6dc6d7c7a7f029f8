//! Static codebase analysis: import specifier and markdown link scanning.

pub mod imports;
pub mod links;

pub use imports::{scan_imports, ImportDep, ImportEvidence, ImportScanReport, ScanConfig};
pub use links::{scan_links, Link, LinkKind, LinkScanReport, LinkScanScope};

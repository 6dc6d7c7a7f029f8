//! Wave scheduling and critical-path computation.

pub mod critical_path;
pub mod waves;

pub use critical_path::{critical_path, CriticalPath};
pub use waves::{compute_waves, Wave};

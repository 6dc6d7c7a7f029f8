//! Git co-change analysis and the derived structural/behavioral coupling
//! matrix.

pub mod coupling;
pub mod git_adapter;
pub mod parser;

pub use coupling::{
    build_coupling_matrix, component_profile, find_hidden_coupling, CouplingClass, CouplingEntry,
    CouplingMatrix, CouplingMatrixConfig,
};
pub use git_adapter::{Commit, FakeGitAdapter, GitAdapter, NumstatEntry};
pub use parser::{build_co_change_graph, CoChangeConfig, CoChangeEdge, CoChangeGraph};

//! Thin YAML-file convenience loaders for [`Manifest`] and [`Plan`].
//!
//! Everything else in this crate operates on already-parsed, in-memory
//! values so it can be exercised without touching a filesystem. This
//! module is the one place that reads a manifest or plan file off disk; it
//! is deliberately not part of the pure core.

use std::path::Path;

use thiserror::Error;

use crate::error::ManifestError;
use crate::manifest::Manifest;
use crate::plan::Plan;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML at {path}: {source}")]
    Yaml {
        path: std::path::PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Component list as it appears in a manifest YAML file, before the
/// version/root context `Manifest::new` needs is available.
#[derive(Debug, serde::Deserialize)]
struct RawManifest {
    version: String,
    components: Vec<crate::manifest::Component>,
}

/// Load and validate a manifest from a YAML file. `root` anchors every
/// component's relative path; it is usually the manifest file's own parent
/// directory, but callers are free to pass something else (tests commonly
/// point it at a fixture tree rooted elsewhere).
pub fn load_manifest(path: impl AsRef<Path>, root: impl Into<std::path::PathBuf>) -> Result<Manifest, LoadError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawManifest = serde_yaml::from_str(&contents).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    Manifest::new(raw.version, raw.components, root).map_err(LoadError::from)
}

/// Load a plan from a YAML file. Plans carry no path-relative state, so no
/// root argument is needed; validate the result against a manifest with
/// [`crate::plan::validate_plan`] before acting on it.
pub fn load_plan(path: impl AsRef<Path>) -> Result<Plan, LoadError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

//! Static import scanner: source -> component dependency inference
//! (spec §4.7).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::cancel::CancellationToken;
use crate::error::AnalysisError;
use crate::manifest::{Manifest, OwnershipIndex};

/// Configuration for the import scanner. The recognized extension set and
/// resolution priority are a configuration input per spec §4.7, not a
/// hardcoded language assumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extensions (without the leading dot) treated as scannable source.
    pub source_extensions: Vec<String>,
    /// Extensions probed, in order, when resolving an extensionless
    /// relative specifier.
    pub resolve_extensions: Vec<String>,
    /// `index` basenames probed, in order, when a specifier resolves to a
    /// directory.
    pub index_basenames: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            source_extensions: vec![
                "ts".into(),
                "tsx".into(),
                "js".into(),
                "jsx".into(),
                "mjs".into(),
                "cjs".into(),
            ],
            resolve_extensions: vec![
                "ts".into(),
                "tsx".into(),
                "js".into(),
                "jsx".into(),
                "mjs".into(),
                "cjs".into(),
            ],
            index_basenames: vec!["index".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEvidence {
    pub source_file: PathBuf,
    pub import_specifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDep {
    pub from_component: String,
    pub to_component: String,
    pub evidence: Vec<ImportEvidence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportScanReport {
    pub import_deps: Vec<ImportDep>,
    pub missing_deps: Vec<(String, String)>,
    pub extra_deps: Vec<(String, String)>,
    pub components_with_source: Vec<String>,
    pub total_files_scanned: usize,
    pub total_imports_scanned: usize,
}

fn import_re() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?:^|\s)import\s+(?:[^'"\n]*\sfrom\s+)?['"]([^'"\n]+)['"]|require\(\s*['"]([^'"\n]+)['"]\s*\)|^\s*export\s+(?:[^'"\n]*\sfrom\s+)?['"]([^'"\n]+)['"]"#,
        )
        .expect("import regex is a fixed pattern")
    })
}

/// Scan every component's source tree and infer cross-component import
/// dependencies.
pub fn scan_imports(
    manifest: &Manifest,
    ownership: &OwnershipIndex,
    config: &ScanConfig,
    cancel: &CancellationToken,
) -> Result<ImportScanReport, AnalysisError> {
    let mut deps: HashMap<(String, String), Vec<ImportEvidence>> = HashMap::new();
    let mut components_with_source: Vec<String> = Vec::new();
    let mut total_files_scanned = 0usize;
    let mut total_imports_scanned = 0usize;

    for component in &manifest.components {
        let mut had_source = false;
        for root in &component.normalized_paths {
            if !root.exists() {
                continue;
            }
            for entry in WalkDir::new(root) {
                if cancel.is_cancelled() {
                    return Err(AnalysisError::Cancelled);
                }
                let entry = match entry {
                    Ok(e) => e,
                    Err(err) => {
                        tracing::warn!(error = %err, "skipping unreadable entry during import scan");
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                if !has_recognized_extension(entry.path(), &config.source_extensions) {
                    continue;
                }

                had_source = true;
                total_files_scanned += 1;
                let Ok(contents) = std::fs::read_to_string(entry.path()) else {
                    continue;
                };

                for specifier in extract_specifiers(&contents) {
                    total_imports_scanned += 1;
                    trace!(specifier = %specifier, file = %entry.path().display(), "import specifier found");
                    if !is_relative(&specifier) {
                        continue;
                    }
                    let Some(target) = resolve_relative(entry.path(), &specifier, config) else {
                        continue;
                    };
                    let Some(target_owner) = ownership.owning_component(&target) else {
                        continue;
                    };
                    let Some(source_owner) = ownership.owning_component(entry.path()) else {
                        continue;
                    };
                    if source_owner == target_owner {
                        continue;
                    }
                    let key = (source_owner.to_string(), target_owner.to_string());
                    deps.entry(key).or_default().push(ImportEvidence {
                        source_file: entry.path().to_path_buf(),
                        import_specifier: specifier.clone(),
                    });
                }
            }
        }
        if had_source {
            components_with_source.push(component.name.clone());
        }
    }

    let mut import_deps: Vec<ImportDep> = deps
        .into_iter()
        .map(|((from, to), mut evidence)| {
            evidence.sort_by(|a, b| a.source_file.cmp(&b.source_file));
            ImportDep {
                from_component: from,
                to_component: to,
                evidence,
            }
        })
        .collect();
    import_deps.sort_by(|a, b| {
        (a.from_component.as_str(), a.to_component.as_str())
            .cmp(&(b.from_component.as_str(), b.to_component.as_str()))
    });

    let by_name = manifest.components_by_name();
    let mut missing_deps = Vec::new();
    let mut extra_deps = Vec::new();

    for dep in &import_deps {
        if let Some(c) = by_name.get(dep.from_component.as_str()) {
            if !c.deps.iter().any(|d| d == &dep.to_component) {
                missing_deps.push((dep.from_component.clone(), dep.to_component.clone()));
            }
        }
    }

    let inferred: std::collections::HashSet<(String, String)> = import_deps
        .iter()
        .map(|d| (d.from_component.clone(), d.to_component.clone()))
        .collect();
    for c in &manifest.components {
        for dep in &c.deps {
            let key = (c.name.clone(), dep.clone());
            if !inferred.contains(&key) {
                extra_deps.push(key);
            }
        }
    }

    missing_deps.sort();
    extra_deps.sort();
    components_with_source.sort();

    debug!(
        files = total_files_scanned,
        imports = total_imports_scanned,
        deps = import_deps.len(),
        "import scan complete"
    );

    Ok(ImportScanReport {
        import_deps,
        missing_deps,
        extra_deps,
        components_with_source,
        total_files_scanned,
        total_imports_scanned,
    })
}

fn has_recognized_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|want| want == e))
        .unwrap_or(false)
}

/// Extract import specifiers from `contents`, matching `import ... from
/// '<spec>'`, `require('<spec>')`, and `export ... from '<spec>'` on a
/// per-line basis. Specifiers spanning multiple lines are missed by
/// design (false negatives acceptable, false positives are not).
fn extract_specifiers(contents: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in contents.lines() {
        for caps in import_re().captures_iter(line) {
            if let Some(m) = caps.get(1).or(caps.get(2)).or(caps.get(3)) {
                out.push(m.as_str().to_string());
            }
        }
    }
    out
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Resolve a relative specifier against `source_file`'s directory, probing
/// extensions and index suffixes in the configured priority order. Returns
/// the first absolute path that exists on disk.
fn resolve_relative(source_file: &Path, specifier: &str, config: &ScanConfig) -> Option<PathBuf> {
    let base_dir = source_file.parent()?;
    let joined = base_dir.join(specifier);

    if joined.is_file() {
        return Some(normalize(&joined));
    }

    for ext in &config.resolve_extensions {
        let candidate = with_extension(&joined, ext);
        if candidate.is_file() {
            return Some(normalize(&candidate));
        }
    }

    if joined.is_dir() {
        for basename in &config.index_basenames {
            for ext in &config.resolve_extensions {
                let candidate = joined.join(format!("{basename}.{ext}"));
                if candidate.is_file() {
                    return Some(normalize(&candidate));
                }
            }
        }
    }

    None
}

fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

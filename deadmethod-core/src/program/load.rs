//! Loading typed programs from snapshot files.
//!
//! A snapshot is a JSON document `{ "packages": [...] }` written by an
//! external exporter after type checking. Any file under the analysis root
//! ending in `.typed.json` is a snapshot. The loader refuses to hand over a
//! program that is not fully typed: a package that carries type-checker
//! errors fails the whole load.

use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{Package, Program, ProgramSource};
use crate::error::{DeadmethodError, DeadmethodResult};
use crate::scan::gather_snapshot_files_with_excludes;

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    packages: Vec<Package>,
}

/// Loads every snapshot found under an analysis root.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    root: PathBuf,
    excludes: Vec<String>,
}

impl SnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excludes: Vec::new(),
        }
    }

    /// Extra directory names to prune during discovery.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excludes.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProgramSource for SnapshotSource {
    fn load(&self) -> DeadmethodResult<Program> {
        let excludes: Vec<&str> = self.excludes.iter().map(String::as_str).collect();
        let files = gather_snapshot_files_with_excludes(&self.root, &excludes)
            .map_err(|e| DeadmethodError::program_load(&self.root, format!("{:#}", e)))?;

        debug!(root = %self.root.display(), snapshots = files.len(), "discovered snapshots");

        // Sorted input and an order-preserving collect keep the program stable.
        let parsed = files
            .par_iter()
            .map(|path| parse_snapshot(path).map(|pkgs| (path.clone(), pkgs)))
            .collect::<DeadmethodResult<Vec<_>>>()?;

        assemble(&self.root, parsed)
    }
}

/// Parse one snapshot file into its packages.
pub fn parse_snapshot(path: &Path) -> DeadmethodResult<Vec<Package>> {
    let content = fs::read_to_string(path)
        .map_err(|e| DeadmethodError::program_load(path, format!("cannot read snapshot: {}", e)))?;
    parse_snapshot_str(path, &content)
}

/// Parse snapshot content; `path` is only used for error context.
///
/// Syntax trees nest as deep as the source does, so there is no recursion
/// limit; the stack grows on demand instead.
pub fn parse_snapshot_str(path: &Path, content: &str) -> DeadmethodResult<Vec<Package>> {
    let malformed =
        |e: serde_json::Error| DeadmethodError::program_load(path, format!("malformed snapshot: {}", e));

    let mut json = serde_json::Deserializer::from_str(content);
    json.disable_recursion_limit();
    let snapshot = Snapshot::deserialize(serde_stacker::Deserializer::new(&mut json)).map_err(malformed)?;
    json.end().map_err(malformed)?;
    Ok(snapshot.packages)
}

/// Validate parsed packages and build the program.
fn assemble(root: &Path, parsed: Vec<(PathBuf, Vec<Package>)>) -> DeadmethodResult<Program> {
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut packages = Vec::new();

    for (file, pkgs) in parsed {
        for mut pkg in pkgs {
            if pkg.path.is_empty() {
                return Err(DeadmethodError::program_load(
                    &file,
                    "package without an import path",
                ));
            }

            if let Some(first) = pkg.errors.first() {
                return Err(DeadmethodError::program_load(
                    &file,
                    format!(
                        "package {} has {} type error(s), first: {}",
                        pkg.path,
                        pkg.errors.len(),
                        first
                    ),
                ));
            }

            if let Some(previous) = seen.get(&pkg.path) {
                return Err(DeadmethodError::program_load(
                    &file,
                    format!(
                        "package {} is also defined in {}",
                        pkg.path,
                        previous.display()
                    ),
                ));
            }
            seen.insert(pkg.path.clone(), file.clone());

            for id in pkg.index_selections() {
                warn!(package = %pkg.path, expr = id.0, "duplicate selection entry ignored");
            }

            debug!(
                package = %pkg.path,
                files = pkg.files.len(),
                selections = pkg.selections.len(),
                "loaded package"
            );
            packages.push(pkg);
        }
    }

    if packages.is_empty() {
        return Err(DeadmethodError::program_load(
            root,
            "no typed packages found (expected *.typed.json snapshots)",
        ));
    }

    Ok(Program::new(packages))
}

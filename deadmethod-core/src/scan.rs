//! Parallel, deterministic discovery of typed-program snapshot files.
//!
//! - Early directory pruning via `WalkDir::filter_entry` (whole subtrees skipped)
//! - Parallel filtering via Rayon's `par_bridge`
//! - Sorted output, so loading order never depends on the filesystem

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name suffix of a typed-program snapshot.
pub const SNAPSHOT_SUFFIX: &str = ".typed.json";

/// Directories to exclude by default.
const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "vendor", "testdata"];

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

#[inline]
fn is_snapshot(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(SNAPSHOT_SUFFIX))
}

/// Gathers all snapshot files under `root`.
///
/// A `root` that is itself a file is returned as the only snapshot, whatever
/// its name. Excludes `.git/`, `node_modules/`, `vendor/` and `testdata/`.
pub fn gather_snapshot_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_snapshot_files_with_excludes(root, &[])
}

/// Gathers snapshot files with extra directory names to prune.
pub fn gather_snapshot_files_with_excludes(root: &Path, excludes: &[&str]) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().copied())
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if e.file_type().is_file() && is_snapshot(path) {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather snapshots from {}", root.display()))?;

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("deadmethod_scan_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[test]
    fn test_gathers_only_snapshots_sorted() {
        let dir = temp_dir("sorted");
        touch(&dir.join("b/db.typed.json"));
        touch(&dir.join("a/api.typed.json"));
        touch(&dir.join("a/notes.json"));
        touch(&dir.join("main.go"));

        let files = gather_snapshot_files(&dir).unwrap();
        assert_eq!(
            files,
            vec![dir.join("a/api.typed.json"), dir.join("b/db.typed.json")]
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_prunes_default_and_custom_excludes() {
        let dir = temp_dir("prune");
        touch(&dir.join("vendor/dep.typed.json"));
        touch(&dir.join(".git/x.typed.json"));
        touch(&dir.join("generated/gen.typed.json"));
        touch(&dir.join("app/app.typed.json"));

        let files = gather_snapshot_files_with_excludes(&dir, &["generated"]).unwrap();
        assert_eq!(files, vec![dir.join("app/app.typed.json")]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_root_is_the_only_snapshot() {
        let dir = temp_dir("file_root");
        let file = dir.join("program.json");
        touch(&file);

        let files = gather_snapshot_files(&file).unwrap();
        assert_eq!(files, vec![file]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = temp_dir("missing").join("does_not_exist");
        assert!(gather_snapshot_files(&dir).is_err());
    }
}

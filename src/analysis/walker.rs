//! Source tree traversal.
//!
//! Collects candidate files for an analyzer and records the project layout
//! (top-level directories and per-language file counts) used by the
//! structure analyzer and primary-language detection.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use walkdir::{DirEntry, WalkDir};

use super::facts::Tally;
use super::languages::language_for_extension;

/// Tool, dependency and build directories that never contain project sources.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "build",
    "dist",
    "out",
    "coverage",
    "__pycache__",
    "venv",
    "env",
    "site-packages",
    "bower_components",
    "jspm_packages",
    ".git",
    ".hg",
    ".svn",
    ".tox",
    ".venv",
    ".mypy_cache",
    ".pytest_cache",
    ".next",
    ".nuxt",
    ".cache",
];

/// Filters applied while walking the tree.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory names skipped at any depth.
    pub excluded_dirs: Vec<String>,
    /// Glob patterns matched against root-relative paths.
    pub excluded_globs: Option<GlobSet>,
    /// Cap on files per language (applied after sorting).
    pub max_files: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            excluded_globs: None,
            max_files: None,
        }
    }
}

impl ScanOptions {
    /// Build options with the given deny-list and glob exclusions.
    pub fn new(
        excluded_dirs: &[String],
        excluded_paths: &[String],
        max_files: Option<usize>,
    ) -> anyhow::Result<Self> {
        let excluded_globs = if excluded_paths.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in excluded_paths {
                let glob = Glob::new(pattern).map_err(|e| {
                    anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e)
                })?;
                builder.add(glob);
            }
            Some(builder.build()?)
        };

        Ok(Self {
            excluded_dirs: excluded_dirs.to_vec(),
            excluded_globs,
            max_files,
        })
    }

    fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }

    fn is_excluded_path(&self, rel_path: &Path) -> bool {
        self.excluded_globs
            .as_ref()
            .map(|set| set.is_match(rel_path))
            .unwrap_or(false)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Walk `root`, yielding every non-excluded regular file as (absolute, relative) paths.
fn walk_files<'a>(
    root: &'a Path,
    options: &'a ScanOptions,
) -> impl Iterator<Item = (PathBuf, PathBuf)> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            if e.depth() == 0 {
                return true;
            }
            if is_hidden(e) {
                return false;
            }
            if e.file_type().is_dir() {
                let name = e.file_name().to_string_lossy();
                return !options.is_excluded_dir(&name);
            }
            true
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(move |entry| {
            let path = entry.path().to_path_buf();
            let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            if options.is_excluded_path(&rel) {
                return None;
            }
            Some((path, rel))
        })
}

/// Collect files whose extension is in `extensions`, sorted by path.
pub fn collect_files(
    root: &Path,
    extensions: &[&str],
    options: &ScanOptions,
) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walk_files(root, options)
        .filter(|(path, _)| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|ext| extensions.contains(&ext))
                .unwrap_or(false)
        })
        .map(|(path, _)| path)
        .collect();

    files.sort();
    if let Some(max) = options.max_files {
        files.truncate(max);
    }
    files
}

/// Directory listing summary of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Names of directories directly under the root.
    pub top_level_dirs: BTreeSet<String>,
    /// Source file counts per registered language id.
    pub source_files: Tally,
    /// Every non-excluded file, source or not.
    pub file_count: usize,
}

impl ProjectLayout {
    /// Scan the tree once, counting files per language.
    pub fn scan(root: &Path, options: &ScanOptions) -> Self {
        let mut layout = ProjectLayout::default();

        if let Ok(entries) = std::fs::read_dir(root) {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if is_dir && !name.starts_with('.') && !options.is_excluded_dir(&name) {
                    layout.top_level_dirs.insert(name);
                }
            }
        }

        for (path, _) in walk_files(root, options) {
            layout.file_count += 1;
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if let Some(language) = language_for_extension(ext) {
                layout.source_files.add(language);
            }
        }

        layout
    }

    /// Whether any of `names` is a top-level directory.
    pub fn has_any_dir(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.top_level_dirs.contains(*n))
    }
}

/// Directory names that hold tests.
pub const TEST_DIRS: &[&str] = &["tests", "test", "__tests__", "spec", "specs"];

/// Heuristic test-file detection on a root-relative path.
pub fn is_test_path(rel_path: &Path) -> bool {
    let in_test_dir = rel_path
        .parent()
        .map(|parent| {
            parent.components().any(|c| {
                let name = c.as_os_str().to_string_lossy();
                TEST_DIRS.contains(&name.as_ref())
            })
        })
        .unwrap_or(false);
    if in_test_dir {
        return true;
    }

    let name = rel_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let stem = name.split('.').next().unwrap_or("");

    stem.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with("_tests")
        || name.contains(".test.")
        || name.contains(".spec.")
        || name == "conftest.py"
}

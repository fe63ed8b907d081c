use crate::config::Config;
use crate::matcher::Pattern;
use crate::progress::{CancelFlag, SearchObserver};
use crate::util;
use ignore::WalkBuilder;
use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FileScanOptions {
    /// Extension filter including the dot (e.g. ".scene"); empty matches
    /// every file.
    pub extension: String,
    /// Walk files that ignore files would exclude.
    pub no_ignore: bool,
}

impl Default for FileScanOptions {
    fn default() -> Self {
        Self {
            extension: String::new(),
            no_ignore: Config::get().no_ignore,
        }
    }
}

#[derive(Debug, Default)]
pub struct FileScanOutcome {
    /// Repository-relative paths of matching files, in scan order.
    pub matches: Vec<String>,
    pub scanned: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

/// Scan every matching file under `root` for the pattern.
///
/// Files are visited depth-first with the files at each directory level
/// processed before any subdirectory content. Unreadable and oversized
/// files are skipped with a logged warning, never a failure.
pub fn scan_files(
    root: &Path,
    options: &FileScanOptions,
    pattern: &Pattern,
    observer: &mut dyn SearchObserver,
    cancel: &CancelFlag,
) -> FileScanOutcome {
    let files = enumerate_files(root, options);
    let total = files.len();
    let mut outcome = FileScanOutcome::default();
    let max_bytes = Config::get().max_file_bytes;

    for (idx, rel_path) in files.into_iter().enumerate() {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            return outcome;
        }
        observer.on_progress(&rel_path, idx as f32 / total.max(1) as f32);

        let abs = root.join(&rel_path);
        match fs::metadata(&abs) {
            Ok(meta) if meta.len() > max_bytes => {
                eprintln!(
                    "refscan: skipping {} ({} bytes exceeds limit of {})",
                    rel_path,
                    meta.len(),
                    max_bytes
                );
                outcome.skipped += 1;
                continue;
            }
            Ok(_) => {}
            Err(err) => {
                eprintln!("refscan: skipping unreadable file {rel_path}: {err}");
                outcome.skipped += 1;
                continue;
            }
        }
        let content = match fs::read_to_string(&abs) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("refscan: skipping unreadable file {rel_path}: {err}");
                outcome.skipped += 1;
                continue;
            }
        };
        outcome.scanned += 1;
        if pattern.matches(&content) {
            outcome.matches.push(rel_path);
        }
    }
    outcome
}

/// Enumerate candidate files under `root`, repository-relative, ordered so
/// that the files directly in a directory precede everything under its
/// subdirectories.
pub fn enumerate_files(root: &Path, options: &FileScanOptions) -> Vec<String> {
    let mut builder = WalkBuilder::new(root);
    if options.no_ignore {
        builder
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);
    } else {
        builder
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false);
    }
    let walker = builder
        .hidden(false)
        .filter_entry(|entry| entry.file_name() != OsStr::new(".git"))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                eprintln!("refscan: walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if !extension_matches(path, &options.extension) {
            continue;
        }
        match util::normalize_rel_path(root, path) {
            Ok(rel) => files.push(rel),
            Err(_) => continue,
        }
    }
    files.sort_by(|a, b| scan_order(a, b));
    files
}

fn extension_matches(path: &Path, extension: &str) -> bool {
    if extension.is_empty() {
        return true;
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(extension))
        .unwrap_or(false)
}

/// Ordering over repository-relative paths: within a directory, plain files
/// come before anything nested in subdirectories; names compare bytewise.
fn scan_order(a: &str, b: &str) -> Ordering {
    let mut ac = a.split('/').peekable();
    let mut bc = b.split('/').peekable();
    loop {
        match (ac.next(), bc.next()) {
            (Some(x), Some(y)) => {
                let a_leaf = ac.peek().is_none();
                let b_leaf = bc.peek().is_none();
                if a_leaf != b_leaf {
                    return if a_leaf { Ordering::Less } else { Ordering::Greater };
                }
                match x.cmp(y) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
        }
    }
}

//! Filesystem abstraction for the refactoring engine
//!
//! The engine treats the filesystem as the authoritative mutable store, so
//! every read, write, rename and directory walk goes through the narrow `Vfs`
//! trait. `OsFs` is the production adapter; `MemFs` backs fast deterministic
//! tests; `OverlayFs` holds all mutations in memory, which is how dry-run
//! produces an identical report without ever touching the write primitive.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use walkdir::WalkDir;

/// Directories that are never descended into during a scan.
pub const IGNORED_DIRS: &[&str] = &[
    ".angular",
    ".git",
    "build",
    "coverage",
    "dist",
    "node_modules",
    "out-tsc",
    "target",
];

/// Narrow filesystem interface the entire engine runs against.
pub trait Vfs {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    /// Recursively collect all files under `root` in deterministic order,
    /// skipping [`IGNORED_DIRS`] entirely.
    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>>;
}

fn is_ignored_dir_name(name: &str) -> bool {
    IGNORED_DIRS.contains(&name)
}

fn has_ignored_component_below(root: &Path, path: &Path) -> bool {
    let tail = path.strip_prefix(root).unwrap_or(path);
    tail.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(is_ignored_dir_name)
            .unwrap_or(false)
    })
}

/// Thin adapter over the real filesystem.
#[derive(Debug, Default)]
pub struct OsFs;

impl Vfs for OsFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a directory: {}", root.display()),
            ));
        }
        let mut files = Vec::new();
        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry
                    .file_name()
                    .to_str()
                    .map(is_ignored_dir_name)
                    .unwrap_or(false))
        });
        for entry in walker {
            let entry = entry.map_err(|e| {
                io::Error::new(io::ErrorKind::Other, format!("walk failed: {}", e))
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Deterministic in-memory filesystem for tests.
#[derive(Debug, Default)]
pub struct MemFs {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, creating implied parent directories.
    pub fn seed(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files
            .lock()
            .expect("MemFs lock poisoned")
            .insert(path.into(), contents.into());
    }

    /// Snapshot of every stored path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files
            .lock()
            .expect("MemFs lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl Vfs for MemFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .expect("MemFs lock poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            })
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.files
            .lock()
            .expect("MemFs lock poisoned")
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut files = self.files.lock().expect("MemFs lock poisoned");
        let contents = files.remove(from).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", from.display()),
            )
        })?;
        files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().expect("MemFs lock poisoned");
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path))
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let files = self.files.lock().expect("MemFs lock poisoned");
        let matched: Vec<PathBuf> = files
            .keys()
            .filter(|k| k.starts_with(root))
            .filter(|k| !has_ignored_component_below(root, k))
            .cloned()
            .collect();
        if matched.is_empty() && !files.keys().any(|k| k.starts_with(root)) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not a directory: {}", root.display()),
            ));
        }
        Ok(matched)
    }
}

/// Copy-on-write layer over another `Vfs`.
///
/// All mutations land in the overlay map; the underlying store is never
/// written. An entry of `None` marks a path renamed or deleted away.
pub struct OverlayFs<'a> {
    base: &'a dyn Vfs,
    overlay: Mutex<BTreeMap<PathBuf, Option<String>>>,
}

impl<'a> OverlayFs<'a> {
    pub fn new(base: &'a dyn Vfs) -> Self {
        Self {
            base,
            overlay: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Vfs for OverlayFs<'_> {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let overlay = self.overlay.lock().expect("OverlayFs lock poisoned");
        match overlay.get(path) {
            Some(Some(contents)) => Ok(contents.clone()),
            Some(None) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )),
            None => self.base.read_to_string(path),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.overlay
            .lock()
            .expect("OverlayFs lock poisoned")
            .insert(path.to_path_buf(), Some(contents.to_string()));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let contents = self.read_to_string(from)?;
        let mut overlay = self.overlay.lock().expect("OverlayFs lock poisoned");
        overlay.insert(from.to_path_buf(), None);
        overlay.insert(to.to_path_buf(), Some(contents));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let overlay = self.overlay.lock().expect("OverlayFs lock poisoned");
        match overlay.get(path) {
            Some(Some(_)) => true,
            Some(None) => false,
            None => {
                self.base.exists(path)
                    || overlay
                        .iter()
                        .any(|(k, v)| v.is_some() && k.starts_with(path))
            }
        }
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let overlay = self.overlay.lock().expect("OverlayFs lock poisoned");
        let has_overlay_files = overlay
            .iter()
            .any(|(k, v)| v.is_some() && k.starts_with(root));
        let mut files = match self.base.walk_files(root) {
            Ok(files) => files,
            Err(e) if has_overlay_files => {
                tracing::debug!(root = %root.display(), error = %e, "base walk failed, using overlay only");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        files.retain(|f| !matches!(overlay.get(f.as_path()), Some(None)));
        for (path, contents) in overlay.iter() {
            if contents.is_some()
                && path.starts_with(root)
                && !has_ignored_component_below(root, path)
                && !files.contains(path)
            {
                files.push(path.clone());
            }
        }
        files.sort();
        Ok(files)
    }
}

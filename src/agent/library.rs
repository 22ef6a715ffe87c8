// MOODTUNE Local Music Library
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE

use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// A directory tree of audio files filtered by extension.
pub struct LocalLibrary {
    root: PathBuf,
    extensions: Vec<String>,
}

impl LocalLibrary {
    /// Creates `root` if it does not exist yet.
    pub fn open(root: &Path, extensions: &[String]) -> std::io::Result<Self> {
        if !root.exists() {
            fs::create_dir_all(root)?;
            info!("[LIBRARY] Created music directory {:?}", root);
        }
        Ok(Self {
            root: root.to_path_buf(),
            extensions: extensions.iter().map(|e| normalize_extension(e)).collect(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().to_lowercase(),
            None => return false,
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// All supported files under the root, sorted.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!("[LIBRARY] Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();
        files.sort();
        files
    }

    /// One file picked uniformly at random, or `None` for an empty library.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<PathBuf> {
        self.scan().choose(rng).cloned()
    }
}

/// `"MP3"` → `".mp3"`.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

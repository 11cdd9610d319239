//! Temporary working directories for file-based tests.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use partials_model::collection::{read_json, write_json};
use partials_model::{Partial, PartialList};

/// A scratch directory removed when dropped.
pub struct WorkDir {
    root: TempDir,
}

impl WorkDir {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Path of `name` inside the directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Writes mono samples as a WAV file and returns its path.
    pub fn write_wav(&self, name: &str, samples: &[f64], sample_rate: u32) -> PathBuf {
        let path = self.file(name);
        partials_cli::wav::write_mono(&path, samples, sample_rate).expect("Failed to write WAV");
        path
    }

    /// Writes a Partial collection as JSON and returns its path.
    pub fn write_partials(&self, name: &str, partials: &[Partial]) -> PathBuf {
        let path = self.file(name);
        write_json(&path, partials).expect("Failed to write Partials");
        path
    }

    pub fn read_partials(&self, name: &str) -> PartialList {
        read_json(self.file(name)).expect("Failed to read Partials")
    }
}

impl Default for WorkDir {
    fn default() -> Self {
        Self::new()
    }
}

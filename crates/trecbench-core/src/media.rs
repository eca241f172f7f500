//! On-disk home for uploaded judgement and results files.
//!
//! Judgements land under `judgements/`, results under `results/run-<id>/`
//! so a discarded submission can be removed wholesale without touching
//! anything else.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_layout(&self) -> io::Result<()> {
        fs::create_dir_all(self.root.join("judgements"))?;
        fs::create_dir_all(self.root.join("results"))?;
        Ok(())
    }

    /// Copy a qrels file into the store. The stored name keeps the original
    /// file name behind a random prefix so repeated uploads never collide.
    pub fn store_judgement(&self, src: &Path) -> io::Result<PathBuf> {
        self.ensure_layout()?;
        let name = file_name(src)?;
        let dest = self
            .root
            .join("judgements")
            .join(format!("{}-{}", short_id(), name));
        fs::copy(src, &dest)?;
        Ok(dest)
    }

    /// Copy a submitted results file into the run's own directory.
    pub fn store_results(&self, run_id: i64, src: &Path) -> io::Result<PathBuf> {
        let dir = self.results_dir(run_id);
        fs::create_dir_all(&dir)?;
        let dest = dir.join(file_name(src)?);
        fs::copy(src, &dest)?;
        Ok(dest)
    }

    /// Remove a discarded submission's directory. Missing is fine.
    pub fn remove_results(&self, run_id: i64) -> io::Result<()> {
        match fs::remove_dir_all(self.results_dir(run_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn results_dir(&self, run_id: i64) -> PathBuf {
        self.root.join("results").join(format!("run-{run_id}"))
    }
}

fn file_name(src: &Path) -> io::Result<String> {
    src.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"))
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

//! Shared file I/O utilities.

use std::{
    fs::{create_dir_all, read, read_to_string, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use log::error;
use rayon::prelude::*;

/// A generated output file.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        read(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))
    }

    /// Write data, creating the parent directory first.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_parent_dir()?;
        write(&self.path, data).with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

impl AsRef<Path> for OutputFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

pub fn read_text(path: &Path) -> Result<String> {
    read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    OutputFile::new(path).write(text)
}

/// Run `op` over `items` on the rayon pool, pairing each result with its path.
pub fn collect_parallel_with_paths<T, P, R, F>(items: &[T], path: P, op: F) -> Vec<(PathBuf, Result<R>)>
where
    T: Sync,
    R: Send,
    P: Fn(&T) -> PathBuf + Sync + Send,
    F: Fn(&T) -> Result<R> + Sync + Send,
{
    items.par_iter().map(|item| (path(item), op(item))).collect()
}

/// Check batch operation results with paths, log failures with file names, and bail if any failed.
pub fn check_results_with_paths<T, P: AsRef<Path>>(
    results: &[(P, Result<T>)],
    operation: &str,
) -> Result<()> {
    let errors: Vec<_> = results
        .iter()
        .filter_map(|(path, r)| r.as_ref().err().map(|e| (path.as_ref(), e)))
        .collect();

    if !errors.is_empty() {
        for (path, err) in &errors {
            error!("{}: {err:#}", path.display());
        }
        bail!("{operation} failed for {} files", errors.len());
    }
    Ok(())
}

/// Unwrap the values of a batch that passed [`check_results_with_paths`].
pub fn into_values<T, P>(results: Vec<(P, Result<T>)>) -> Result<Vec<T>> {
    results.into_iter().map(|(_, r)| r).collect()
}

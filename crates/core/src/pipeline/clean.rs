use std::{fs::remove_dir_all, path::Path};

use anyhow::{Context, Result};

/// Remove the output directory. Returns whether anything was removed.
pub fn clean(output_dir: &Path) -> Result<bool> {
    if output_dir.exists() {
        remove_dir_all(output_dir)
            .with_context(|| format!("Failed to remove {}", output_dir.display()))?;
        println!("Removed {}", output_dir.display());
        Ok(true)
    } else {
        println!("Skipped {} (not found)", output_dir.display());
        Ok(false)
    }
}

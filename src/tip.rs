use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Overwrite the tip file with `content`. The parent directory must exist.
pub fn write_tip(path: &Path, content: &str) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to open tip file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write tip file: {}", path.display()))?;
    Ok(())
}

/// Clear a stale tip so the statusline shows nothing.
pub fn clear_tip(path: &Path) -> Result<()> {
    write_tip(path, "")
}

use std::path::Path;

/// Write a string to a file atomically: write to a sibling temp file, then
/// rename into place. A crash mid-write leaves the old content intact.
pub fn atomic_write_str(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

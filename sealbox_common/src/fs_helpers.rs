use std::path::{Path, PathBuf};

/// Sibling path with ".tmp" appended to the full file name.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Writes to the tmp path first and renames over the target, so readers
/// never observe a partially written file.
pub fn write_atomically(path: &Path, data: &[u8]) -> Result<(), std::io::Error> {
    let path_tmp = tmp_path(path);
    std::fs::write(&path_tmp, data)?;
    std::fs::rename(&path_tmp, path)?;
    Ok(())
}

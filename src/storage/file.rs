use std::fs::{self, File, OpenOptions};
use std::path::Path;

use crate::general::error::Result;

/// Opens a scene for one scan; the handle is dropped when the scan ends.
pub fn open_for_scan(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().read(true).open(path)?)
}

/// Creates or truncates the destination of a save.
pub fn create_for_write(path: &Path) -> Result<File> {
    Ok(OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?)
}

/// Whether two paths name the same existing file, hard links included.
pub fn same_file(a: &Path, b: &Path) -> bool {
    let (Ok(a_meta), Ok(b_meta)) = (fs::metadata(a), fs::metadata(b)) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        a_meta.dev() == b_meta.dev() && a_meta.ino() == b_meta.ino()
    }

    #[cfg(not(unix))]
    {
        let _ = (a_meta, b_meta);
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

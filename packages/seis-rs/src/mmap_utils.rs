use crate::error::{Result, SeisError};
use memmap2::Mmap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Open a file and map it into memory (read-only)
pub fn mmap_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SeisError::FileNotFound(path.display().to_string()),
        _ => SeisError::IoError(e),
    })?;
    let mmap = unsafe { Mmap::map(&file).map_err(SeisError::IoError)? };
    Ok(mmap)
}

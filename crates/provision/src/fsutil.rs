//! Small filesystem helpers shared by the provisioning steps.

use std::io;
use std::path::Path;

/// Copies every regular file of `src` (non-recursive) into `dest`.
///
/// Returns the number of files copied.
pub fn copy_regular_files(src: &Path, dest: &Path) -> io::Result<usize> {
    let mut copied = 0;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            std::fs::copy(entry.path(), dest.join(entry.file_name()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Recursively copies a directory tree.
pub fn copy_dir_all(src: &Path, dest: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Copies `src` over `dest`, removing any pre-existing destination.
pub fn replace_dir(src: &Path, dest: &Path) -> io::Result<()> {
    if dest.exists() {
        std::fs::remove_dir_all(dest)?;
    }
    copy_dir_all(src, dest)
}

/// Moves a file, falling back to copy-and-delete across filesystems.
pub fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    if std::fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    std::fs::copy(src, dest)?;
    std::fs::remove_file(src)
}

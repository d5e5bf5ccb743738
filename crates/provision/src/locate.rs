//! Locating directories inside the extracted emulator release.
//!
//! The archive layout varies between releases, so both the build root
//! and the tools directory are found by walking the extracted tree.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Finds the first directory named `name` under `root`.
pub fn find_dir_named(root: &Path, name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_dir() && entry.file_name() == name)
        .map(|entry| entry.into_path())
}

/// Finds the `tools/generate_interfaces` directory holding the
/// generator executables.
pub fn find_tools_dir(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir() && entry.file_name() == "tools")
        .map(|entry| entry.into_path().join("generate_interfaces"))
        .find(|candidate| candidate.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_build_root() {
        let tmp = tempfile::tempdir().unwrap();
        let experimental = tmp.path().join("release").join("experimental");
        std::fs::create_dir_all(experimental.join("x64")).unwrap();

        let found = find_dir_named(tmp.path(), "experimental").unwrap();
        assert_eq!(found, experimental);
    }

    #[test]
    fn missing_dir_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(find_dir_named(tmp.path(), "experimental").is_none());
    }

    #[test]
    fn tools_dir_requires_generate_interfaces() {
        let tmp = tempfile::tempdir().unwrap();
        // A tools dir without the generator subdirectory is not enough.
        std::fs::create_dir_all(tmp.path().join("a").join("tools")).unwrap();
        assert!(find_tools_dir(tmp.path()).is_none());

        let wanted = tmp
            .path()
            .join("b")
            .join("tools")
            .join("generate_interfaces");
        std::fs::create_dir_all(&wanted).unwrap();
        assert_eq!(find_tools_dir(tmp.path()).unwrap(), wanted);
    }
}

//! Locating the defaults file.
//!
//! Search order: the working directory, the directory of the executable,
//! then the system directories below.

use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULTS_FILE_NAME: &str = "mendel-defaults.toml";

pub const SYSTEM_DIRS: [&str; 3] = ["/usr/local/share/mendel", "/usr/share/mendel", "/etc/mendel"];

/// The first defaults file found along the search path.
pub fn find_defaults_file() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }
    dirs.extend(SYSTEM_DIRS.iter().map(PathBuf::from));
    search(&dirs)
}

/// The first `dirs` entry holding a defaults file.
pub fn search(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(DEFAULTS_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_search_order() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(second.path().join(DEFAULTS_FILE_NAME), "").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(search(&dirs), Some(second.path().join(DEFAULTS_FILE_NAME)));

        fs::write(first.path().join(DEFAULTS_FILE_NAME), "").unwrap();
        assert_eq!(search(&dirs), Some(first.path().join(DEFAULTS_FILE_NAME)));
    }

    #[test]
    fn test_search_nothing() {
        let empty = tempdir().unwrap();
        assert_eq!(search(&[empty.path().to_path_buf()]), None);
    }
}

//! Non-strict path canonicalization.
//!
//! `std::fs::canonicalize` fails on paths that don't exist yet. Path aliases
//! routinely point at files that will be created later (log files, output
//! directories), so components are resolved one by one and missing ones are
//! kept lexically.

use std::path::{Component, Path, PathBuf};

/// Join `relative` onto `root` and normalize the result.
///
/// An absolute `relative` replaces `root`, as [`Path::join`] does.
pub fn resolve_against(root: &Path, relative: &Path) -> PathBuf {
    normalize(&root.join(relative))
}

/// Resolve `path` one component at a time: each name is canonicalized if it
/// exists (following symlinks) and appended as-is otherwise; `.` is dropped
/// and `..` pops the resolved base.
pub fn normalize(path: &Path) -> PathBuf {
    let mut base = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                base.pop();
            }
            Component::Normal(name) => {
                let next = base.join(name);
                base = next.canonicalize().unwrap_or(next);
            }
            other => base.push(other.as_os_str()),
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_existing_path_is_canonical() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("logs")).unwrap();

        let resolved = resolve_against(dir.path(), Path::new("./logs/../logs"));
        assert_eq!(resolved, dir.path().join("logs").canonicalize().unwrap());
    }

    #[test]
    fn test_missing_tail_is_folded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();

        let resolved = resolve_against(&root, Path::new("missing/deeper/../app.log"));
        assert_eq!(resolved, root.join("missing/app.log"));
    }

    #[test]
    fn test_empty_relative_is_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(resolve_against(&root, Path::new("")), root);
    }

    #[test]
    fn test_absolute_relative_replaces_root() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let target = other.path().canonicalize().unwrap().join("x.txt");

        assert_eq!(resolve_against(dir.path(), &target), target);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir_all(&real).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();

        let resolved = resolve_against(dir.path(), Path::new("link/file.txt"));
        assert_eq!(resolved, real.canonicalize().unwrap().join("file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_after_missing_parent_dir_collapses() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir_all(&real).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();

        let resolved = resolve_against(dir.path(), Path::new("missing/../link/app.log"));
        assert_eq!(resolved, real.canonicalize().unwrap().join("app.log"));
    }
}

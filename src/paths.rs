//! Lexical path normalisation.
//!
//! A canonical path here is absolute with `.`, `..` and repeated separators
//! removed. Symlinks are not resolved: `cd` into a link records the link's path.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Remove `.` and `..` components and redundant separators without touching the disk.
///
/// `..` at the root stays at the root; on a relative path leading `..` are kept.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Make `path` absolute against `base` and clean it.
pub fn absolutize_from(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean(path)
    } else {
        clean(&base.join(path))
    }
}

/// Make `path` absolute against the process working directory and clean it.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    Ok(clean(&std::path::absolute(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_drops_dots_and_separators() {
        assert_eq!(clean(Path::new("/a/./b//c/")), PathBuf::from("/a/b/c"));
        assert_eq!(clean(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn clean_relative_paths() {
        assert_eq!(clean(Path::new("a/../..")), PathBuf::from(".."));
        assert_eq!(clean(Path::new("./")), PathBuf::from("."));
        assert_eq!(clean(Path::new("../x/./y")), PathBuf::from("../x/y"));
    }

    #[test]
    fn absolutize_from_joins_relative_paths() {
        let base = Path::new("/home/u/work");
        assert_eq!(
            absolutize_from(base, Path::new("../notes")),
            PathBuf::from("/home/u/notes")
        );
        assert_eq!(
            absolutize_from(base, Path::new("/tmp/./x")),
            PathBuf::from("/tmp/x")
        );
    }

    #[test]
    fn absolutize_yields_absolute_path() {
        let p = absolutize(Path::new("some/dir/..")).unwrap();
        assert!(p.is_absolute());
        assert!(p.ends_with("some"));
    }
}

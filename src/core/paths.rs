//! Resolution and validation of the directory being checked.

use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::core::errors::{Result, SizeCheckError};

/// Make `path` absolute against the current directory and clean it lexically.
///
/// Symlinks are left in place so messages show the path the operator typed.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = env::current_dir().map_err(|source| SizeCheckError::io(".", source))?;
        cwd.join(path)
    };
    Ok(clean(&absolute))
}

/// Resolve the check root and confirm it is an existing directory.
pub fn resolve_check_root(path: &Path) -> Result<PathBuf> {
    let root = absolutize(path)?;
    let meta = fs::metadata(&root).map_err(|source| SizeCheckError::io(&root, source))?;
    if !meta.is_dir() {
        return Err(SizeCheckError::NotADirectory { path: root });
    }
    Ok(root)
}

fn clean(path: &Path) -> PathBuf {
    let mut kept: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(kept.last(), Some(Component::Normal(_))) {
                    kept.pop();
                }
            }
            other => kept.push(other),
        }
    }
    kept.into_iter().collect()
}

//! Recursive used-space walker.
//!
//! Sums the length of every non-directory entry below a root. Symlinks are
//! not followed: a link contributes its own `lstat` length, the same value the
//! entry metadata reports. Any unreadable directory or entry aborts the walk.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, SizeCheckError};

/// Walk `root` depth-first and total the sizes of all non-directory entries.
///
/// The root itself is resolved through symlinks; nothing below it is.
pub fn used_space(root: &Path) -> Result<u64> {
    let root_meta = fs::metadata(root).map_err(|source| SizeCheckError::Walk {
        path: root.to_path_buf(),
        source,
    })?;
    if !root_meta.is_dir() {
        return Err(SizeCheckError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut total = 0u64;
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| SizeCheckError::Walk {
            path: dir.clone(),
            source,
        })?;

        for entry_result in entries {
            let entry = entry_result.map_err(|source| SizeCheckError::Walk {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            // DirEntry::metadata does not traverse symlinks.
            let meta = entry
                .metadata()
                .map_err(|source| SizeCheckError::Walk {
                    path: path.clone(),
                    source,
                })?;

            if meta.is_dir() {
                pending.push(path);
            } else {
                total = total.saturating_add(meta.len());
            }
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn write_file(path: &Path, len: usize) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, vec![0u8; len]).unwrap();
    }

    #[test]
    fn sums_files_across_nesting() {
        let tmp = TempDir::new().unwrap();

        // root/
        //   top.bin (100)
        //   a/
        //     mid.bin (2_000)
        //     b/
        //       c/
        //         deep.bin (30_000)
        write_file(&tmp.path().join("top.bin"), 100);
        write_file(&tmp.path().join("a").join("mid.bin"), 2_000);
        write_file(&tmp.path().join("a/b/c/deep.bin"), 30_000);

        assert_eq!(used_space(tmp.path()).unwrap(), 32_100);
    }

    #[test]
    fn handles_empty_directory() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(used_space(tmp.path()).unwrap(), 0);
    }

    #[test]
    fn directories_contribute_nothing() {
        let tmp = TempDir::new().unwrap();
        for name in ["x", "y", "z/w"] {
            fs::create_dir_all(tmp.path().join(name)).unwrap();
        }
        assert_eq!(used_space(tmp.path()).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn does_not_follow_symlinks() {
        let tmp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        write_file(&outside.path().join("huge.bin"), 50_000);
        write_file(&tmp.path().join("small.bin"), 10);

        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(outside.path(), &link).unwrap();
        let link_len = fs::symlink_metadata(&link).unwrap().len();

        assert_eq!(used_space(tmp.path()).unwrap(), 10 + link_len);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_is_followed_but_nested_links_are_not() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        let elsewhere = tmp.path().join("elsewhere");
        write_file(&real.join("f.bin"), 4_096);
        write_file(&elsewhere.join("big.bin"), 90_000);

        let nested = real.join("nested-link");
        std::os::unix::fs::symlink(&elsewhere, &nested).unwrap();
        let nested_len = fs::symlink_metadata(&nested).unwrap().len();

        let root_link = tmp.path().join("link");
        std::os::unix::fs::symlink(&real, &root_link).unwrap();

        assert_eq!(used_space(&root_link).unwrap(), 4_096 + nested_len);
    }

    #[test]
    fn nonexistent_root_fails() {
        let tmp = TempDir::new().unwrap();
        let err = used_space(&tmp.path().join("missing")).unwrap_err();
        assert_eq!(err.code(), "SZC-2003");
    }

    #[test]
    fn file_root_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f");
        write_file(&file, 5);
        assert!(matches!(
            used_space(&file).unwrap_err(),
            SizeCheckError::NotADirectory { .. }
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn total_matches_sum_regardless_of_depth(
            files in prop::collection::vec((0usize..4, 0usize..4_096), 0..12)
        ) {
            let tmp = TempDir::new().unwrap();
            let mut expected = 0u64;
            for (index, (depth, len)) in files.iter().enumerate() {
                let mut path = tmp.path().to_path_buf();
                for level in 0..*depth {
                    path.push(format!("d{level}"));
                }
                path.push(format!("f{index}.bin"));
                write_file(&path, *len);
                expected += *len as u64;
            }

            prop_assert_eq!(used_space(tmp.path()).unwrap(), expected);
        }
    }
}

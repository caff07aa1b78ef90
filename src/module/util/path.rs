//! Path Operations Module
//!
//! This module handles path operations for directories and files.

use std::path::PathBuf;

/// Join Paths
///
/// This function takes a slice of strings as input and joins them into a single path string.
/// It uses the PathBuf type to handle platform-specific separators and conversions.
/// Non UTF-8 components are replaced lossily.
pub fn join(paths: &[&str]) -> String {
    let mut path: PathBuf = PathBuf::new();
    for p in paths {
        path.push(p);
    }
    path.to_string_lossy().into_owned()
}

pub mod dir {
    //! Directory Operations Submodule
    //!
    //! This submodule provides functions for directory operations.

    use std::fs;
    use std::io;
    use std::path::Path;

    use super::{RslkDir, RslkPath};
    use crate::module::define;

    /// Create Directory from Path List
    ///
    /// Creates a directory with the joined path and returns that path.
    pub fn create_dir_from_path_list(paths: &[&str]) -> io::Result<String> {
        let path = super::join(paths);
        fs::create_dir_all(Path::new(&path))?;
        Ok(path)
    }

    /// Create Subdirectory in Either Directory
    ///
    /// Creates `name` under `dir1` if `dir1` exists, under `dir2` otherwise.
    pub fn create_subdir_in_either_dir(dir1: &str, dir2: &str, name: &str) -> io::Result<String> {
        let parent: &str = match Path::new(dir1).is_dir() {
            true => dir1,
            false => dir2,
        };
        create_dir_from_path_list(&[parent, name])
    }

    /// Create Data Directory
    ///
    /// Uses `define::path::PERSISTENT_DIR` when it exists, `define::path::EPHEMERAL_DIR` otherwise.
    pub fn create_data_dir() -> io::Result<String> {
        create_subdir_in_either_dir(
            define::path::PERSISTENT_DIR,
            define::path::EPHEMERAL_DIR,
            define::system::NAME,
        )
    }

    /// Create Application Subdirectory and Paths
    ///
    /// Creates the data directory and its log directory.
    pub fn create_app_sub_dir() -> io::Result<RslkPath> {
        let data_dir = create_data_dir()?;
        create_app_sub_dir_in(&data_dir)
    }

    /// Same as `create_app_sub_dir`, rooted at an explicit data directory.
    pub fn create_app_sub_dir_in(data_dir: &str) -> io::Result<RslkPath> {
        let data_dir = create_dir_from_path_list(&[data_dir])?;
        let log_dir = create_dir_from_path_list(&[&data_dir, define::path::LOG_DIR])?;
        Ok(RslkPath {
            dir: RslkDir {
                data: data_dir,
                log: log_dir,
            },
        })
    }
}

/// Paths of Resources
#[derive(Debug, Clone)]
pub struct RslkPath {
    /// Directories Paths
    pub dir: RslkDir,
}

/// Paths of Directories
#[derive(Debug, Clone)]
pub struct RslkDir {
    /// Data Directory Path
    pub data: String,
    /// Log Directory Path
    pub log: String,
}

//! Per-fork log files.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ForkError;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s\\/.+*%!#]").expect("valid regex"));
static UNDERSCORE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{2,}").expect("valid regex"));

/// A directory holding one stdout and one stderr file per fork index.
#[derive(Debug, Clone)]
pub struct LogDir {
    dir: PathBuf,
    prefix: String,
}

impl LogDir {
    /// Create `dir` if needed and derive the file prefix from this host and process.
    pub fn create(dir: &Path) -> Result<Self, ForkError> {
        std::fs::create_dir_all(dir).map_err(|source| ForkError::LogDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        let host = hostname::get().map_or_else(|_| "localhost".to_string(), |h| h.to_string_lossy().into_owned());
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: log_prefix(&host, std::process::id()),
        })
    }

    /// Path of the stdout log of fork `index`.
    pub fn stdout_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{index}_stdout.txt", self.prefix))
    }

    /// Path of the stderr log of fork `index`.
    pub fn stderr_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{index}_stderr.txt", self.prefix))
    }

    /// Create both log files of fork `index`, failing if either already exists.
    pub fn open(&self, index: usize) -> Result<(File, File), ForkError> {
        let stdout = create_new(self.stdout_path(index))?;
        let stderr = create_new(self.stderr_path(index))?;
        Ok((stdout, stderr))
    }
}

fn create_new(path: PathBuf) -> Result<File, ForkError> {
    File::options()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|source| ForkError::LogFileCreation { path, source })
}

/// File name prefix unique to a forking process: `<host>_<pid>_fork_`,
/// lowercase, with separators and shell-unfriendly characters replaced.
pub fn log_prefix(host: &str, pid: u32) -> String {
    let raw = format!("{host}_{pid}_fork_").to_lowercase();
    let replaced = UNSAFE_CHARS.replace_all(&raw, "_");
    UNDERSCORE_RUNS.replace_all(&replaced, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prefix_is_sanitized() {
        assert_eq!(log_prefix("My-Host.local", 42), "my_host_local_42_fork_");
        assert_eq!(log_prefix("a b\\c/d+e*f%g!h#i", 1), "a_b_c_d_e_f_g_h_i_1_fork_");
        assert_eq!(log_prefix("x--y", 7), "x_y_7_fork_");
    }

    #[test]
    fn file_names_are_index_keyed() {
        let dir = tempdir().unwrap();
        let logs = LogDir::create(dir.path()).unwrap();
        let out0 = logs.stdout_path(0);
        let err0 = logs.stderr_path(0);
        assert_ne!(out0, err0);
        assert_ne!(out0, logs.stdout_path(1));
        assert!(out0.to_string_lossy().ends_with("_fork_0_stdout.txt"));
        assert!(err0.to_string_lossy().ends_with("_fork_0_stderr.txt"));
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let logs = LogDir::create(&nested).unwrap();
        logs.open(0).unwrap();
        assert!(logs.stdout_path(0).is_file());
        assert!(logs.stderr_path(0).is_file());
    }

    #[test]
    fn existing_log_file_is_an_error() {
        let dir = tempdir().unwrap();
        let logs = LogDir::create(dir.path()).unwrap();
        logs.open(3).unwrap();
        let err = logs.open(3).unwrap_err();
        assert!(matches!(err, ForkError::LogFileCreation { .. }));
    }

    #[test]
    fn directory_path_occupied_by_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, "x").unwrap();
        let err = LogDir::create(&file).unwrap_err();
        assert!(matches!(err, ForkError::LogDirectory { .. }));
    }
}

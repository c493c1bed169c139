//! Running a program as several parallel copies of itself.
//!
//! A program flattens [`ForkArgs`] into its command line parser and calls
//! [`fork`] early. Launched copies see the same command line without the
//! fork options plus a hidden `--fork-id <i>`, so every copy can tell which
//! one it is.

mod args;
mod count;
mod logs;

use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Serialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::ForkError;
use crate::process::{ProcessGroup, ProcessOptions, StreamMode};
use crate::sink::TracingSink;

pub use args::{strip_fork_args, ForkArgs, FORK_FLAG, FORK_ID_FLAG, FORK_LOG_DIR_FLAG};
pub use count::resolve_fork_count;
pub use logs::{log_prefix, LogDir};

static IDENTITY: OnceLock<ForkResult> = OnceLock::new();

/// Identity of the running process after [`fork`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForkResult {
    /// Index of this copy, or `None` for the original process running inline.
    pub fork_id: Option<usize>,
    /// Command line arguments without program name and fork options.
    pub args: Vec<String>,
}

impl ForkResult {
    /// Whether this process is one of the launched copies.
    pub fn is_fork(&self) -> bool {
        self.fork_id.is_some()
    }
}

/// How copies are launched.
#[derive(Debug, Clone)]
pub struct ForkOptions {
    /// Program to launch; the current executable when `None`.
    pub program: Option<PathBuf>,
    /// Wait for all copies before returning.
    pub wait: bool,
    /// What happens to the copies' output when there is no log directory.
    /// Captured lines are logged per copy and need `wait`.
    pub output: StreamMode,
}

impl Default for ForkOptions {
    fn default() -> Self {
        Self {
            program: None,
            wait: true,
            output: StreamMode::Inherit,
        }
    }
}

impl ForkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch `program` instead of the current executable.
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Return as soon as every copy is started.
    pub fn no_wait(mut self) -> Self {
        self.wait = false;
        self
    }

    /// Choose what happens to the copies' output.
    pub fn output(mut self, mode: StreamMode) -> Self {
        self.output = mode;
        self
    }

    /// Output mode actually used: nobody reads captured output of copies
    /// that are not waited for, so they inherit instead.
    fn effective_output(&self) -> StreamMode {
        match self.output {
            StreamMode::Capture if !self.wait => StreamMode::Inherit,
            mode => mode,
        }
    }
}

/// Identity recorded by the first [`fork`] call of this process.
pub fn fork_identity() -> Option<&'static ForkResult> {
    IDENTITY.get()
}

/// Launch parallel copies of this program if requested.
///
/// Returns `Some` when the caller should do the actual work: either as a
/// launched copy (`fork_id` set) or as the original process when no forking
/// was requested (`fork_id` unset). Returns `None` in a process that
/// launched copies; it has nothing left to do.
///
/// `argv` is the full command line including the program name.
pub async fn fork(
    args: &ForkArgs,
    argv: &[String],
    options: &ForkOptions,
) -> Result<Option<ForkResult>, ForkError> {
    let passthrough = strip_fork_args(argv);

    if let Some(id) = args.fork_id {
        debug!(fork_id = id, "Running as fork");
        return Ok(Some(record(ForkResult {
            fork_id: Some(id),
            args: passthrough,
        })));
    }

    let count = match args.fork {
        Some(requested) => resolve_fork_count(requested, None)?,
        None => 0,
    };
    if count == 0 {
        debug!("No forking requested, running inline");
        return Ok(Some(record(ForkResult {
            fork_id: None,
            args: passthrough,
        })));
    }

    let program = match options.program {
        Some(ref program) => program.clone(),
        None => std::env::current_exe().map_err(ForkError::CurrentExe)?,
    };
    let program_name = program.display().to_string();
    let log_dir = args.fork_log_dir.as_deref().map(LogDir::create).transpose()?;

    // Every log file exists before the first copy starts
    let mut log_files = Vec::with_capacity(count);
    if let Some(ref logs) = log_dir {
        for index in 0..count {
            log_files.push(logs.open(index)?);
        }
    }
    let mut log_files = log_files.into_iter();

    info!(count, program = %program_name, "Forking");

    let output = options.effective_output();
    let mut group = ProcessGroup::new();
    for index in 0..count {
        let mut command = child_command(&program_name, &passthrough, index, output);
        if let Some((stdout, stderr)) = log_files.next() {
            command.stdout(stdout).stderr(stderr);
        }
        debug!(index, args = ?passthrough, "Starting fork");
        match command.spawn() {
            Ok(child) => {
                let label = format!("fork {index}");
                let sink = TracingSink::new(label.clone());
                group.adopt(label, child, sink);
            }
            Err(source) => {
                let killed = group.kill_all().await;
                warn!(index, killed, "Failed to start fork, stopped the ones already running");
                return Err(ForkError::Spawn {
                    index,
                    program: program_name,
                    source,
                });
            }
        }
    }

    if options.wait {
        info!(count, "Waiting for forks");
        for exit in group.wait_all().await {
            match exit.status {
                Ok(status) if status.success() => {
                    info!(fork = %exit.label, %status, "Fork finished");
                }
                Ok(status) => warn!(fork = %exit.label, %status, "Fork failed"),
                Err(e) => warn!(fork = %exit.label, "Failed to wait for fork: {e}"),
            }
        }
    } else {
        let released = group.detach();
        info!(count = released, "Not waiting for forks");
    }

    Ok(None)
}

fn child_command(program: &str, passthrough: &[String], index: usize, output: StreamMode) -> Command {
    ProcessOptions::new(program)
        .args(passthrough.iter().cloned())
        .arg(FORK_ID_FLAG)
        .arg(index.to_string())
        .output(output)
        .command()
}

fn record(result: ForkResult) -> ForkResult {
    if IDENTITY.set(result.clone()).is_err() {
        debug!("Fork identity already recorded");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn inline_without_fork_option() {
        let result = fork(&ForkArgs::default(), &argv(&["prog", "x"]), &ForkOptions::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.fork_id, None);
        assert!(!result.is_fork());
        assert_eq!(result.args, argv(&["x"]));
        assert!(fork_identity().is_some());
    }

    #[tokio::test]
    async fn inline_with_zero_count() {
        let args = ForkArgs {
            fork: Some(0.0),
            ..ForkArgs::default()
        };
        let result = fork(
            &args,
            &argv(&["prog", "--fork", "0", "y"]),
            &ForkOptions::new().program("nonexistent_command_12345"),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(result.fork_id, None);
        assert_eq!(result.args, argv(&["y"]));
    }

    #[tokio::test]
    async fn existing_fork_id_never_spawns() {
        let args = ForkArgs {
            fork: Some(3.0),
            fork_log_dir: None,
            fork_id: Some(2),
        };
        let result = fork(
            &args,
            &argv(&["prog", "--fork", "3", "--fork-id", "2"]),
            &ForkOptions::new().program("nonexistent_command_12345"),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(result.fork_id, Some(2));
        assert!(result.args.is_empty());
    }

    #[tokio::test]
    async fn invalid_count_is_rejected() {
        let args = ForkArgs {
            fork: Some(f64::NAN),
            ..ForkArgs::default()
        };
        let err = fork(&args, &argv(&["prog"]), &ForkOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ForkError::InvalidForkCount(_)));
    }

    #[tokio::test]
    async fn forks_write_index_keyed_logs() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let args = ForkArgs {
            fork: Some(3.0),
            fork_log_dir: Some(log_dir.clone()),
            fork_id: None,
        };
        let command_line = argv(&[
            "prog",
            "hello",
            "--fork",
            "3",
            "--fork-log-dir",
            &log_dir.to_string_lossy(),
        ]);
        let result = fork(&args, &command_line, &ForkOptions::new().program("echo"))
            .await
            .unwrap();
        assert!(result.is_none());

        let logs = LogDir::create(&log_dir).unwrap();
        for index in 0..3 {
            let stdout = std::fs::read_to_string(logs.stdout_path(index)).unwrap();
            assert_eq!(stdout.trim(), format!("hello --fork-id {index}"));
            let stderr = std::fs::read_to_string(logs.stderr_path(index)).unwrap();
            assert!(stderr.is_empty());
        }
        let files = std::fs::read_dir(&log_dir).unwrap().count();
        assert_eq!(files, 6);
    }

    #[tokio::test]
    async fn spawn_failure_is_fatal() {
        let args = ForkArgs {
            fork: Some(1.0),
            ..ForkArgs::default()
        };
        let err = fork(
            &args,
            &argv(&["prog", "--fork", "1"]),
            &ForkOptions::new().program("nonexistent_command_12345"),
        )
        .await
        .unwrap_err();
        match err {
            ForkError::Spawn { index, program, .. } => {
                assert_eq!(index, 0);
                assert_eq!(program, "nonexistent_command_12345");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn no_wait_returns_after_spawning() {
        let args = ForkArgs {
            fork: Some(2.0),
            ..ForkArgs::default()
        };
        let result = fork(
            &args,
            &argv(&["prog"]),
            &ForkOptions::new().program("true").no_wait(),
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn log_file_failure_starts_no_fork() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let marker = dir.path().join("ran");
        let logs = LogDir::create(&log_dir).unwrap();
        std::fs::write(logs.stdout_path(1), "taken").unwrap();

        let args = ForkArgs {
            fork: Some(2.0),
            fork_log_dir: Some(log_dir.clone()),
            fork_id: None,
        };
        let script = format!("touch '{}'", marker.display());
        let err = fork(
            &args,
            &argv(&["prog", "-c", &script]),
            &ForkOptions::new().program("sh"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ForkError::LogFileCreation { .. }));

        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn captured_output_is_drained() {
        let args = ForkArgs {
            fork: Some(2.0),
            ..ForkArgs::default()
        };
        let result = fork(
            &args,
            &argv(&["prog", "-c", "seq 1 5000; seq 1 5000 >&2"]),
            &ForkOptions::new().program("sh").output(StreamMode::Capture),
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn capture_needs_waiting() {
        let options = ForkOptions::new().output(StreamMode::Capture);
        assert_eq!(options.effective_output(), StreamMode::Capture);
        assert_eq!(options.no_wait().effective_output(), StreamMode::Inherit);
        let options = ForkOptions::new().output(StreamMode::Null).no_wait();
        assert_eq!(options.effective_output(), StreamMode::Null);
    }
}

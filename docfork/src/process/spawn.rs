//! Child process command lines with a per-stream choice of stdio.

use std::process::Stdio;

use clap::ValueEnum;
use tokio::process::Command;

/// What happens to one of the child's output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StreamMode {
    /// Forward to the same stream of this process.
    #[default]
    Inherit,
    /// Discard.
    Null,
    /// Capture line by line.
    Capture,
}

impl StreamMode {
    fn stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Null => Stdio::null(),
            Self::Capture => Stdio::piped(),
        }
    }
}

/// Configuration options for spawning a process.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// The program to execute.
    pub program: String,

    /// Arguments to pass to the program.
    pub args: Vec<String>,

    /// Handling of the child's stdout (default: inherit).
    pub stdout: StreamMode,

    /// Handling of the child's stderr (default: inherit).
    pub stderr: StreamMode,
}

impl ProcessOptions {
    /// Create new options for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout: StreamMode::Inherit,
            stderr: StreamMode::Inherit,
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Choose how stdout and stderr are handled.
    pub fn output(self, mode: StreamMode) -> Self {
        self.stdout(mode).stderr(mode)
    }

    /// Choose how stdout is handled.
    pub fn stdout(mut self, mode: StreamMode) -> Self {
        self.stdout = mode;
        self
    }

    /// Choose how stderr is handled.
    pub fn stderr(mut self, mode: StreamMode) -> Self {
        self.stderr = mode;
        self
    }

    /// Build the command described by these options without spawning it.
    ///
    /// stdin is always closed.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdout(self.stdout.stdio());
        cmd.stderr(self.stderr.stdio());
        cmd.stdin(Stdio::null());
        cmd
    }
}

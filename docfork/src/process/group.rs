//! Groups of processes that are started together and awaited together.
//!
//! Every member runs independently; the group only knows how to wait for all
//! of them, stop all of them or let them go.

use std::io;
use std::process::ExitStatus;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tracing::warn;

use crate::sink::LineSink;

/// Identifier of a process within its group.
pub type ProcessId = usize;

const LINE_BUFFER: usize = 1000;

/// How one member of the group ended.
#[derive(Debug)]
pub struct MemberExit {
    pub id: ProcessId,
    pub label: String,
    /// Exit status, or why it could not be obtained.
    pub status: io::Result<ExitStatus>,
}

struct Member {
    id: ProcessId,
    label: String,
    child: Child,
    sink: Box<dyn LineSink + Send>,
}

/// A set of running child processes.
///
/// # Example
///
/// ```rust,no_run
/// use docfork::process::{ProcessGroup, ProcessOptions, StreamMode};
///
/// #[tokio::main]
/// async fn main() -> std::io::Result<()> {
///     let mut group = ProcessGroup::new();
///     for word in ["first", "second"] {
///         let child = ProcessOptions::new("echo")
///             .arg(word)
///             .output(StreamMode::Capture)
///             .command()
///             .spawn()?;
///         group.adopt(word, child, |line: &str| println!("{line}"));
///     }
///
///     for exit in group.wait_all().await {
///         println!("{}: {:?}", exit.label, exit.status);
///     }
///     Ok(())
/// }
/// ```
#[derive(Default)]
pub struct ProcessGroup {
    members: Vec<Member>,
    next_id: ProcessId,
}

impl ProcessGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spawned child to the group.
    ///
    /// Lines of the child's captured streams go to `sink` while the group is
    /// awaited; streams that were not piped never reach it.
    pub fn adopt(
        &mut self,
        label: impl Into<String>,
        child: Child,
        sink: impl LineSink + Send + 'static,
    ) -> ProcessId {
        let id = self.next_id;
        self.next_id += 1;
        self.members.push(Member {
            id,
            label: label.into(),
            child,
            sink: Box::new(sink),
        });
        id
    }

    /// Wait for every member to exit, in parallel.
    ///
    /// Every member gets an entry, ordered by process id, even when waiting
    /// for some of them fails.
    pub async fn wait_all(self) -> Vec<MemberExit> {
        let pending: Vec<_> = self
            .members
            .into_iter()
            .map(|member| (member.id, member.label.clone(), tokio::spawn(wait_member(member))))
            .collect();

        let mut exits = Vec::with_capacity(pending.len());
        for (id, label, handle) in pending {
            let status = match handle.await {
                Ok(status) => status,
                Err(e) => Err(io::Error::other(e)),
            };
            exits.push(MemberExit { id, label, status });
        }
        exits
    }

    /// Kill every member and reap it.
    ///
    /// Returns the number of members that were killed.
    pub async fn kill_all(self) -> usize {
        let mut killed = 0;
        for mut member in self.members {
            match member.child.kill().await {
                Ok(()) => killed += 1,
                Err(e) => warn!(member = %member.label, "Failed to kill process: {e}"),
            }
        }
        killed
    }

    /// Let all members run on without waiting for them.
    ///
    /// Returns the number of released processes.
    pub fn detach(self) -> usize {
        self.members.len()
    }
}

/// Forward a member's captured lines to its sink, then wait for it to exit.
async fn wait_member(mut member: Member) -> io::Result<ExitStatus> {
    let (tx, mut rx) = mpsc::channel::<String>(LINE_BUFFER);

    if let Some(stdout) = member.child.stdout.take() {
        tokio::spawn(forward_lines(stdout, tx.clone()));
    }
    if let Some(stderr) = member.child.stderr.take() {
        tokio::spawn(forward_lines(stderr, tx.clone()));
    }
    // The channel closes once both readers are done
    drop(tx);

    while let Some(line) = rx.recv().await {
        member.sink.accept(&line);
    }
    member.child.wait().await
}

async fn forward_lines(stream: impl AsyncRead + Unpin, tx: mpsc::Sender<String>) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
            break;
        }
    }
}

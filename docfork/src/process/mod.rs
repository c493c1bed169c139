//! Child process plumbing.
//!
//! Command lines with a per-stream stdio choice, plus groups of children that
//! are awaited or stopped together.

mod group;
mod spawn;

pub use group::{MemberExit, ProcessGroup, ProcessId};
pub use spawn::{ProcessOptions, StreamMode};

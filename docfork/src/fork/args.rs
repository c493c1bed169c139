//! Command line options controlling forking.

use std::path::PathBuf;

use clap::Args;

pub const FORK_FLAG: &str = "--fork";
pub const FORK_LOG_DIR_FLAG: &str = "--fork-log-dir";
pub const FORK_ID_FLAG: &str = "--fork-id";

/// Forking options, meant to be flattened into a program's own parser.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ForkArgs {
    /// Launch this program multiple times in parallel: an absolute number of
    /// processes, or a fraction in (0, 1) of the logical CPU cores
    #[arg(long = "fork", value_name = "COUNT", allow_negative_numbers = true)]
    pub fork: Option<f64>,

    /// Directory receiving one stdout and one stderr log file per fork
    #[arg(long = "fork-log-dir", value_name = "DIR")]
    pub fork_log_dir: Option<PathBuf>,

    /// Identity of a launched copy (set internally)
    #[arg(long = "fork-id", value_name = "ID", hide = true)]
    pub fork_id: Option<usize>,
}

/// Drop the program name and every fork option from a raw command line.
///
/// Handles both `--opt value` and `--opt=value`. What remains is passed on
/// unchanged to the launched copies.
pub fn strip_fork_args(argv: &[String]) -> Vec<String> {
    let mut kept = Vec::with_capacity(argv.len());
    let mut iter = argv.iter().skip(1);
    while let Some(arg) = iter.next() {
        let flag = arg.split_once('=').map_or(arg.as_str(), |(flag, _)| flag);
        let is_fork_flag = [FORK_FLAG, FORK_LOG_DIR_FLAG, FORK_ID_FLAG].contains(&flag);
        if !is_fork_flag {
            kept.push(arg.clone());
        } else if !arg.contains('=') {
            // the value is the next argument
            iter.next();
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[arg(long)]
        text: Option<String>,

        #[command(flatten)]
        fork: ForkArgs,
    }

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_fork_options() {
        let cli = TestCli::parse_from(["prog", "--fork", "3", "--fork-log-dir", "/tmp/x", "--text", "hi"]);
        assert_eq!(cli.fork.fork, Some(3.0));
        assert_eq!(cli.fork.fork_log_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.fork.fork_id, None);
        assert_eq!(cli.text.as_deref(), Some("hi"));
    }

    #[test]
    fn parses_fraction_and_negative() {
        let cli = TestCli::parse_from(["prog", "--fork", "0.5"]);
        assert_eq!(cli.fork.fork, Some(0.5));
        let cli = TestCli::parse_from(["prog", "--fork", "-1"]);
        assert_eq!(cli.fork.fork, Some(-1.0));
    }

    #[test]
    fn parses_hidden_fork_id() {
        let cli = TestCli::parse_from(["prog", "--text", "x", "--fork-id", "2"]);
        assert_eq!(cli.fork.fork_id, Some(2));
    }

    #[test]
    fn strips_separate_values() {
        let stripped = strip_fork_args(&argv(&[
            "prog", "demo", "--fork", "3", "--text", "a b", "--fork-log-dir", "logs",
        ]));
        assert_eq!(stripped, argv(&["demo", "--text", "a b"]));
    }

    #[test]
    fn strips_inline_values() {
        let stripped = strip_fork_args(&argv(&["prog", "--fork=2", "--fork-log-dir=/tmp", "-v"]));
        assert_eq!(stripped, argv(&["-v"]));
    }

    #[test]
    fn keeps_similar_options() {
        let stripped = strip_fork_args(&argv(&["prog", "--forks", "2", "--fork-logs"]));
        assert_eq!(stripped, argv(&["--forks", "2", "--fork-logs"]));
    }

    #[test]
    fn empty_command_line() {
        assert!(strip_fork_args(&[]).is_empty());
    }
}

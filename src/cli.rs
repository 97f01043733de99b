use crate::mode::Mode;
use clap::{Parser, Subcommand};

/// Flags the wrapper owns; everything else belongs to Claude Code. They are
/// stripped wherever they appear so they compose with passthrough arguments.
const UNMODIFIED_FLAGS: [&str; 2] = ["--claude", "--no-agents"];

#[derive(Parser, Debug)]
#[command(name = "agents-code")]
#[command(about = "Run Claude Code with the AGENTS.md context-file convention", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true, disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Force unmodified dispatch for this run only. Set by --claude or
    /// --no-agents, which are removed before clap sees the argument list.
    #[arg(skip)]
    pub unmodified: bool,

    /// Arguments passed through untouched to Claude Code
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or set the persisted mode
    Mode {
        /// New mode; prints the current mode when omitted
        value: Option<Mode>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::from_arg_list(std::env::args().collect())
    }

    /// Strip the wrapper-owned flags from anywhere in the argument list,
    /// then hand the remainder to clap.
    pub fn from_arg_list(args: Vec<String>) -> Self {
        let mut unmodified = false;
        let mut filtered = Vec::with_capacity(args.len());
        for (i, arg) in args.into_iter().enumerate() {
            if i > 0 && UNMODIFIED_FLAGS.contains(&arg.as_str()) {
                unmodified = true;
                continue;
            }
            filtered.push(arg);
        }

        let mut cli = Self::parse_from(filtered);
        cli.unmodified = unmodified;
        cli
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("agents-code")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_plain_invocation_passes_args_through() {
        let cli = Cli::from_arg_list(argv(&["--resume", "some prompt"]));
        assert!(cli.command.is_none());
        assert!(!cli.unmodified);
        assert_eq!(cli.args, vec!["--resume", "some prompt"]);
    }

    #[test]
    fn test_claude_flag_is_stripped_anywhere() {
        let cli = Cli::from_arg_list(argv(&["--resume", "--claude", "prompt"]));
        assert!(cli.unmodified);
        assert_eq!(cli.args, vec!["--resume", "prompt"]);
    }

    #[test]
    fn test_no_agents_flag_is_stripped() {
        let cli = Cli::from_arg_list(argv(&["--no-agents"]));
        assert!(cli.unmodified);
        assert!(cli.args.is_empty());
    }

    #[test]
    fn test_help_flows_through_to_claude_code() {
        let cli = Cli::from_arg_list(argv(&["--help"]));
        assert!(cli.command.is_none());
        assert_eq!(cli.args, vec!["--help"]);
    }

    #[test]
    fn test_mode_subcommand_set() {
        let cli = Cli::from_arg_list(argv(&["mode", "claude"]));
        assert!(matches!(
            cli.command,
            Some(Commands::Mode {
                value: Some(Mode::Claude)
            })
        ));
    }

    #[test]
    fn test_mode_subcommand_query() {
        let cli = Cli::from_arg_list(argv(&["mode"]));
        assert!(matches!(cli.command, Some(Commands::Mode { value: None })));
    }
}

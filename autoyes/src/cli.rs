//! CLI argument parsing types using `clap`.

use clap::{Args, Parser, Subcommand};

/// Auto-answer yes/no prompts of interactive CLI tools
#[derive(Parser, Debug)]
#[command(name = "autoyes")]
#[command(version, about = "Auto-respond to interactive CLI prompts")]
#[command(
    after_help = "Wrap a known tool directly with `autoyes <profile> [ARGS...]`, \
                  e.g. `autoyes claude \"fix the tests\"`. Run `autoyes list` for profiles."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a shell session where prompts are answered automatically
    #[command(long_flag = "on")]
    On(SessionOpts),

    /// Explain how to leave an active session
    #[command(long_flag = "off")]
    Off,

    /// Report whether a session is active
    Status,

    /// Run a single command with auto-responses
    Run {
        #[command(flatten)]
        opts: SessionOpts,

        /// Command and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List the available CLI profiles
    #[command(short_flag = 'l', long_flag = "list")]
    List,

    /// List prompt patterns, optionally for some categories only
    Patterns {
        /// Categories to show (default: all)
        categories: Vec<String>,
    },

    /// Persist a custom prompt pattern
    AddPattern {
        /// Regex pattern
        pattern: String,
    },

    /// Remove a persisted custom prompt pattern
    DelPattern {
        /// Regex pattern
        pattern: String,
    },

    /// Wrap a known tool: `autoyes <profile> [ARGS...]`
    #[command(external_subcommand)]
    Wrap(Vec<String>),
}

/// Options shared by `on` and `run`
#[derive(Args, Debug, Default, Clone)]
pub struct SessionOpts {
    /// Text to send (default: y)
    #[arg(long, value_name = "TEXT")]
    pub response: Option<String>,

    /// Seconds between auto-responses (default: 0.5)
    #[arg(long, value_name = "SECONDS")]
    pub cooldown: Option<f64>,

    /// Show a notice every time a prompt is answered
    #[arg(short, long)]
    pub verbose: bool,

    /// Additional regex pattern (repeatable)
    #[arg(long = "pattern", value_name = "REGEX")]
    pub patterns: Vec<String>,

    /// CLI profile to load (repeatable, or 'all')
    #[arg(long = "cli", value_name = "NAME")]
    pub profiles: Vec<String>,

    /// Use plain pipes instead of a pseudo-terminal
    #[arg(long)]
    pub no_pty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("autoyes").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_on_as_flag_and_subcommand() {
        for args in [&["--on", "-v"][..], &["on", "--verbose"][..]] {
            match parse(args).command {
                Some(Command::On(opts)) => assert!(opts.verbose),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_list_aliases() {
        for args in [&["list"][..], &["-l"][..], &["--list"][..]] {
            assert!(matches!(parse(args).command, Some(Command::List)));
        }
    }

    #[test]
    fn test_run_with_separator() {
        let cli = parse(&["run", "--cli", "codex", "--cooldown", "1.5", "--", "codex", "-q", "fix"]);
        match cli.command {
            Some(Command::Run { opts, command }) => {
                assert_eq!(opts.profiles, vec!["codex"]);
                assert_eq!(opts.cooldown, Some(1.5));
                assert_eq!(command, vec!["codex", "-q", "fix"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_run_without_separator() {
        let cli = parse(&["run", "ls", "-l"]);
        match cli.command {
            Some(Command::Run { command, .. }) => assert_eq!(command, vec!["ls", "-l"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_command() {
        assert!(Cli::try_parse_from(["autoyes", "run"]).is_err());
    }

    #[test]
    fn test_repeatable_options() {
        let cli = parse(&["on", "--pattern", "a", "--pattern", "b", "--cli", "claude", "--cli", "aider", "--no-pty"]);
        match cli.command {
            Some(Command::On(opts)) => {
                assert_eq!(opts.patterns, vec!["a", "b"]);
                assert_eq!(opts.profiles, vec!["claude", "aider"]);
                assert!(opts.no_pty);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_word_is_wrap() {
        let cli = parse(&["claude", "--model", "opus", "fix tests"]);
        match cli.command {
            Some(Command::Wrap(argv)) => {
                assert_eq!(argv, vec!["claude", "--model", "opus", "fix tests"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_no_arguments() {
        assert!(parse(&[]).command.is_none());
    }
}

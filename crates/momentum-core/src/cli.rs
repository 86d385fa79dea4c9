use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "momentum",
    version,
    about = "Momentum: task board client for the momentum API",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "rc-file", global = true)]
    pub rc_file: Option<PathBuf>,

    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show tasks grouped by status, optionally filtered
    Board(BoardArgs),

    /// Inspect a task or change its status
    #[command(subcommand)]
    Task(TaskCommand),

    /// Post a comment on a task, or a reply to one of its comments
    Comment {
        task: u64,
        text: String,
        #[arg(long = "reply-to")]
        reply_to: Option<u64>,
    },

    /// Work on the saved new-task draft
    #[command(subcommand)]
    Draft(DraftCommand),

    /// Manage employees
    #[command(subcommand)]
    Employee(EmployeeCommand),

    /// List statuses, priorities, departments and employees
    Lookups,

    /// Print effective configuration
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BoardArgs {
    #[arg(short = 'd', long = "department")]
    pub departments: Vec<u64>,

    #[arg(short = 'p', long = "priority")]
    pub priorities: Vec<u64>,

    #[arg(short = 'e', long = "employee")]
    pub employee: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Show a task with its comments
    Show { id: u64 },

    /// Move a task to another status
    Status { id: u64, status: u64 },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DraftCommand {
    /// Show the draft with its validation state
    Show,

    /// Change draft fields
    Set(DraftSetArgs),

    /// Discard the draft
    Clear,

    /// Create the task from the draft
    Submit,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DraftSetArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub priority: Option<u64>,

    #[arg(long)]
    pub status: Option<u64>,

    #[arg(long)]
    pub department: Option<u64>,

    #[arg(long)]
    pub employee: Option<u64>,

    /// `today`, `tomorrow`, `+Nd`, `YYYY-MM-DD`, `DD.MM.YYYY` or RFC 3339
    #[arg(long)]
    pub deadline: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EmployeeCommand {
    /// Create an employee with an avatar image
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        avatar: PathBuf,
        #[arg(long)]
        department: u64,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_board_filters() {
        let cli = GlobalCli::try_parse_from([
            "momentum", "-vv", "board", "-d", "1", "-d", "3", "--priority", "2", "-e", "7",
        ])
        .expect("parse");
        assert_eq!(cli.verbose, 2);
        let Command::Board(args) = cli.command else {
            panic!("expected board command");
        };
        assert_eq!(args.departments, vec![1, 3]);
        assert_eq!(args.priorities, vec![2]);
        assert_eq!(args.employee, Some(7));
    }

    #[test]
    fn rc_override_requires_key_value() {
        let ok = GlobalCli::try_parse_from(["momentum", "--rc", "color=off", "lookups"])
            .expect("parse");
        assert_eq!(ok.rc_overrides[0].key, "color");
        assert_eq!(ok.rc_overrides[0].value, "off");

        assert!(GlobalCli::try_parse_from(["momentum", "--rc", "color", "lookups"]).is_err());
    }

    #[test]
    fn parses_reply_and_draft_fields() {
        let cli = GlobalCli::try_parse_from([
            "momentum", "comment", "12", "looks good", "--reply-to", "4",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Command::Comment { task: 12, reply_to: Some(4), .. }
        ));

        let cli = GlobalCli::try_parse_from([
            "momentum", "draft", "set", "--title", "Fix login", "--deadline", "tomorrow",
        ])
        .expect("parse");
        let Command::Draft(DraftCommand::Set(args)) = cli.command else {
            panic!("expected draft set");
        };
        assert_eq!(args.title.as_deref(), Some("Fix login"));
        assert_eq!(args.deadline.as_deref(), Some("tomorrow"));
        assert_eq!(args.priority, None);
    }
}

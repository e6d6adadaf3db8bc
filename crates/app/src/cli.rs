use std::path::PathBuf;

use clap::{Parser, Subcommand};
use program_core::model::{ProgramId, UserId};

#[derive(Debug, Parser)]
#[command(name = "programs", about = "Track progress through guided wellness programs")]
pub struct Cli {
    /// SQLite database URL or file path
    #[arg(long, global = true, env = "PROGRAMS_DB_URL", default_value = "sqlite:programs.sqlite3")]
    pub db: String,

    /// Catalog JSON file; the built-in catalog is used when omitted
    #[arg(long, global = true, env = "PROGRAMS_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Identity of the signed-in user
    #[arg(long, global = true, env = "PROGRAMS_USER_ID")]
    pub user: Option<UserId>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List programs in the catalog
    Programs,
    /// Show the lesson for a given day
    Lesson {
        #[arg(long)]
        program: ProgramId,
        #[arg(long)]
        week: u32,
        #[arg(long)]
        day: u8,
    },
    /// Enroll in a program
    Enroll {
        #[arg(long)]
        program: ProgramId,
    },
    /// Mark a day complete
    Complete {
        #[arg(long)]
        program: ProgramId,
        #[arg(long)]
        week: u32,
        #[arg(long)]
        day: u8,
        /// Record the day even if its week is still locked
        #[arg(long)]
        ignore_lock: bool,
    },
    /// Show progress for one program, or every enrolled program
    Status {
        #[arg(long)]
        program: Option<ProgramId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_complete_with_global_flags() {
        let cli = Cli::try_parse_from([
            "programs",
            "complete",
            "--program",
            "life-transition",
            "--week",
            "1",
            "--day",
            "3",
            "--user",
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(cli.user.is_some());
        match cli.command {
            Command::Complete {
                program,
                week,
                day,
                ignore_lock,
            } => {
                assert_eq!(program.as_str(), "life-transition");
                assert_eq!((week, day), (1, 3));
                assert!(!ignore_lock);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_program_slug() {
        let result = Cli::try_parse_from(["programs", "enroll", "--program", "Not A Slug"]);
        assert!(result.is_err());
    }
}

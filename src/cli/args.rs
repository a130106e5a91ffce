//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Course, student and grade records from the command line
#[derive(Parser, Debug)]
#[command(name = "gradebook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (repeat for more: -d -d -d)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Config file (overrides the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

// Positional arguments of c/s/g/u are optional so that missing ones are
// reported as "Not enough arguments" by the dispatcher instead of clap.
// Once a positional is taken, later words starting with `-` are values too,
// so global flags belong before the first positional.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List course names alphabetically
    #[command(name = "c")]
    Courses,

    /// List students as "First Last"
    #[command(name = "s")]
    Students,

    /// List a course's grades, or show one student's grade
    #[command(name = "g")]
    Grades {
        /// Course name
        #[arg(allow_hyphen_values = true)]
        course: Option<String>,
        /// Student last name
        #[arg(allow_hyphen_values = true)]
        last_name: Option<String>,
    },

    /// Set a student's grade in a course
    #[command(name = "u")]
    Update {
        /// Course name
        #[arg(allow_hyphen_values = true)]
        course: Option<String>,
        /// Student last name
        #[arg(allow_hyphen_values = true)]
        last_name: Option<String>,
        /// Integer grade
        #[arg(allow_hyphen_values = true)]
        grade: Option<String>,
    },

    /// Create the database tables if missing
    Init,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create global config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}

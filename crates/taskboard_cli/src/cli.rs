use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskboard_core::{BackendKind, MonthFilter};

#[derive(Parser)]
#[command(name = "taskboard", about = "Person and task dashboard", version)]
pub struct Cli {
    /// Config file [default: ~/.taskboard/taskboard.toml]
    #[arg(long, env = "TASKBOARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database; overrides `storage.path` [default: ~/.taskboard/taskboard.db]
    #[arg(long, env = "TASKBOARD_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Persistence variant; overrides `storage.backend`
    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    /// Admin PIN for mutating commands (prompted on stdin when omitted)
    #[arg(long, env = "TASKBOARD_PIN", hide_env_values = true, global = true)]
    pub pin: Option<String>,

    /// Person whose tasks are shown (id or name) [default: first person]
    #[arg(long, global = true)]
    pub person: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    Local,
    Remote,
}

impl From<BackendArg> for BackendKind {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Local => BackendKind::Local,
            BackendArg::Remote => BackendKind::Remote,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage people
    Person {
        #[command(subcommand)]
        command: PersonCommand,
    },

    /// Manage the selected person's tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Show completion statistics for the selected person
    Stats {
        /// Only count tasks due in this month (YYYY-MM)
        #[arg(long)]
        month: Option<MonthFilter>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PersonCommand {
    /// Add a person
    Add {
        /// Display name
        name: String,
    },

    /// Rename a person
    Rename {
        /// Person id or name
        person: String,
        /// New display name
        name: String,
    },

    /// Replace the emails tasks may be attributed to
    Emails {
        /// Person id or name
        person: String,
        /// Email addresses (none clears the list)
        emails: Vec<String>,
    },

    /// Remove a person and all of their tasks
    Rm {
        /// Person id or name
        person: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List people
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one person with their task summary
    Select {
        /// Person id or name
        person: String,
    },
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a task
    Add {
        /// Task name
        name: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Task description
        #[arg(short, long)]
        desc: Option<String>,
        /// Attribute the task to one of the person's emails
        #[arg(long)]
        email: Option<String>,
    },

    /// List tasks
    List {
        /// Show full descriptions
        #[arg(long)]
        full: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a task done
    Done {
        /// Task id, id prefix or name
        task: String,
    },

    /// Expand or collapse a task description
    Toggle {
        /// Task id, id prefix or name
        task: String,
    },

    /// Edit a task
    Update {
        /// Task id, id prefix or name
        task: String,
        /// Rename the task
        #[arg(short = 'r', long)]
        name: Option<String>,
        /// New description
        #[arg(short, long, conflicts_with = "clear_desc")]
        desc: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear_desc: bool,
        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// New attribution email
        #[arg(long, conflicts_with = "clear_email")]
        email: Option<String>,
        /// Remove the attribution email
        #[arg(long)]
        clear_email: bool,
        /// Mark the task as not done again
        #[arg(long)]
        reopen: bool,
    },

    /// Remove a task
    Rm {
        /// Task id, id prefix or name
        task: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

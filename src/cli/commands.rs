use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tl", about = concat!("[x] tasklist v", env!("CARGO_PKG_VERSION"), " - a personal task list"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory (default: $TASKLIST_DIR or ~/.tasklist)
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to the top of the list
    Add(AddArgs),
    /// Edit a task (unspecified fields keep their values)
    Edit(EditArgs),
    /// Toggle a task between pending and completed
    Toggle(IdArg),
    /// Delete a task
    Rm(IdArg),
    /// List tasks
    List(ListArgs),
    /// Show task details
    Show(IdArg),
    /// Show or toggle the theme
    Theme(ThemeArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Due date: YYYY-MM-DD, "YYYY-MM-DD HH:MM" or RFC 3339
    #[arg(long)]
    pub due: Option<String>,
    /// Priority: low, medium, high
    #[arg(long, short = 'p', default_value = "medium")]
    pub priority: String,
    /// Free-form notes
    #[arg(long, short = 'n')]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID (or unique prefix)
    pub id: String,
    /// New title
    #[arg(long, short = 't')]
    pub title: Option<String>,
    /// New due date
    #[arg(long, conflicts_with = "no_due")]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(long)]
    pub no_due: bool,
    /// New priority
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
    /// New notes
    #[arg(long, short = 'n', conflicts_with = "no_notes")]
    pub notes: Option<String>,
    /// Remove the notes
    #[arg(long)]
    pub no_notes: bool,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID (or unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Which tasks to show: all, completed, pending
    #[arg(long, short = 'f', default_value = "all")]
    pub filter: String,
    /// Case-insensitive search over titles and notes
    #[arg(long, short = 's', default_value = "")]
    pub search: String,
}

#[derive(Args)]
pub struct ThemeArgs {
    #[arg(value_enum, default_value_t = ThemeAction::Show)]
    pub action: ThemeAction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeAction {
    Show,
    Toggle,
}

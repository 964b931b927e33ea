mod theme;
pub use theme::cmd_theme;

use std::path::PathBuf;

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::logging;
use crate::io::store::DirStore;
use crate::model::config::AppConfig;
use crate::model::task::{Priority, TaskDraft};
use crate::ops::clock::SystemClock;
use crate::ops::codec::parse_due_date;
use crate::ops::session::{Feedback, Session};
use crate::ops::task_store::TaskStore;
use crate::ops::view::Filter;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved data directory and config, shared by the CLI and the TUI
pub struct Context {
    pub data_dir: PathBuf,
    pub config: AppConfig,
}

/// Resolve the data directory, read config and start file logging.
/// A logger that cannot start is reported and otherwise ignored.
pub fn prepare(cli: &Cli) -> Result<Context, Box<dyn std::error::Error>> {
    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref())?;
    let config = config_io::read_config(&data_dir)?;

    let started = logging::effective_level(cli.log_level.as_deref(), &config.log.level)
        .and_then(|level| logging::init_logging(level, &data_dir));
    if let Err(e) = started {
        eprintln!("warning: logging disabled: {}", e);
    }

    Ok(Context { data_dir, config })
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(command: Commands, json: bool, ctx: &Context) -> CmdResult {
    match command {
        // Read commands
        Commands::List(args) => cmd_list(args, json, ctx),
        Commands::Show(args) => cmd_show(args, json, ctx),
        Commands::Theme(args) => cmd_theme(args, json, ctx),

        // Write commands
        Commands::Add(args) => cmd_add(args, ctx),
        Commands::Edit(args) => cmd_edit(args, ctx),
        Commands::Toggle(args) => cmd_toggle(args, ctx),
        Commands::Rm(args) => cmd_rm(args, ctx),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_session(ctx: &Context) -> Result<Session, Box<dyn std::error::Error>> {
    let store = DirStore::open(&ctx.data_dir)?;
    Ok(Session::new(TaskStore::load_all(
        Box::new(store),
        Box::new(SystemClock),
    )))
}

fn parse_priority(s: &str) -> Result<Priority, Box<dyn std::error::Error>> {
    Ok(s.parse::<Priority>()?)
}

fn parse_due(s: &str) -> Result<Option<chrono::DateTime<chrono::Utc>>, Box<dyn std::error::Error>> {
    if s.trim().is_empty() {
        return Ok(None);
    }
    parse_due_date(s)
        .map(Some)
        .ok_or_else(|| format!("invalid due date '{}' (try YYYY-MM-DD or \"YYYY-MM-DD HH:MM\")", s).into())
}

/// Turn an error feedback into a command failure, and surface a failed write
fn finish(session: &mut Session, feedback: Feedback) -> Result<Feedback, Box<dyn std::error::Error>> {
    if feedback.is_error() {
        return Err(feedback.message.text.into());
    }
    if let Some(e) = session.store_mut().take_persist_error() {
        return Err(e.into());
    }
    Ok(feedback)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool, ctx: &Context) -> CmdResult {
    let filter: Filter = args.filter.parse()?;
    let mut session = open_session(ctx)?;
    session.set_filter(filter);
    session.set_search(args.search.clone());
    let projection = session.view();

    if json {
        let out = projection_to_json(&projection, filter, &args.search);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_list(&projection, &Local::now()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(args: IdArg, json: bool, ctx: &Context) -> CmdResult {
    let session = open_session(ctx)?;
    let id = session.store().resolve_id(&args.id)?;
    let task = session
        .store()
        .get(&id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        for line in format_task_detail(task, &Local::now()) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
//
// The task store locks the data directory around each mutation and picks
// up whatever another process wrote before applying its own change.
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, ctx: &Context) -> CmdResult {
    let mut session = open_session(ctx)?;

    let draft = TaskDraft {
        title: args.title,
        due_date: match args.due.as_deref() {
            Some(s) => parse_due(s)?,
            None => None,
        },
        priority: parse_priority(&args.priority)?,
        notes: args.notes,
    };
    let feedback = session.add(draft);
    finish(&mut session, feedback)?;

    // New tasks go to the top
    if let Some(task) = session.store().tasks().first() {
        println!("{}", task.id);
    }
    Ok(())
}

fn cmd_edit(args: EditArgs, ctx: &Context) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = session.store().resolve_id(&args.id)?;
    let current = session
        .store()
        .get(&id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;

    let mut draft = TaskDraft::from_task(current);
    if let Some(title) = args.title {
        draft.title = title;
    }
    if args.no_due {
        draft.due_date = None;
    } else if let Some(due) = args.due.as_deref() {
        draft.due_date = parse_due(due)?;
    }
    if let Some(priority) = args.priority.as_deref() {
        draft.priority = parse_priority(priority)?;
    }
    if args.no_notes {
        draft.notes = None;
    } else if let Some(notes) = args.notes {
        draft.notes = Some(notes);
    }

    let feedback = session.update(&id, draft);
    let feedback = finish(&mut session, feedback)?;
    println!("{}", feedback.message.text);
    Ok(())
}

fn cmd_toggle(args: IdArg, ctx: &Context) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = session.store().resolve_id(&args.id)?;
    let feedback = session.toggle(&id);
    let feedback = finish(&mut session, feedback)?;
    println!("{}", feedback.message.text);
    Ok(())
}

fn cmd_rm(args: IdArg, ctx: &Context) -> CmdResult {
    let mut session = open_session(ctx)?;
    let id = session.store().resolve_id(&args.id)?;
    let title = session
        .store()
        .get(&id)
        .map(|t| t.title.clone())
        .unwrap_or_default();
    let feedback = session.delete(&id);
    let feedback = finish(&mut session, feedback)?;
    println!("{}: {}", feedback.message.text, title);
    Ok(())
}


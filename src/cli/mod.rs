#![forbid(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, Subcommand};
use time::Date;

use crate::board::form::{self, TaskForm};
use crate::board::{self, Board, Column, Priority, Task, TaskPatch};
use crate::calendar::{self, Calendar, DAYS_PER_WEEK};
use crate::catalog::{Catalog, TypeFlag};
use crate::comments::{self, CommentThread};
use crate::config::{self, Config, DateFormat};
use crate::error::WeekboardError;
use crate::logging;
use crate::output::table::Table;
use crate::store::FileStore;
use crate::tui;

#[derive(Debug, Parser)]
#[command(
    name = "weekboard",
    version,
    about = "Kanban board with a weekly calendar, stored locally"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the board
    Board(BoardArgs),
    Column(ColumnArgs),
    Task(TaskArgs),
    /// Show or edit the weekly calendar
    #[command(alias = "cal")]
    Calendar(CalendarArgs),
    /// Manage task types
    Types(TypesArgs),
    Comment(CommentArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
    /// Interactive board and calendar
    Tui,
    Version,
}

#[derive(Debug, Parser)]
pub struct BoardArgs {
    /// Show descriptions and schedule details
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    /// Output in JSON format
    #[arg(long = "json")]
    pub json: bool,
    /// Output as CSV
    #[arg(long = "csv")]
    pub csv: bool,
}

#[derive(Debug, Parser)]
pub struct ColumnArgs {
    #[command(subcommand)]
    pub cmd: ColumnCmd,
}

#[derive(Debug, Subcommand)]
pub enum ColumnCmd {
    Add(ColumnAddArgs),
    #[command(alias = "rm")]
    Remove(ColumnRefArgs),
    Rename(ColumnRenameArgs),
    Move(ColumnMoveArgs),
}

#[derive(Debug, Parser)]
pub struct ColumnAddArgs {
    pub title: String,
}

#[derive(Debug, Parser)]
pub struct ColumnRefArgs {
    /// Column id or title
    pub column: String,
}

#[derive(Debug, Parser)]
pub struct ColumnRenameArgs {
    /// Column id or title
    pub column: String,
    pub title: String,
}

#[derive(Debug, Parser)]
pub struct ColumnMoveArgs {
    /// Column id or title
    pub column: String,
    /// Zero-based position on the board
    pub position: usize,
}

#[derive(Debug, Parser)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub cmd: TaskCmd,
}

#[derive(Debug, Subcommand)]
pub enum TaskCmd {
    Add(TaskAddArgs),
    Edit(TaskEditArgs),
    #[command(alias = "rm")]
    Remove(TaskRefArgs),
    Show(TaskRefArgs),
    Move(TaskMoveArgs),
    /// Add tasks from a YAML file
    Import(TaskImportArgs),
}

#[derive(Debug, Parser)]
pub struct TaskAddArgs {
    pub title: String,
    /// Column id or title (default: first column)
    #[arg(short = 'c', long = "column")]
    pub column: Option<String>,
    #[arg(short = 'd', long = "description", default_value = "")]
    pub description: String,
    #[arg(short = 'p', long = "priority", default_value = "medium")]
    pub priority: Priority,
    /// Due date (YYYY-MM-DD)
    #[arg(long = "due")]
    pub due: String,
    #[arg(short = 'a', long = "assignee", default_value = "")]
    pub assignee: String,
    /// Estimated time in hours
    #[arg(long = "hours")]
    pub hours: Option<f64>,
    /// Calendar date, if different from the due date (YYYY-MM-DD)
    #[arg(long = "schedule", default_value = "")]
    pub schedule: String,
    /// Task type id
    #[arg(short = 't', long = "type", default_value = "")]
    pub task_type: String,
}

#[derive(Debug, Parser)]
pub struct TaskEditArgs {
    /// Task id or unique id prefix
    pub task: String,
    #[arg(long = "title")]
    pub title: Option<String>,
    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,
    #[arg(short = 'p', long = "priority")]
    pub priority: Option<Priority>,
    #[arg(long = "due")]
    pub due: Option<String>,
    #[arg(short = 'a', long = "assignee", conflicts_with = "clear_assignee")]
    pub assignee: Option<String>,
    #[arg(long = "clear-assignee")]
    pub clear_assignee: bool,
    #[arg(long = "hours", conflicts_with = "clear_hours")]
    pub hours: Option<f64>,
    #[arg(long = "clear-hours")]
    pub clear_hours: bool,
    #[arg(long = "schedule", conflicts_with = "clear_schedule")]
    pub schedule: Option<String>,
    #[arg(long = "clear-schedule")]
    pub clear_schedule: bool,
    #[arg(short = 't', long = "type")]
    pub task_type: Option<String>,
    /// Move to this column (appended at the end)
    #[arg(short = 'c', long = "column")]
    pub column: Option<String>,
}

#[derive(Debug, Parser)]
pub struct TaskRefArgs {
    /// Task id or unique id prefix
    pub task: String,
}

#[derive(Debug, Parser)]
pub struct TaskMoveArgs {
    /// Task id or unique id prefix
    pub task: String,
    /// Destination column id or title (default: current column)
    #[arg(short = 'c', long = "column")]
    pub column: Option<String>,
    /// Zero-based position in the destination (default: end)
    #[arg(short = 'i', long = "index")]
    pub index: Option<usize>,
}

#[derive(Debug, Parser)]
pub struct TaskImportArgs {
    pub file: String,
}

#[derive(Debug, Parser)]
#[command(args_conflicts_with_subcommands = true)]
pub struct CalendarArgs {
    /// Any date inside the week to show (default: today)
    #[arg(long = "date")]
    pub date: Option<String>,
    /// Weeks to move from that date (negative for earlier weeks)
    #[arg(short = 'w', long = "week-offset", default_value_t = 0, allow_negative_numbers = true)]
    pub week_offset: i64,
    #[arg(long = "json")]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Option<CalendarCmd>,
}

#[derive(Debug, Subcommand)]
pub enum CalendarCmd {
    /// Move a task to another day
    Move(CalendarMoveArgs),
}

#[derive(Debug, Parser)]
pub struct CalendarMoveArgs {
    /// Task id or unique id prefix
    pub task: String,
    /// Day index 0-6 (Monday first), weekday name, or a YYYY-MM-DD date
    pub day: String,
    /// Any date inside the target week (default: today)
    #[arg(long = "date")]
    pub date: Option<String>,
}

#[derive(Debug, Parser)]
pub struct TypesArgs {
    #[command(subcommand)]
    pub cmd: TypesCmd,
}

#[derive(Debug, Subcommand)]
pub enum TypesCmd {
    List(TypesListArgs),
    Rename(TypesRenameArgs),
    Set(TypesSetArgs),
    /// Restore the built-in types
    Reset,
}

#[derive(Debug, Parser)]
pub struct TypesListArgs {
    /// Only types usable for tasks
    #[arg(long = "tasks", conflicts_with = "events")]
    pub tasks: bool,
    /// Only types usable for calendar events
    #[arg(long = "events")]
    pub events: bool,
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct TypesRenameArgs {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Parser)]
pub struct TypesSetArgs {
    pub id: String,
    /// enabled, forTasks or forEvents
    pub flag: TypeFlag,
    /// true or false
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct CommentArgs {
    #[command(subcommand)]
    pub cmd: CommentCmd,
}

#[derive(Debug, Subcommand)]
pub enum CommentCmd {
    List(CommentListArgs),
    Add(CommentAddArgs),
    Edit(CommentEditArgs),
    #[command(alias = "rm")]
    Remove(CommentRefArgs),
    /// Like or unlike a comment
    Like(CommentRefArgs),
}

#[derive(Debug, Parser)]
pub struct CommentListArgs {
    pub task: String,
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CommentAddArgs {
    pub task: String,
    pub text: String,
    #[arg(long = "author", default_value = "")]
    pub author: String,
}

#[derive(Debug, Parser)]
pub struct CommentEditArgs {
    pub task: String,
    pub comment: String,
    pub text: String,
}

#[derive(Debug, Parser)]
pub struct CommentRefArgs {
    pub task: String,
    pub comment: String,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    List,
    Set(ConfigSetArgs),
    Get(ConfigGetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

/// Loaded configuration plus the store it points at.
#[derive(Debug)]
pub struct Workspace {
    pub cfg: Config,
    pub store: FileStore,
}

impl Workspace {
    pub fn open(cfg: Config) -> anyhow::Result<Self> {
        let dir = cfg.data_dir()?;
        let store = FileStore::new(dir);
        store.ensure_dir()?;
        Ok(Self { cfg, store })
    }

    pub fn board(&self) -> anyhow::Result<Board<&FileStore>> {
        Board::load_or_seed(&self.store, &self.cfg.board.default_columns)
    }

    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        Catalog::load(&self.store)
    }
}

pub fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let loaded = config::load();
    let level = loaded
        .as_ref()
        .map_or("warn", |(cfg, _doc, _paths)| cfg.log.level.as_str());
    // The terminal UI owns the screen, so its records go to the data dir.
    let interactive = match &cli.cmd {
        Some(Commands::Tui) => true,
        None => tui::is_tty(),
        Some(_) => false,
    };
    let log_file = match &loaded {
        Ok((cfg, _doc, _paths)) if interactive => cfg
            .data_dir()
            .ok()
            .map(|dir| dir.join(logging::LOG_FILE)),
        _ => None,
    };
    match log_file {
        Some(path) => {
            if let Err(err) = logging::init_to_file(level, &path) {
                logging::init(level);
                tracing::warn!("{err:#}; logging to stderr");
            }
        }
        None => logging::init(level),
    }

    // These work without a data directory or a valid config file.
    let cmd = match cli.cmd {
        Some(Commands::Completion(args)) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "weekboard", &mut std::io::stdout());
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Version) => return Ok(cmd_version()),
        Some(Commands::Config(args)) => return cmd_config(args),
        other => other,
    };

    let (cfg, _doc, _paths) = loaded?;
    let ws = Workspace::open(cfg)?;

    match cmd {
        None => cmd_default(&ws)?,
        Some(Commands::Board(args)) => cmd_board(&ws, &args)?,
        Some(Commands::Column(args)) => cmd_column(&ws, args)?,
        Some(Commands::Task(args)) => cmd_task(&ws, args)?,
        Some(Commands::Calendar(args)) => cmd_calendar(&ws, args)?,
        Some(Commands::Types(args)) => cmd_types(&ws, args)?,
        Some(Commands::Comment(args)) => cmd_comment(&ws, args)?,
        Some(Commands::Tui) => {
            if !tui::is_tty() {
                anyhow::bail!("the interactive view requires a TTY");
            }
            tui::app::run(&ws.cfg, &ws.store)?;
        }
        Some(Commands::Completion(_) | Commands::Version | Commands::Config(_)) => {}
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<ExitCode> {
    match args.cmd {
        ConfigCmd::List => {
            print!("{}", config::list_resolved_toml()?);
            Ok(ExitCode::SUCCESS)
        }
        ConfigCmd::Set(set) => {
            config::set_value_string(&set.key, &set.value)?;
            println!("Set {} = {}", set.key, set.value);
            Ok(ExitCode::SUCCESS)
        }
        ConfigCmd::Get(get) => match config::get_value_string(&get.key)? {
            Some(v) => {
                println!("{v}");
                Ok(ExitCode::SUCCESS)
            }
            None => anyhow::bail!(
                "configuration key '{}' not found - use 'weekboard config list' to see available keys",
                get.key
            ),
        },
    }
}

fn cmd_default(ws: &Workspace) -> anyhow::Result<()> {
    if tui::is_tty() {
        return tui::app::run(&ws.cfg, &ws.store);
    }
    let args = BoardArgs {
        verbose: false,
        json: false,
        csv: false,
    };
    cmd_board(ws, &args)
}

fn cmd_board(ws: &Workspace, args: &BoardArgs) -> anyhow::Result<()> {
    let board = ws.board()?;
    let catalog = ws.catalog()?;

    if args.json {
        let mut out = serde_json::to_string_pretty(board.columns())?;
        out.push('\n');
        print!("{out}");
        return Ok(());
    }

    if args.csv {
        let mut t = Table::new([
            "column", "task_id", "title", "priority", "due_date", "schedule_date", "type",
            "assignee", "hours",
        ]);
        for column in board.columns() {
            for task in &column.tasks {
                t.row([
                    column.title.clone(),
                    task.id.clone(),
                    task.title.clone(),
                    task.priority.to_string(),
                    task.due_date.clone(),
                    task.schedule_date.clone().unwrap_or_default(),
                    task.type_id().to_owned(),
                    task.assignee.clone().unwrap_or_default(),
                    task.estimated_time_hours
                        .map(|h| h.to_string())
                        .unwrap_or_default(),
                ]);
            }
        }
        t.write_csv()?;
        return Ok(());
    }

    if board.columns().is_empty() {
        println!("No columns. Add one with 'weekboard column add <title>'.");
        return Ok(());
    }

    for (i, column) in board.columns().iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{} ({}) - {} task(s)", column.title, column.id, column.tasks.len());
        if column.tasks.is_empty() {
            println!("  (empty)");
            continue;
        }
        print_task_table(&ws.cfg, &catalog, &column.tasks, args.verbose)?;
    }
    Ok(())
}

fn print_task_table(
    cfg: &Config,
    catalog: &Catalog,
    tasks: &[Task],
    verbose: bool,
) -> anyhow::Result<()> {
    let mut headers = vec!["ID", "TITLE", "PRIORITY", "DUE", "TYPE", "WHO"];
    if verbose {
        headers.extend(["SCHEDULED", "HOURS", "DESCRIPTION"]);
    }
    let mut t = Table::new(headers).max_cell_width(if verbose { 60 } else { 40 });
    for task in tasks {
        let mut priority = task.priority.to_string();
        if cfg.ui.icons {
            priority = format!("{} {priority}", priority_icon(task.priority));
        }
        let mut row = vec![
            task.id.clone(),
            task.title.clone(),
            priority,
            display_date(cfg, &task.due_date),
            catalog.resolve(task.task_type_id.as_deref()).name.clone(),
            comments::initials(task.assignee.as_deref()),
        ];
        if verbose {
            row.push(
                task.schedule_date
                    .as_deref()
                    .map_or_else(|| "-".to_owned(), |d| display_date(cfg, d)),
            );
            row.push(
                task.estimated_time_hours
                    .map_or_else(|| "-".to_owned(), |h| format!("{h}h")),
            );
            row.push(if task.description.trim().is_empty() {
                "-".to_owned()
            } else {
                task.description.clone()
            });
        }
        t.row(row);
    }
    t.print()?;
    Ok(())
}

fn cmd_column(ws: &Workspace, args: ColumnArgs) -> anyhow::Result<()> {
    let mut board = ws.board()?;
    match args.cmd {
        ColumnCmd::Add(a) => {
            let column = board.add_column(&a.title)?;
            println!("Column '{}' added (ID: {})", column.title, column.id);
        }
        ColumnCmd::Remove(a) => {
            let id = board::resolve_column_ref(board.columns(), &a.column)?.id.clone();
            if let Some(removed) = board.delete_column(&id)? {
                for task in &removed.tasks {
                    comments::delete_for_task(&ws.store, &task.id)?;
                }
                println!(
                    "Column '{}' removed ({} task(s) discarded)",
                    removed.title,
                    removed.tasks.len()
                );
            }
        }
        ColumnCmd::Rename(a) => {
            let id = board::resolve_column_ref(board.columns(), &a.column)?.id.clone();
            board.rename_column(&id, &a.title)?;
            println!("Column {id} renamed to '{}'", a.title);
        }
        ColumnCmd::Move(a) => {
            let from = column_index(&board, &a.column)?;
            board.move_column(from, a.position)?;
            let pos = column_index(&board, &a.column)?;
            println!("Column '{}' is now at position {pos}", board.columns()[pos].title);
        }
    }
    Ok(())
}

fn column_index(board: &Board<&FileStore>, reference: &str) -> anyhow::Result<usize> {
    let id = board::resolve_column_ref(board.columns(), reference)?.id.clone();
    board
        .columns()
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| WeekboardError::ColumnNotFound(reference.to_owned()).into())
}

fn cmd_task(ws: &Workspace, args: TaskArgs) -> anyhow::Result<()> {
    let mut board = ws.board()?;
    match args.cmd {
        TaskCmd::Add(a) => task_add(&mut board, a)?,
        TaskCmd::Edit(a) => task_edit(&mut board, a)?,
        TaskCmd::Remove(a) => {
            let (column_id, task_id) = task_location(&board, &a.task)?;
            if let Some(task) = board.delete_task(&column_id, &task_id)? {
                comments::delete_for_task(&ws.store, &task.id)?;
                println!("Task '{}' ({}) removed", task.title, task.id);
            }
        }
        TaskCmd::Show(a) => {
            let catalog = ws.catalog()?;
            let (column, task) = board::resolve_task_ref(&board, &a.task)?;
            let thread = CommentThread::load(&ws.store, &task.id)?;
            print_task_details(&ws.cfg, &catalog, column, task, thread.comments().len());
        }
        TaskCmd::Move(a) => task_move(&mut board, &a)?,
        TaskCmd::Import(a) => {
            let created = task_import(&mut board, &a.file)?;
            for (column, task) in &created {
                println!("Task '{}' ({}) added to {column}", task.title, task.id);
            }
            println!("Successfully added {} tasks from {}", created.len(), a.file);
        }
    }
    Ok(())
}

fn task_location(board: &Board<&FileStore>, reference: &str) -> anyhow::Result<(String, String)> {
    let (column, task) = board::resolve_task_ref(board, reference)?;
    Ok((column.id.clone(), task.id.clone()))
}

fn default_column_id(board: &Board<&FileStore>) -> anyhow::Result<String> {
    board
        .columns()
        .first()
        .map(|c| c.id.clone())
        .ok_or_else(|| WeekboardError::NoColumns.into())
}

fn validation_error(errors: &[form::FieldError]) -> WeekboardError {
    WeekboardError::Validation(errors.iter().map(ToString::to_string).collect())
}

fn task_add(board: &mut Board<&FileStore>, args: TaskAddArgs) -> anyhow::Result<()> {
    let column_id = match args.column.as_deref() {
        Some(c) => board::resolve_column_ref(board.columns(), c)?.id.clone(),
        None => default_column_id(board)?,
    };

    let form = TaskForm {
        title: args.title,
        description: args.description,
        priority: args.priority,
        due_date: args.due,
        assignee: args.assignee,
        estimated_time_hours: args.hours,
        schedule_date: args.schedule,
        task_type_id: args.task_type,
    };
    let draft = form::validate(&form, calendar::today()).map_err(|e| validation_error(&e))?;

    let task = board.add_task(&column_id, draft)?;
    let column = board
        .column(&column_id)
        .map_or_else(String::new, |c| c.title.clone());
    println!("Task '{}' added to {column} (ID: {})", task.title, task.id);
    println!("Due: {}, Priority: {}", task.due_date, task.priority);
    Ok(())
}

fn task_edit(board: &mut Board<&FileStore>, args: TaskEditArgs) -> anyhow::Result<()> {
    let (_, task_id) = task_location(board, &args.task)?;

    let mut errors = Vec::new();
    if let Some(title) = args.title.as_deref()
        && let Err(e) = form::check_title(title)
    {
        errors.push(e);
    }
    if let Some(description) = args.description.as_deref()
        && let Err(e) = form::check_description(description)
    {
        errors.push(e);
    }
    if let Some(due) = args.due.as_deref()
        && let Err(e) = form::check_due_date(due, calendar::today())
    {
        errors.push(e);
    }
    if let Some(schedule) = args.schedule.as_deref()
        && let Err(e) = form::check_schedule_date(schedule)
    {
        errors.push(e);
    }
    if let Err(e) = form::check_hours(args.hours) {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(validation_error(&errors).into());
    }

    let column_id = match args.column.as_deref() {
        Some(c) => Some(board::resolve_column_ref(board.columns(), c)?.id.clone()),
        None => None,
    };

    let patch = TaskPatch {
        title: args.title.map(|s| s.trim().to_owned()),
        description: args.description.map(|s| s.trim().to_owned()),
        priority: args.priority,
        due_date: args.due.map(|s| s.trim().to_owned()),
        assignee: optional_patch(args.assignee, args.clear_assignee),
        estimated_time_hours: if args.clear_hours {
            Some(None)
        } else {
            args.hours.map(Some)
        },
        schedule_date: optional_patch(args.schedule, args.clear_schedule),
        task_type_id: args.task_type.map(|s| form::non_empty(&s)),
        column_id,
    };

    match board.update_task(&task_id, &patch)? {
        Some(task) => println!("Task '{}' ({}) updated", task.title, task.id),
        None => println!("Task {task_id} no longer exists; nothing changed"),
    }
    Ok(())
}

fn optional_patch(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        return Some(None);
    }
    value.map(|v| form::non_empty(&v))
}

fn task_move(board: &mut Board<&FileStore>, args: &TaskMoveArgs) -> anyhow::Result<()> {
    let (src, task_id) = task_location(board, &args.task)?;
    let from = board
        .column(&src)
        .and_then(|c| c.position(&task_id))
        .ok_or_else(|| WeekboardError::TaskNotFound(args.task.clone()))?;
    let dst = match args.column.as_deref() {
        Some(c) => board::resolve_column_ref(board.columns(), c)?.id.clone(),
        None => src.clone(),
    };
    let to = args.index.unwrap_or(usize::MAX);

    let landed = board.transfer(&src, &dst, from, to)?;
    let title = board.column(&dst).map_or("", |c| c.title.as_str());
    match landed {
        Some(pos) => println!("Task {task_id} moved to {title} at position {pos}"),
        None => println!("Task {task_id} was not moved"),
    }
    Ok(())
}

#[derive(Debug, serde::Deserialize)]
struct TaskFile {
    version: String,
    #[serde(default)]
    column: String,
    tasks: Vec<TaskFileEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct TaskFileEntry {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: Option<String>,
    due_date: String,
    #[serde(default)]
    assignee: String,
    #[serde(default)]
    estimated_time_hours: Option<f64>,
    #[serde(default)]
    schedule_date: String,
    #[serde(default, alias = "type")]
    task_type: String,
    #[serde(default)]
    column: String,
}

/// Adds every task in a YAML task file. All entries are validated before
/// anything is written; past due dates are accepted.
fn task_import(board: &mut Board<&FileStore>, file: &str) -> anyhow::Result<Vec<(String, Task)>> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read task file: {file}"))?;
    let def: TaskFile =
        serde_yaml::from_str(&data).with_context(|| format!("failed to parse YAML: {file}"))?;

    if def.version.trim() != "1.0" {
        anyhow::bail!(
            "unsupported task file version: {} (expected 1.0)",
            def.version
        );
    }

    let default_column = if def.column.trim().is_empty() {
        default_column_id(board)?
    } else {
        board::resolve_column_ref(board.columns(), &def.column)?.id.clone()
    };

    let mut pending = Vec::new();
    for (i, entry) in def.tasks.into_iter().enumerate() {
        let priority = match entry.priority.as_deref() {
            Some(p) => p
                .parse::<Priority>()
                .map_err(|msg| anyhow::anyhow!("task #{}: priority: {msg}", i + 1))?,
            None => Priority::default(),
        };
        let column_id = if entry.column.trim().is_empty() {
            default_column.clone()
        } else {
            board::resolve_column_ref(board.columns(), &entry.column)?.id.clone()
        };
        let form = TaskForm {
            title: entry.title,
            description: entry.description,
            priority,
            due_date: entry.due_date,
            assignee: entry.assignee,
            estimated_time_hours: entry.estimated_time_hours,
            schedule_date: entry.schedule_date,
            task_type_id: entry.task_type,
        };
        let draft = form::validate(&form, Date::MIN)
            .map_err(|e| anyhow::anyhow!("task #{}: {}", i + 1, validation_error(&e)))?;
        pending.push((column_id, draft));
    }

    let mut created = Vec::new();
    for (column_id, draft) in pending {
        let task = board.add_task(&column_id, draft)?;
        let title = board
            .column(&column_id)
            .map_or_else(String::new, |c| c.title.clone());
        created.push((title, task));
    }
    Ok(created)
}

fn print_task_details(
    cfg: &Config,
    catalog: &Catalog,
    column: &Column,
    task: &Task,
    comment_count: usize,
) {
    let task_type = catalog.resolve(task.task_type_id.as_deref());
    println!("Task: {} (ID: {})", task.title, task.id);
    println!("Column: {}", column.title);
    println!("Priority: {}", task.priority);
    println!("Due: {}", display_date(cfg, &task.due_date));
    if let Some(schedule) = task.schedule_date.as_deref() {
        println!("Scheduled: {}", display_date(cfg, schedule));
    }
    println!("Type: {} ({})", task_type.name, task_type.color);
    match task.assignee.as_deref() {
        Some(who) => println!("Assignee: {who}"),
        None => println!("Assignee: {}", comments::ANONYMOUS_INITIALS),
    }
    if let Some(h) = task.estimated_time_hours {
        println!("Estimate: {h}h");
    }
    println!("Comments: {comment_count}");
    if !task.description.trim().is_empty() {
        println!("\nDescription:\n{}", task.description);
    }
}

fn cmd_calendar(ws: &Workspace, args: CalendarArgs) -> anyhow::Result<()> {
    if let Some(CalendarCmd::Move(mv)) = args.cmd {
        return calendar_move(ws, &mv);
    }

    let anchor = shift_weeks(parse_date_arg(args.date.as_deref())?, args.week_offset)?;
    // Seeds the board on first use so the calendar and board agree.
    let _ = ws.board()?;
    let cal = Calendar::new(&ws.store, anchor)?;
    let catalog = ws.catalog()?;

    if args.json {
        let out = serde_json::json!({
            "weekStart": calendar::format_date(cal.week_start()),
            "days": cal.days(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "Week of {} - {}",
        calendar::format_date(cal.week_start()),
        calendar::format_date(cal.week_end())
    );
    let labels = cal.day_labels();
    for (i, label) in labels.iter().enumerate() {
        let marker = if cal.date_of(i) == calendar::today() {
            "*"
        } else {
            " "
        };
        println!("{marker}{label}");
        for task in cal.day(i) {
            let task_type = catalog.resolve(Some(task.task_type_id.as_str()));
            println!(
                "    {} [{}] {}m  {}",
                task.title, task_type.name, task.duration_minutes, task.id
            );
        }
    }
    Ok(())
}

fn calendar_move(ws: &Workspace, args: &CalendarMoveArgs) -> anyhow::Result<()> {
    let board = ws.board()?;
    let (_, task_id) = task_location(&board, &args.task)?;

    let (anchor, day) = match calendar::parse_date(&args.day) {
        Some(date) => (date, date.weekday().number_days_from_monday() as usize),
        None => (parse_date_arg(args.date.as_deref())?, parse_day(&args.day)?),
    };

    let mut cal = Calendar::new(&ws.store, anchor)?;
    if !cal.move_task(&task_id, day)? {
        return Err(WeekboardError::TaskNotFound(args.task.clone()).into());
    }
    println!(
        "Task {task_id} moved to {}",
        calendar::format_date(cal.date_of(day))
    );
    Ok(())
}

/// Moves `date` by whole weeks; offsets past the supported date range are
/// rejected.
fn shift_weeks(date: Date, weeks: i64) -> anyhow::Result<Date> {
    const SECONDS_PER_WEEK: i64 = 7 * 86_400;
    weeks
        .checked_mul(SECONDS_PER_WEEK)
        .and_then(|secs| date.checked_add(time::Duration::seconds(secs)))
        .ok_or_else(|| anyhow::anyhow!("week offset {weeks} is out of range"))
}

fn parse_date_arg(value: Option<&str>) -> anyhow::Result<Date> {
    match value {
        Some(s) => calendar::parse_date(s)
            .ok_or_else(|| anyhow::anyhow!("invalid date '{s}' (expected YYYY-MM-DD)")),
        None => Ok(calendar::today()),
    }
}

fn parse_day(value: &str) -> anyhow::Result<usize> {
    let v = value.trim().to_ascii_lowercase();
    if let Ok(n) = v.parse::<usize>() {
        if n < DAYS_PER_WEEK {
            return Ok(n);
        }
        anyhow::bail!("day index must be between 0 and 6, got {n}");
    }
    const NAMES: [(&str, &str); DAYS_PER_WEEK] = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
    ];
    NAMES
        .iter()
        .position(|(short, long)| v == *short || v == *long)
        .ok_or_else(|| anyhow::anyhow!("unknown day '{value}'"))
}

fn cmd_types(ws: &Workspace, args: TypesArgs) -> anyhow::Result<()> {
    let mut catalog = ws.catalog()?;
    match args.cmd {
        TypesCmd::List(a) => {
            let types: Vec<_> = if a.tasks {
                catalog.list_eligible(true).cloned().collect()
            } else if a.events {
                catalog.list_eligible(false).cloned().collect()
            } else {
                catalog.types().to_vec()
            };
            if a.json {
                println!("{}", serde_json::to_string_pretty(&types)?);
                return Ok(());
            }
            let mut t = Table::new(["ID", "NAME", "COLOR", "ENABLED", "TASKS", "EVENTS"]);
            for ty in &types {
                t.row([
                    ty.id.clone(),
                    ty.name.clone(),
                    ty.color.clone(),
                    yes_no(ty.enabled).to_owned(),
                    yes_no(ty.for_tasks).to_owned(),
                    yes_no(ty.for_events).to_owned(),
                ]);
            }
            t.print()?;
        }
        TypesCmd::Rename(a) => {
            if !catalog.rename(&a.id, &a.name) {
                anyhow::bail!("unknown task type: {}", a.id);
            }
            catalog.save(&ws.store)?;
            println!("Type {} renamed to '{}'", a.id, a.name.trim());
        }
        TypesCmd::Set(a) => {
            let value = match a.value.trim() {
                "true" | "on" | "yes" => true,
                "false" | "off" | "no" => false,
                other => anyhow::bail!("expected true|false, got '{other}'"),
            };
            if !catalog.set_flag(&a.id, a.flag, value) {
                anyhow::bail!("unknown task type: {}", a.id);
            }
            catalog.save(&ws.store)?;
            println!("Set {}.{} = {value}", a.id, a.flag);
        }
        TypesCmd::Reset => {
            catalog.reset();
            catalog.save(&ws.store)?;
            println!("Task types restored to defaults");
        }
    }
    Ok(())
}

fn cmd_comment(ws: &Workspace, args: CommentArgs) -> anyhow::Result<()> {
    let board = ws.board()?;
    let task_ref = match &args.cmd {
        CommentCmd::List(a) => &a.task,
        CommentCmd::Add(a) => &a.task,
        CommentCmd::Edit(a) => &a.task,
        CommentCmd::Remove(a) | CommentCmd::Like(a) => &a.task,
    };
    let (_, task_id) = task_location(&board, task_ref)?;
    let mut thread = CommentThread::load(&ws.store, &task_id)?;

    match args.cmd {
        CommentCmd::List(a) => {
            if a.json {
                println!("{}", serde_json::to_string_pretty(thread.comments())?);
                return Ok(());
            }
            if thread.comments().is_empty() {
                println!("No comments.");
                return Ok(());
            }
            for c in thread.comments() {
                let author = if c.author.trim().is_empty() {
                    comments::ANONYMOUS_INITIALS
                } else {
                    c.author.as_str()
                };
                let heart = if c.liked { "♥" } else { "♡" };
                println!("[{}] {author} ({}) {heart} {}", c.id, c.created_at, c.likes);
                println!("    {}", c.text);
            }
        }
        CommentCmd::Add(a) => {
            if a.text.trim().is_empty() {
                anyhow::bail!("comment text must not be empty");
            }
            let c = thread.add(&a.text, &a.author)?;
            println!("Comment {} added to task {task_id}", c.id);
        }
        CommentCmd::Edit(a) => {
            thread.edit(&a.comment, &a.text)?;
            println!("Comment {} updated", a.comment);
        }
        CommentCmd::Remove(a) => {
            let c = thread.delete(&a.comment)?;
            println!("Comment {} removed", c.id);
        }
        CommentCmd::Like(a) => {
            let c = thread.toggle_like(&a.comment)?;
            let state = if c.liked { "liked" } else { "unliked" };
            println!("Comment {} {state} ({} likes)", c.id, c.likes);
        }
    }
    Ok(())
}

fn cmd_version() -> ExitCode {
    println!("weekboard version {}", env!("CARGO_PKG_VERSION"));
    println!("  rust: {}", rustc_version_runtime::version());
    println!(
        "  os/arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    ExitCode::SUCCESS
}

fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "▲",
        Priority::Medium => "■",
        Priority::Low => "▼",
    }
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

/// Formats a stored date string for display. Unparseable values are shown
/// verbatim.
fn display_date(cfg: &Config, value: &str) -> String {
    let Some(date) = calendar::parse_date(value) else {
        return value.to_owned();
    };
    match cfg.ui.date_format {
        DateFormat::Iso => calendar::format_date(date),
        DateFormat::Short => date
            .format(time::macros::format_description!("[month repr:short] [day]"))
            .unwrap_or_else(|_| calendar::format_date(date)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_arguments() {
        assert_eq!(parse_day("0").unwrap(), 0);
        assert_eq!(parse_day("6").unwrap(), 6);
        assert!(parse_day("7").is_err());
        assert_eq!(parse_day("Wed").unwrap(), 2);
        assert_eq!(parse_day("sunday").unwrap(), 6);
        assert!(parse_day("someday").is_err());
        assert!(parse_day("mo").is_err());
    }

    #[test]
    fn short_dates_fall_back_to_raw_text() {
        let mut cfg = Config::default();
        assert_eq!(display_date(&cfg, "2024-06-03T09:00:00Z"), "2024-06-03");
        cfg.ui.date_format = DateFormat::Short;
        assert_eq!(display_date(&cfg, "2024-06-03"), "Jun 03");
        assert_eq!(display_date(&cfg, "tomorrow"), "tomorrow");
    }

    #[test]
    fn cli_parses_task_add() {
        let cli = Cli::try_parse_from([
            "weekboard", "task", "add", "Write report", "--due", "2024-06-03", "-p", "high",
            "--hours", "1.5",
        ])
        .unwrap();
        let Some(Commands::Task(TaskArgs {
            cmd: TaskCmd::Add(add),
        })) = cli.cmd
        else {
            panic!("expected task add");
        };
        assert_eq!(add.priority, Priority::High);
        assert_eq!(add.hours, Some(1.5));
        assert_eq!(add.column, None);
    }

    #[test]
    fn cli_parses_negative_week_offset() {
        let cli = Cli::try_parse_from(["weekboard", "calendar", "-w", "-2"]).unwrap();
        let Some(Commands::Calendar(args)) = cli.cmd else {
            panic!("expected calendar");
        };
        assert_eq!(args.week_offset, -2);
    }

    #[test]
    fn week_offsets_past_the_date_range_are_errors() {
        let wed = time::macros::date!(2024 - 06 - 05);
        assert_eq!(shift_weeks(wed, -1).unwrap(), time::macros::date!(2024 - 05 - 29));
        assert_eq!(shift_weeks(wed, 0).unwrap(), wed);
        assert!(shift_weeks(wed, 99_999_999_999_999).is_err());
        assert!(shift_weeks(wed, i64::MAX).is_err());
        assert!(shift_weeks(wed, i64::MIN).is_err());

        let cli = Cli::try_parse_from(["weekboard", "calendar", "-w", "99999999999999"]).unwrap();
        let Some(Commands::Calendar(args)) = cli.cmd else {
            panic!("expected calendar");
        };
        assert!(shift_weeks(wed, args.week_offset).is_err());
    }

    fn seeded_store(dir: &std::path::Path) -> FileStore {
        let store = FileStore::new(dir.join("data"));
        Board::load_or_seed(&store, &["Todo".to_owned(), "Done".to_owned()]).unwrap();
        store
    }

    fn write_task_file(dir: &std::path::Path, yaml: &str) -> String {
        let path = dir.join("tasks.yaml");
        std::fs::write(&path, yaml).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn import_writes_nothing_when_one_entry_is_invalid() {
        let td = tempfile::tempdir().unwrap();
        let store = seeded_store(td.path());
        let file = write_task_file(
            td.path(),
            r#"
version: "1.0"
tasks:
  - title: Write report
    due_date: "2030-01-10"
  - title: ab
    due_date: "2030-01-11"
"#,
        );

        let mut board = Board::load(&store).unwrap();
        let err = task_import(&mut board, &file).unwrap_err();
        assert!(format!("{err:#}").contains("task #2"));
        assert_eq!(Board::load(&store).unwrap().tasks().count(), 0);
    }

    #[test]
    fn import_accepts_past_dates_and_resolves_columns_per_entry() {
        let td = tempfile::tempdir().unwrap();
        let store = seeded_store(td.path());
        let file = write_task_file(
            td.path(),
            r#"
version: "1.0"
column: done
tasks:
  - title: Archived audit
    due_date: "2020-01-01"
    priority: high
  - title: Fresh work
    due_date: "2030-01-10"
    column: Todo
    estimated_time_hours: 2.5
"#,
        );

        let mut board = Board::load(&store).unwrap();
        let created = task_import(&mut board, &file).unwrap();
        let columns: Vec<_> = created.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(columns, ["Done", "Todo"]);

        let board = Board::load(&store).unwrap();
        let (column, task) = board.find_task(&created[0].1.id).unwrap();
        assert_eq!(column.title, "Done");
        assert_eq!(task.due_date, "2020-01-01");
        assert_eq!(task.priority, Priority::High);
        let (column, task) = board.find_task(&created[1].1.id).unwrap();
        assert_eq!(column.title, "Todo");
        assert_eq!(task.estimated_time_hours, Some(2.5));
    }

    #[test]
    fn import_rejects_other_file_versions() {
        let td = tempfile::tempdir().unwrap();
        let store = seeded_store(td.path());
        let file = write_task_file(
            td.path(),
            r#"
version: "2.0"
tasks:
  - title: Write report
    due_date: "2030-01-10"
"#,
        );

        let mut board = Board::load(&store).unwrap();
        let err = task_import(&mut board, &file).unwrap_err();
        assert!(err.to_string().contains("unsupported task file version: 2.0"));
        assert_eq!(Board::load(&store).unwrap().tasks().count(), 0);
    }

    #[test]
    fn edit_clear_flags_remove_optional_fields() {
        let td = tempfile::tempdir().unwrap();
        let store = seeded_store(td.path());
        let mut board = Board::load(&store).unwrap();
        let todo = board.columns()[0].id.clone();
        let task = board
            .add_task(
                &todo,
                board::TaskDraft {
                    title: "Plan sprint".to_owned(),
                    due_date: "2030-01-10".to_owned(),
                    assignee: Some("Ana Lima".to_owned()),
                    estimated_time_hours: Some(3.0),
                    schedule_date: Some("2030-01-08".to_owned()),
                    ..board::TaskDraft::default()
                },
            )
            .unwrap();

        let args = TaskEditArgs {
            task: task.id[..8].to_owned(),
            title: Some("  Plan sprint 12 ".to_owned()),
            description: None,
            priority: Some(Priority::Low),
            due: None,
            assignee: None,
            clear_assignee: true,
            hours: None,
            clear_hours: true,
            schedule: None,
            clear_schedule: true,
            task_type: None,
            column: Some("done".to_owned()),
        };
        task_edit(&mut board, args).unwrap();

        let board = Board::load(&store).unwrap();
        let (column, edited) = board.find_task(&task.id).unwrap();
        assert_eq!(column.title, "Done");
        assert_eq!(edited.title, "Plan sprint 12");
        assert_eq!(edited.priority, Priority::Low);
        assert_eq!(edited.due_date, "2030-01-10");
        assert_eq!(edited.assignee, None);
        assert_eq!(edited.estimated_time_hours, None);
        assert_eq!(edited.schedule_date, None);
    }

    #[test]
    fn calendar_move_to_a_date_in_another_week() {
        let td = tempfile::tempdir().unwrap();
        let store = seeded_store(td.path());
        let mut board = Board::load(&store).unwrap();
        let todo = board.columns()[0].id.clone();
        let task = board
            .add_task(
                &todo,
                board::TaskDraft {
                    title: "Report".to_owned(),
                    due_date: "2024-06-03".to_owned(),
                    ..board::TaskDraft::default()
                },
            )
            .unwrap();
        drop(board);

        let ws = Workspace {
            cfg: Config::default(),
            store,
        };
        let args = CalendarMoveArgs {
            task: task.id.clone(),
            day: "2024-06-12".to_owned(),
            date: Some("2020-01-01".to_owned()),
        };
        calendar_move(&ws, &args).unwrap();

        let board = Board::load(&ws.store).unwrap();
        let (_, moved) = board.find_task(&task.id).unwrap();
        assert_eq!(moved.due_date, "2024-06-12");
        assert_eq!(moved.schedule_date, None);
    }
}

#![forbid(unsafe_code)]

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};

use crate::board::form::{self, TaskForm};
use crate::board::{Board, Priority, Task};
use crate::calendar::{self, Calendar, DAYS_PER_WEEK};
use crate::catalog::Catalog;
use crate::comments;
use crate::config::Config;
use crate::store::{FileStore, Storage};
use crate::tui::{self, TerminalGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TabId {
    Board,
    Calendar,
}

impl TabId {
    const ALL: [TabId; 2] = [TabId::Board, TabId::Calendar];

    fn next(self) -> Self {
        match self {
            TabId::Board => TabId::Calendar,
            TabId::Calendar => TabId::Board,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    NewColumn,
    NewTask,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NewTaskField {
    Title,
    Due,
}

#[derive(Debug, Clone)]
enum ConfirmAction {
    DeleteTask {
        column_id: String,
        task_id: String,
        title: String,
    },
    DeleteColumn {
        column_id: String,
        title: String,
    },
}

#[derive(Debug, Clone, Default)]
struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    fn new(initial: impl Into<String>) -> Self {
        let text = initial.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    fn as_str(&self) -> &str {
        &self.text
    }

    fn insert_char(&mut self, c: char) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let cur = self.cursor.min(chars.len());
        chars.insert(cur, c);
        self.text = chars.into_iter().collect();
        self.cursor = cur + 1;
    }

    fn backspace(&mut self) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let cur = self.cursor.min(chars.len());
        if cur == 0 {
            return;
        }
        chars.remove(cur - 1);
        self.text = chars.into_iter().collect();
        self.cursor = cur - 1;
    }

    fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }
}

struct App<'a, S> {
    cfg: &'a Config,
    board: Board<S>,
    calendar: Calendar<S>,
    catalog: Catalog,

    tab: TabId,
    mode: Mode,
    column: usize,
    task: usize,
    day: usize,
    day_task: usize,

    title_input: TextInput,
    due_input: TextInput,
    task_field: NewTaskField,
    confirm: Option<ConfirmAction>,

    toast: Option<String>,
    last_error: Option<String>,
    should_quit: bool,
}

pub fn run(cfg: &Config, store: &FileStore) -> anyhow::Result<()> {
    let board = Board::load_or_seed(store, &cfg.board.default_columns)?;
    let calendar = Calendar::new(store, calendar::today())?;
    let catalog = Catalog::load(store)?;
    let mut app = App::new(cfg, board, calendar, catalog);

    let terminal = tui::init_terminal()?;
    let mut guard = TerminalGuard::new(terminal);

    loop {
        {
            let Some(terminal) = guard.terminal_mut() else {
                anyhow::bail!("terminal unavailable");
            };
            terminal.draw(|f| draw(f, &app))?;
        }

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }

    Ok(())
}

impl<'a, S: Storage + Copy> App<'a, S> {
    fn new(cfg: &'a Config, board: Board<S>, calendar: Calendar<S>, catalog: Catalog) -> Self {
        let day = usize::from(calendar.selected_date().weekday().number_days_from_monday());
        Self {
            cfg,
            board,
            calendar,
            catalog,
            tab: TabId::Board,
            mode: Mode::Normal,
            column: 0,
            task: 0,
            day,
            day_task: 0,
            title_input: TextInput::default(),
            due_input: TextInput::default(),
            task_field: NewTaskField::Title,
            confirm: None,
            toast: None,
            last_error: None,
            should_quit: false,
        }
    }

    fn selected_task(&self) -> Option<(&str, &Task)> {
        let column = self.board.columns().get(self.column)?;
        let task = column.tasks.get(self.task)?;
        Some((column.id.as_str(), task))
    }

    fn clamp_selection(&mut self) {
        let columns = self.board.columns();
        self.column = self.column.min(columns.len().saturating_sub(1));
        let tasks = columns.get(self.column).map_or(0, |c| c.tasks.len());
        self.task = self.task.min(tasks.saturating_sub(1));
        self.day = self.day.min(DAYS_PER_WEEK - 1);
        self.day_task = self
            .day_task
            .min(self.calendar.day(self.day).len().saturating_sub(1));
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        let result = match self.mode {
            Mode::NewColumn => self.handle_new_column_key(key),
            Mode::NewTask => self.handle_new_task_key(key),
            Mode::Confirm => self.handle_confirm_key(key),
            Mode::Normal => {
                self.toast = None;
                self.last_error = None;
                self.handle_normal_key(key)
            }
        };
        if let Err(e) = result {
            self.last_error = Some(format!("{e:#}"));
        }
        self.clamp_selection();
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = self.tab.next();
                Ok(())
            }
            KeyCode::Char('1') => {
                self.tab = TabId::Board;
                Ok(())
            }
            KeyCode::Char('2') => {
                self.tab = TabId::Calendar;
                Ok(())
            }
            KeyCode::Char('r') => {
                self.board.reload()?;
                self.calendar.refresh()?;
                self.toast = Some("Reloaded".to_owned());
                Ok(())
            }
            _ => match self.tab {
                TabId::Board => self.handle_board_key(key),
                TabId::Calendar => self.handle_calendar_key(key),
            },
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.column = self.column.saturating_sub(1),
            KeyCode::Char('l') | KeyCode::Right => self.column += 1,
            KeyCode::Char('j') | KeyCode::Down => self.task += 1,
            KeyCode::Char('k') | KeyCode::Up => self.task = self.task.saturating_sub(1),
            KeyCode::Char('H') => self.transfer_selected(-1)?,
            KeyCode::Char('L') => self.transfer_selected(1)?,
            KeyCode::Char('J') => self.reorder_selected(1)?,
            KeyCode::Char('K') => self.reorder_selected(-1)?,
            KeyCode::Char('n') => {
                self.title_input = TextInput::new("");
                self.mode = Mode::NewColumn;
            }
            KeyCode::Char('a') => {
                if self.board.columns().is_empty() {
                    self.last_error = Some("add a column first (n)".to_owned());
                } else {
                    self.title_input = TextInput::new("");
                    self.due_input = TextInput::new(calendar::format_date(calendar::today()));
                    self.task_field = NewTaskField::Title;
                    self.mode = Mode::NewTask;
                }
            }
            KeyCode::Char('d') => {
                if let Some((column_id, task)) = self.selected_task() {
                    self.confirm = Some(ConfirmAction::DeleteTask {
                        column_id: column_id.to_owned(),
                        task_id: task.id.clone(),
                        title: task.title.clone(),
                    });
                    self.mode = Mode::Confirm;
                }
            }
            KeyCode::Char('D') => {
                if let Some(column) = self.board.columns().get(self.column) {
                    self.confirm = Some(ConfirmAction::DeleteColumn {
                        column_id: column.id.clone(),
                        title: column.title.clone(),
                    });
                    self.mode = Mode::Confirm;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn transfer_selected(&mut self, delta: isize) -> anyhow::Result<()> {
        let columns = self.board.columns();
        let Some(target) = self.column.checked_add_signed(delta) else {
            return Ok(());
        };
        let (Some(src), Some(dst)) = (columns.get(self.column), columns.get(target)) else {
            return Ok(());
        };
        if src.tasks.is_empty() {
            return Ok(());
        }
        let (src_id, dst_id) = (src.id.clone(), dst.id.clone());

        if let Some(pos) = self.board.transfer(&src_id, &dst_id, self.task, usize::MAX)? {
            self.column = target;
            self.task = pos;
        }
        self.calendar.refresh()
    }

    fn reorder_selected(&mut self, delta: isize) -> anyhow::Result<()> {
        let Some(column) = self.board.columns().get(self.column) else {
            return Ok(());
        };
        let Some(to) = self.task.checked_add_signed(delta) else {
            return Ok(());
        };
        if to >= column.tasks.len() {
            return Ok(());
        }
        let column_id = column.id.clone();
        if self.board.reorder(&column_id, self.task, to)? {
            self.task = to;
        }
        self.calendar.refresh()
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.day = self.day.saturating_sub(1),
            KeyCode::Char('l') | KeyCode::Right => self.day += 1,
            KeyCode::Char('j') | KeyCode::Down => self.day_task += 1,
            KeyCode::Char('k') | KeyCode::Up => self.day_task = self.day_task.saturating_sub(1),
            KeyCode::Char('H') => self.move_to_day(-1)?,
            KeyCode::Char('L') => self.move_to_day(1)?,
            KeyCode::Char('J') => self.reorder_day(1),
            KeyCode::Char('K') => self.reorder_day(-1),
            KeyCode::Char('[') => self.calendar.previous_week()?,
            KeyCode::Char(']') => self.calendar.next_week()?,
            KeyCode::Char('t') => {
                let today = calendar::today();
                self.calendar.go_to_today(today)?;
                self.day = usize::from(today.weekday().number_days_from_monday());
                self.day_task = 0;
            }
            _ => {}
        }
        Ok(())
    }

    fn move_to_day(&mut self, delta: isize) -> anyhow::Result<()> {
        let Some(task) = self.calendar.day(self.day).get(self.day_task) else {
            return Ok(());
        };
        let Some(target) = self
            .day
            .checked_add_signed(delta)
            .filter(|d| *d < DAYS_PER_WEEK)
        else {
            return Ok(());
        };
        let task_id = task.id.clone();

        if self.calendar.move_task(&task_id, target)? {
            self.board.reload()?;
            self.day = target;
            self.day_task = self
                .calendar
                .day(target)
                .iter()
                .position(|t| t.id == task_id)
                .unwrap_or(0);
        }
        Ok(())
    }

    fn reorder_day(&mut self, delta: isize) {
        let Some(to) = self.day_task.checked_add_signed(delta) else {
            return;
        };
        if to < self.calendar.day(self.day).len()
            && self.calendar.reorder_day(self.day, self.day_task, to)
        {
            self.day_task = to;
        }
    }

    fn handle_new_column_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                let title = self.title_input.as_str().trim().to_owned();
                if title.is_empty() {
                    anyhow::bail!("column title must not be empty");
                }
                let column = self.board.add_column(&title)?;
                self.mode = Mode::Normal;
                self.column = self.board.columns().len().saturating_sub(1);
                self.task = 0;
                self.toast = Some(format!("Column '{}' added", column.title));
            }
            _ => handle_text_input_key(key, &mut self.title_input),
        }
        Ok(())
    }

    fn handle_new_task_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Tab | KeyCode::BackTab => {
                self.task_field = match self.task_field {
                    NewTaskField::Title => NewTaskField::Due,
                    NewTaskField::Due => NewTaskField::Title,
                };
            }
            KeyCode::Enter if self.task_field == NewTaskField::Title => {
                self.task_field = NewTaskField::Due;
            }
            KeyCode::Enter => self.submit_new_task()?,
            _ => match self.task_field {
                NewTaskField::Title => handle_text_input_key(key, &mut self.title_input),
                NewTaskField::Due => handle_text_input_key(key, &mut self.due_input),
            },
        }
        Ok(())
    }

    fn submit_new_task(&mut self) -> anyhow::Result<()> {
        let Some(column_id) = self.board.columns().get(self.column).map(|c| c.id.clone()) else {
            self.mode = Mode::Normal;
            return Ok(());
        };
        let form = TaskForm {
            title: self.title_input.as_str().to_owned(),
            due_date: self.due_input.as_str().to_owned(),
            ..TaskForm::default()
        };
        let draft = match form::validate(&form, calendar::today()) {
            Ok(draft) => draft,
            Err(errors) => {
                let msg: Vec<String> = errors.iter().map(ToString::to_string).collect();
                self.last_error = Some(msg.join("; "));
                return Ok(());
            }
        };

        let task = self.board.add_task(&column_id, draft)?;
        self.calendar.refresh()?;
        self.mode = Mode::Normal;
        self.last_error = None;
        self.task = self
            .board
            .column(&column_id)
            .and_then(|c| c.position(&task.id))
            .unwrap_or(0);
        self.toast = Some(format!("Task '{}' added", task.title));
        Ok(())
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.mode = Mode::Normal;
                if let Some(action) = self.confirm.take() {
                    self.apply_confirmed(action)?;
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.confirm = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_confirmed(&mut self, action: ConfirmAction) -> anyhow::Result<()> {
        match action {
            ConfirmAction::DeleteTask {
                column_id,
                task_id,
                title,
            } => {
                if self.board.delete_task(&column_id, &task_id)?.is_some() {
                    comments::delete_for_task(self.board.store(), &task_id)?;
                    self.toast = Some(format!("Task '{title}' deleted"));
                }
            }
            ConfirmAction::DeleteColumn { column_id, title } => {
                if let Some(removed) = self.board.delete_column(&column_id)? {
                    for task in &removed.tasks {
                        comments::delete_for_task(self.board.store(), &task.id)?;
                    }
                    self.toast = Some(format!("Column '{title}' deleted"));
                }
            }
        }
        self.calendar.refresh()
    }
}

fn handle_text_input_key(key: KeyEvent, input: &mut TextInput) {
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Char(c) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT)
            {
                input.insert_char(c);
            }
        }
        _ => {}
    }
}

fn draw<S: Storage + Copy>(f: &mut Frame<'_>, app: &App<'_, S>) {
    let area = f.area();
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_tabs(f, root[0], app);
    match app.tab {
        TabId::Board => draw_board(f, root[1], app),
        TabId::Calendar => draw_calendar(f, root[1], app),
    }
    draw_footer(f, root[2], app);

    match app.mode {
        Mode::NewColumn => draw_new_column_popup(f, app),
        Mode::NewTask => draw_new_task_popup(f, app),
        Mode::Confirm => {
            if let Some(action) = &app.confirm {
                draw_confirm(f, action);
            }
        }
        Mode::Normal => {}
    }
}

fn draw_tabs<S: Storage + Copy>(f: &mut Frame<'_>, area: Rect, app: &App<'_, S>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let titles: Vec<Line> = TabId::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let title = match t {
                TabId::Board => format!("Board ({})", app.board.tasks().count()),
                TabId::Calendar => "Calendar".to_owned(),
            };
            Line::from(format!("{title} [{}]", i + 1))
        })
        .collect();
    let selected = TabId::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" | ");
    f.render_widget(tabs, chunks[0]);

    let week = format!(
        "Week {} - {}",
        calendar::format_date(app.calendar.week_start()),
        calendar::format_date(app.calendar.week_end())
    );
    let week = Paragraph::new(Line::from(week))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right);
    f.render_widget(week, chunks[1]);
}

fn draw_board<S: Storage + Copy>(f: &mut Frame<'_>, area: Rect, app: &App<'_, S>) {
    let columns = app.board.columns();
    if columns.is_empty() {
        let p = Paragraph::new("No columns. Press n to add one.")
            .block(Block::default().borders(Borders::ALL).title("Board"));
        f.render_widget(p, area);
        return;
    }

    let n = u32::try_from(columns.len()).unwrap_or(u32::MAX);
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(columns.iter().map(|_| Constraint::Ratio(1, n)))
        .split(area);

    for (i, (column, rect)) in columns.iter().zip(areas.iter()).enumerate() {
        let focused = i == app.column;
        let items: Vec<ListItem> = column
            .tasks
            .iter()
            .map(|task| task_item(app, task))
            .collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(format!("{} ({})", column.title, column.tasks.len()));
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight_style(focused));

        let mut state = ListState::default();
        if focused && !column.tasks.is_empty() {
            state.select(Some(app.task));
        }
        f.render_stateful_widget(list, *rect, &mut state);
    }
}

fn task_item<'t, S: Storage + Copy>(app: &App<'_, S>, task: &'t Task) -> ListItem<'t> {
    let task_type = app.catalog.resolve(task.task_type_id.as_deref());
    let mut priority = task.priority.to_string();
    if app.cfg.ui.icons {
        priority = format!("{} {priority}", priority_icon(task.priority));
    }
    let due = calendar::parse_date(&task.due_date)
        .map_or_else(|| task.due_date.clone(), calendar::format_date);

    ListItem::new(vec![
        Line::from(Span::styled(
            task.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(priority, Style::default().fg(priority_color(task.priority))),
            Span::raw(format!(" {due} ")),
            Span::styled(
                task_type.name.clone(),
                Style::default().fg(parse_hex_color(&task_type.color).unwrap_or(Color::Gray)),
            ),
            Span::raw(format!(" {}", comments::initials(task.assignee.as_deref()))),
        ]),
    ])
}

fn draw_calendar<S: Storage + Copy>(f: &mut Frame<'_>, area: Rect, app: &App<'_, S>) {
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); DAYS_PER_WEEK])
        .split(area);
    let labels = app.calendar.day_labels();
    let today = calendar::today();

    for (i, label) in labels.into_iter().enumerate() {
        let focused = i == app.day;
        let tasks = app.calendar.day(i);
        let items: Vec<ListItem> = tasks
            .iter()
            .map(|t| {
                let task_type = app.catalog.resolve(Some(t.task_type_id.as_str()));
                let color = parse_hex_color(&task_type.color).unwrap_or(Color::Gray);
                ListItem::new(vec![
                    Line::from(Span::styled(t.title.as_str(), Style::default().fg(color))),
                    Line::from(Span::styled(
                        format!("{}m", t.duration_minutes),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let mut title_style = Style::default();
        if app.calendar.date_of(i) == today {
            title_style = title_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(Span::styled(label, title_style));
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight_style(focused));

        let mut state = ListState::default();
        if focused && !tasks.is_empty() {
            state.select(Some(app.day_task));
        }
        f.render_stateful_widget(list, areas[i], &mut state);
    }
}

fn draw_footer<S: Storage + Copy>(f: &mut Frame<'_>, area: Rect, app: &App<'_, S>) {
    let mut left = match app.mode {
        Mode::Normal => match app.tab {
            TabId::Board => "q quit • Tab calendar • h/l column • j/k task • H/L move • J/K reorder • a task • n column • d delete • D delete column • r reload",
            TabId::Calendar => "q quit • Tab board • h/l day • j/k task • H/L move day • J/K reorder • [/] week • t today • r reload",
        }
        .to_owned(),
        Mode::NewColumn => "Enter add • Esc cancel".to_owned(),
        Mode::NewTask => "Enter next/add • Tab switch field • Esc cancel".to_owned(),
        Mode::Confirm => "y delete • n cancel".to_owned(),
    };

    if let Some(err) = &app.last_error {
        left = format!("Error: {err}");
    } else if let Some(toast) = &app.toast {
        left.clone_from(toast);
    }

    let p = Paragraph::new(Line::from(Span::styled(
        left,
        Style::default().fg(Color::White).bg(Color::Blue),
    )))
    .style(Style::default().bg(Color::Blue));
    f.render_widget(p, area);
}

fn draw_new_column_popup<S: Storage + Copy>(f: &mut Frame<'_>, app: &App<'_, S>) {
    let area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title("New column");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let prefix = "Title: ";
    f.render_widget(
        Paragraph::new(format!("{prefix}{}", app.title_input.as_str())),
        inner,
    );
    f.set_cursor_position((cursor_x(inner, prefix, &app.title_input), inner.y));
}

fn draw_new_task_popup<S: Storage + Copy>(f: &mut Frame<'_>, app: &App<'_, S>) {
    let area = centered_rect(70, 30, f.area());
    f.render_widget(Clear, area);
    let column = app
        .board
        .columns()
        .get(app.column)
        .map_or("", |c| c.title.as_str());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("New task in {column}"));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(format!("Title: {}", app.title_input.as_str())),
        Line::from(format!("Due:   {}", app.due_input.as_str())),
        Line::from(""),
        Line::from(Span::styled(
            "Edit the rest with 'weekboard task edit'.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    let (line, prefix, input) = match app.task_field {
        NewTaskField::Title => (0u16, "Title: ", &app.title_input),
        NewTaskField::Due => (1u16, "Due:   ", &app.due_input),
    };
    f.set_cursor_position((cursor_x(inner, prefix, input), inner.y + line));
}

fn draw_confirm(f: &mut Frame<'_>, action: &ConfirmAction) {
    let area = centered_rect(60, 25, f.area());
    f.render_widget(Clear, area);
    let (title, message) = match action {
        ConfirmAction::DeleteTask { title, .. } => {
            ("Delete task", format!("Delete task '{title}' and its comments?"))
        }
        ConfirmAction::DeleteColumn { title, .. } => (
            "Delete column",
            format!("Delete column '{title}' and every task in it?"),
        ),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(message),
        Line::from(""),
        Line::from("[y] delete    [n] cancel"),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn cursor_x(inner: Rect, prefix: &str, input: &TextInput) -> u16 {
    let offset = prefix.chars().count() + input.cursor;
    inner.x.saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn highlight_style(focused: bool) -> Style {
    if focused {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "▲",
        Priority::Medium => "■",
        Priority::Low => "▼",
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

/// `#rrggbb` to a terminal color.
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

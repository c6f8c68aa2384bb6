use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};

use todolist::{application::todo_service::{TodoService, TodoServiceImpl}, config::Config, domain::{store::KeyValueStore, todo::{Todo, TodoDraft}}, infrastructure::open_store};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    todolist::init_tracing(&config)?;
    let store = open_store(&config.database_url).await?;
    let service = TodoServiceImpl::new(store);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, service, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Edit }

#[derive(Clone, Copy, PartialEq, Eq)]
enum Filter { All, Open, Complete }

impl Filter {
    fn label(self) -> &'static str { match self { Filter::All => "All", Filter::Open => "Open", Filter::Complete => "Complete" } }
}

struct App<S: KeyValueStore> {
    service: TodoServiceImpl<S>,
    items: Vec<Todo>,
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    filter: Filter,
    filtered_indices: Vec<usize>,
    draft: String,
    notice: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    async fn load(&mut self) -> Result<()> {
        self.items = self.service.get_all().await?;
        self.recompute_filtered();
        Ok(())
    }

    fn recompute_filtered(&mut self) {
        self.filtered_indices.clear();
        for (i, t) in self.items.iter().enumerate() {
            let include = match self.filter {
                Filter::All => true,
                Filter::Open => !t.complete,
                Filter::Complete => t.complete,
            };
            if include { self.filtered_indices.push(i); }
        }
        // Clamp selection within filtered bounds
        let len = self.filtered_indices.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn current(&self) -> Option<&Todo> {
        self.filtered_indices.get(self.selected).and_then(|&idx| self.items.get(idx))
    }

    /// Keeps a rejected operation visible in the footer instead of aborting.
    fn report<T>(&mut self, action: &str, outcome: todolist::application::error::Result<T>) {
        match outcome {
            Ok(_) => self.notice = None,
            Err(e) => {
                tracing::warn!(action, error = %e, "operation rejected");
                self.notice = Some(match e.validation() {
                    Some(reason) => format!("{action} rejected: {reason}"),
                    None => format!("{action} failed: {e}"),
                });
            }
        }
    }
}

async fn run_app<S: KeyValueStore>(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, service: TodoServiceImpl<S>, config: &Config) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App { service, items: vec![], selected: 0, last_tick: Instant::now(), mode: Mode::View, list_state: ListState::default(), filter: Filter::All, filtered_indices: Vec::new(), draft: String::new(), notice: None };
    app.load().await?;
    tracing::info!(url = %config.database_url, count = app.items.len(), "todos loaded");

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new("Todos (Enter: toggle, n: new, e: edit, d: remove, f: filter, q: quit)  |  New/Edit: type text, Enter to save, Esc to cancel")
                .block(Block::default().borders(Borders::ALL).title("todolist"));
            f.render_widget(header, chunks[0]);

            let list_items: Vec<ListItem> = app.filtered_indices.iter().filter_map(|&idx| app.items.get(idx)).map(|t| {
                let mark = if t.complete { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", mark, t.todo))
            }).collect();
            if app.filtered_indices.is_empty() { app.list_state.select(None); } else { app.list_state.select(Some(app.selected)); }
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!("items [{}]", app.filter.label())))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, chunks[1], &mut app.list_state);

            let footer_text = match app.mode {
                Mode::View => match &app.notice {
                    Some(notice) => notice.clone(),
                    None => format!("DATABASE_URL={}  |  Filter=[{}]", config.database_url, app.filter.label()),
                },
                Mode::Create => format!("New: {}_  |  (Enter to save, Esc to cancel)", app.draft),
                Mode::Edit => format!("Edit: {}_  |  (Enter to save, Esc to cancel)", app.draft),
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create => "new", Mode::Edit => "edit" }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                        KeyCode::Down => { let len = app.filtered_indices.len(); if app.selected + 1 < len { app.selected += 1; } }
                        KeyCode::Enter => {
                            if let Some(todo) = app.current().cloned() {
                                let toggled = TodoDraft::new(todo.todo, !todo.complete).with_id(todo.id);
                                let outcome = app.service.update(toggled).await;
                                app.report("toggle", outcome);
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('n') => {
                            app.mode = Mode::Create;
                            app.draft.clear();
                        }
                        KeyCode::Char('e') => {
                            if let Some(todo) = app.current() {
                                app.draft = todo.todo.clone();
                                app.mode = Mode::Edit;
                            }
                        }
                        KeyCode::Char('d') => {
                            if let Some(id) = app.current().map(|t| t.id.clone()) {
                                let remaining = app.items.iter().filter(|t| t.id != id).cloned().map(TodoDraft::from).collect();
                                let outcome = app.service.override_all(remaining).await;
                                app.report("remove", outcome);
                                if app.selected > 0 { app.selected -= 1; }
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('f') => {
                            app.filter = match app.filter { Filter::All => Filter::Open, Filter::Open => Filter::Complete, Filter::Complete => Filter::All };
                            app.recompute_filtered();
                        }
                        _ => {}
                    },
                    Mode::Create | Mode::Edit => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.draft.clear(); }
                        KeyCode::Enter => {
                            let text = app.draft.trim().to_string();
                            if app.mode == Mode::Create {
                                let outcome = app.service.add(TodoDraft::new(text, false)).await;
                                app.report("add", outcome);
                            } else if let Some(todo) = app.current().cloned() {
                                let outcome = app.service.update(TodoDraft::new(text, todo.complete).with_id(todo.id)).await;
                                app.report("edit", outcome);
                            }
                            app.mode = Mode::View;
                            app.draft.clear();
                            app.load().await?;
                        }
                        KeyCode::Backspace => { app.draft.pop(); }
                        KeyCode::Char(c) => app.draft.push(c),
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}

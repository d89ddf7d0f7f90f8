use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};

use todo_api::{
    application::todo_service::{self, TodoService, TodoServiceImpl},
    config::{self, Config, StoreKind},
    domain::{repository::TodoRepository, todo::{Todo, TodoPatch}},
    infrastructure::{memory_repo::InMemoryTodoRepository, sqlite_repo::SqliteTodoRepository},
};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;
    match config.store {
        StoreKind::Memory => run(InMemoryTodoRepository::new()).await,
        StoreKind::Sqlite(database_url) => {
            config::prepare_sqlite_file(&database_url)?;
            run(SqliteTodoRepository::connect(&database_url).await?).await
        }
    }
}

async fn run<R: TodoRepository>(repo: R) -> Result<()> {
    repo.init().await?;
    let service = TodoServiceImpl::new(repo);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, service).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Edit }

#[derive(Clone, Copy, PartialEq, Eq)]
enum Filter { All, Active, Completed }

impl Filter {
    fn next(self) -> Self { match self { Filter::All => Filter::Active, Filter::Active => Filter::Completed, Filter::Completed => Filter::All } }
    fn label(self) -> &'static str { match self { Filter::All => "All", Filter::Active => "Active", Filter::Completed => "Completed" } }
    fn matches(self, todo: &Todo) -> bool {
        match self { Filter::All => true, Filter::Active => !todo.completed, Filter::Completed => todo.completed }
    }
}

struct App<S: TodoService> {
    service: S,
    items: Vec<Todo>,
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    filter: Filter,
    filtered_indices: Vec<usize>,
    draft: String,
    status: String,
}

impl<S: TodoService> App<S> {
    async fn load(&mut self) -> Result<()> {
        self.items = self.service.list().await?;
        self.recompute_filtered();
        Ok(())
    }

    fn recompute_filtered(&mut self) {
        self.filtered_indices = self.items.iter().enumerate().filter(|(_, t)| self.filter.matches(t)).map(|(i, _)| i).collect();
        let len = self.filtered_indices.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn current(&self) -> Option<&Todo> {
        self.filtered_indices.get(self.selected).and_then(|&idx| self.items.get(idx))
    }

    fn report<T>(&mut self, result: todo_service::Result<T>) {
        self.status = match result { Ok(_) => String::new(), Err(e) => e.to_string() };
    }
}

/// Ids are client-assigned; the terminal client takes the one after the largest.
/// `None` once the largest id is `i64::MAX`.
fn next_todo(items: &[Todo], title: String) -> Option<Todo> {
    let id = items.iter().map(|t| t.id.0).max().unwrap_or(0).checked_add(1)?;
    Some(Todo::new(id, title, false, id))
}

async fn run_app<S: TodoService>(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, service: S) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App { service, items: vec![], selected: 0, last_tick: Instant::now(), mode: Mode::View, list_state: ListState::default(), filter: Filter::All, filtered_indices: Vec::new(), draft: String::new(), status: String::new() };
    app.load().await?;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
                .split(f.size());

            let header = Paragraph::new("Enter: toggle, n: new, e: rename, d: delete, f: filter, q: quit")
                .block(Block::default().borders(Borders::ALL).title("todos"));
            f.render_widget(header, chunks[0]);

            let list_items: Vec<ListItem> = app.filtered_indices.iter().filter_map(|&idx| app.items.get(idx)).map(|t| {
                let mark = if t.completed { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} #{} {} (order {})", mark, t.id, t.title, t.order))
            }).collect();
            if app.filtered_indices.is_empty() { app.list_state.select(None); } else { app.list_state.select(Some(app.selected)); }
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!("items [{}]", app.filter.label())))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, chunks[1], &mut app.list_state);

            let footer_text = match app.mode {
                Mode::View if !app.status.is_empty() => app.status.clone(),
                Mode::View => format!("{} todos", app.items.len()),
                Mode::Create => format!("New title: {}_  (Enter to save, Esc to cancel)", app.draft),
                Mode::Edit => format!("Rename: {}_  (Enter to save, Esc to cancel)", app.draft),
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create => "create", Mode::Edit => "edit" }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Ignore repeats and releases.
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                        KeyCode::Down => { if app.selected + 1 < app.filtered_indices.len() { app.selected += 1; } }
                        KeyCode::Enter => {
                            if let Some(todo) = app.current().cloned() {
                                let res = app.service.update(todo.id, TodoPatch { completed: Some(!todo.completed), ..Default::default() }).await;
                                app.report(res);
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('n') => { app.mode = Mode::Create; app.draft.clear(); }
                        KeyCode::Char('e') => {
                            if let Some(title) = app.current().map(|t| t.title.clone()) { app.mode = Mode::Edit; app.draft = title; }
                        }
                        KeyCode::Char('d') => {
                            if let Some(id) = app.current().map(|t| t.id) {
                                let res = app.service.delete(id).await;
                                app.report(res);
                                if app.selected > 0 { app.selected -= 1; }
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('f') => { app.filter = app.filter.next(); app.recompute_filtered(); }
                        _ => {}
                    },
                    Mode::Create | Mode::Edit => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.draft.clear(); }
                        KeyCode::Enter => {
                            let title = app.draft.trim().to_string();
                            if !title.is_empty() {
                                if app.mode == Mode::Create {
                                    match next_todo(&app.items, title) {
                                        Some(todo) => {
                                            let res = app.service.create(todo).await;
                                            app.report(res);
                                        }
                                        None => app.status = "no free id".to_string(),
                                    }
                                } else if let Some(id) = app.current().map(|t| t.id) {
                                    let res = app.service.update(id, TodoPatch { title: Some(title), ..Default::default() }).await;
                                    app.report(res);
                                }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_todo_follows_largest_id() {
        let items = vec![Todo::new(4, "a", false, 1), Todo::new(9, "b", true, 2)];
        assert_eq!(next_todo(&items, "c".into()), Some(Todo::new(10, "c", false, 10)));
        assert_eq!(next_todo(&[], "first".into()), Some(Todo::new(1, "first", false, 1)));
    }

    #[test]
    fn next_todo_runs_out_at_max_id() {
        let items = vec![Todo::new(i64::MAX, "last", false, 1)];
        assert_eq!(next_todo(&items, "overflow".into()), None);
    }
}

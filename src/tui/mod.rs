pub mod app;
pub mod ui;

use std::io;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use crate::config::Config;
use app::{App, FormKind, InputMode};
use ui::ui;

pub async fn run_tui(cfg: Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Create app state
    let mut app = App::new(cfg);

    // Run loop
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res.context("TUI stopped")
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    app.set_info("Loading...".into());
    terminal.draw(|f| ui(f, app))?;
    app.refresh().await;

    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else { continue; };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char('v') => app.toggle_view(),
                KeyCode::Char('z') => app.cycle_scale(),
                KeyCode::Char('r') => app.refresh().await,
                KeyCode::Char('a') => app.start_add(FormKind::Task),
                KeyCode::Char('m') => app.start_add(FormKind::Milestone),
                KeyCode::Char('e') | KeyCode::Enter => app.start_edit(),
                KeyCode::Char('p') => app.start_progress(),
                KeyCode::Char(' ') => app.toggle_selected().await,
                KeyCode::Char('d') | KeyCode::Delete => app.start_delete(),
                _ => {}
            },
            InputMode::Form => match key.code {
                KeyCode::Enter => app.handle_input().await,
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Char(c) => {
                    app.input_buffer.push(c);
                }
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            },
            InputMode::Confirm => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete().await,
                _ => app.cancel_input(),
            },
        }
    }
}

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};
use crate::calendar::EventSource;
use crate::gantt::{bar_text, bounds};
use crate::progress::hex_rgb;
use super::app::{App, InputMode, Selected, ViewMode};

/// Turns a `#rrggbb` color into a terminal color.
fn hex(color: &str) -> Color {
    let (r, g, b) = hex_rgb(color);
    Color::Rgb(r, g, b)
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(4)  // Status + help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Calendar => render_calendar(f, app, chunks[0]),
        ViewMode::Gantt => render_gantt(f, app, chunks[0]),
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view_mode {
            ViewMode::Calendar => "q: Quit | v: Gantt | r: Refresh | a: Add Task | m: Add Milestone | e: Edit | p: Progress | Space: Toggle Milestone | d: Del",
            ViewMode::Gantt => "q: Quit | v: Calendar | z: Scale | r: Refresh | a: Add Task | e: Edit | p: Progress | d: Del",
        },
        InputMode::Form => "Enter: Next / Save | Esc: Cancel",
        InputMode::Confirm => "y: Confirm delete | any other key: Cancel",
    };

    let status = match &app.status {
        Some((msg, true)) => Line::styled(msg.clone(), Style::default().fg(Color::Red)),
        Some((msg, false)) => Line::styled(msg.clone(), Style::default().fg(Color::Green)),
        None => Line::raw(""),
    };

    let help = Paragraph::new(vec![status, Line::styled(help_text, Style::default().fg(Color::Gray))])
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[1]);

    match app.input_mode {
        InputMode::Form => {
            if let Some(form) = &app.form {
                let area = centered_rect(70, 3, f.area());
                f.render_widget(Clear, area);

                let verb = if form.editing.is_some() { "Edit" } else { "Add" };
                let title = format!(
                    "{} ({}/{}): {}",
                    verb,
                    form.step + 1,
                    form.values.len(),
                    form.prompt()
                );
                let input = Paragraph::new(app.input_buffer.as_str())
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().borders(Borders::ALL).title(title));

                f.render_widget(input, area);
            }
        }
        InputMode::Confirm => {
            let area = centered_rect(50, 3, f.area());
            f.render_widget(Clear, area);
            let what = match &app.pending_delete {
                Some(Selected::Task(_)) => "this task",
                Some(Selected::Milestone(_)) => "this milestone",
                None => "",
            };
            let prompt = Paragraph::new(format!("Delete {}? [y/N]", what))
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title("Confirm"));
            f.render_widget(prompt, area);
        }
        InputMode::Normal => {}
    }
}

fn render_calendar(f: &mut Frame, app: &mut App, area: Rect) {
    let locale = app.cfg.locale;
    let rows: Vec<Row> = app
        .events
        .iter()
        .map(|e| {
            let (date_fmt, detail) = match &e.source {
                EventSource::Task(t) => ("%Y-%m-%d %H:%M", locale.status(t.status)),
                EventSource::Milestone(m) => ("%Y-%m-%d", locale.category(m.category)),
            };
            Row::new(vec![
                Cell::from(e.source.kind()),
                Cell::from(e.title.clone()),
                Cell::from(e.start.format(date_fmt).to_string()),
                Cell::from(e.end.format(date_fmt).to_string()),
                Cell::from(detail),
            ])
            .style(Style::default().fg(hex(e.class.color())))
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Length(17),
        Constraint::Length(17),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Kind", "Title", "Start", "End", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(format!("Timeline - Calendar ({} events)", app.events.len())))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_gantt(f: &mut Frame, app: &mut App, area: Rect) {
    let title = format!("Timeline - Gantt ({} per column)", app.scale.label());
    let Some((origin, _)) = bounds(&app.rows) else {
        let empty = Paragraph::new("No tasks with valid dates to chart.")
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, area);
        return;
    };

    // Borders, highlight symbol and the fixed columns.
    let bar_width = area.width.saturating_sub(2 + 3 + 24 + 6 + 2) as usize;
    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|r| {
            let color = hex(r.styles.progress_color);
            Row::new(vec![
                Cell::from(r.name.clone()),
                Cell::from(format!("{}%", r.progress)).style(Style::default().fg(color)),
                Cell::from(bar_text(r, origin, app.scale, bar_width)).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(24),
        Constraint::Length(6),
        Constraint::Min(10),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(vec![
            "Task".to_string(),
            "Done".to_string(),
            format!("From {}", origin.format("%Y-%m-%d")),
        ])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}

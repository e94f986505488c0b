use crate::state::{App, InputMode, RowHit};
use crate::theme::{self, glyphs};
use pans_core::PanTool;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render<T: PanTool>(f: &mut Frame, app: &mut App<T>) {
    let area = f.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_filter(f, app, rows[0]);
    if app.show_help {
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);
        render_processes(f, app, main[0]);
        render_help(f, main[1]);
    } else {
        render_processes(f, app, rows[1]);
    }
    render_status(f, app, rows[2]);
}

fn render_filter<T: PanTool>(f: &mut Frame, app: &App<T>, area: Rect) {
    let editing = app.mode == InputMode::EditFilter;
    let border_style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Filter")
        .border_style(border_style);

    let mut spans = vec![Span::raw(app.filter_input.as_str())];
    if editing {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    } else if app.filter_input.is_empty() {
        spans.push(Span::styled(
            "press / and type a process name",
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_processes<T: PanTool>(f: &mut Frame, app: &mut App<T>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Processes")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let registry_len = app.controller.registry().len();
    if registry_len == 0 || inner.height < 2 {
        let message = match &app.last_error {
            Some(error) => Line::from(Span::styled(error.clone(), theme::ERROR_STYLE)),
            None if app.controller.pattern().is_empty() => Line::from("No filter applied"),
            None => Line::from(format!(
                "No pannable processes match '{}'",
                app.controller.pattern()
            )),
        };
        f.render_widget(Paragraph::new(message).wrap(Wrap { trim: true }), inner);
        app.update_layout(Vec::new());
        return;
    }

    let header = Rect::new(inner.x, inner.y, inner.width, 1);
    render_row_cells(
        f,
        header,
        [
            Span::raw("Process"),
            Span::raw("Balance"),
            Span::raw("Pan"),
        ],
        theme::HEADER_STYLE,
    );

    let visible = (inner.height - 1) as usize;
    let selected = app.selected();
    let mut offset = app.scroll_offset.min(registry_len.saturating_sub(1));
    if let Some(selected) = selected {
        if selected < offset {
            offset = selected;
        } else if selected >= offset + visible {
            offset = selected + 1 - visible;
        }
    }
    app.scroll_offset = offset;

    let limit = app.controller.pan_limit();
    let mut hits = Vec::new();
    for (row_idx, (index, process)) in app
        .controller
        .registry()
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .enumerate()
    {
        let row_area = Rect::new(inner.x, inner.y + 1 + row_idx as u16, inner.width, 1);
        let style = if selected == Some(index) {
            theme::SELECTED_STYLE
        } else {
            theme::zebra_row_style(index)
        };
        let cells = render_row_cells(
            f,
            row_area,
            [
                Span::raw(process.label()),
                Span::raw(""),
                Span::raw(process.pan_label()),
            ],
            style,
        );
        f.render_widget(
            Paragraph::new(balance_bar(process.pan, limit, cells[1].width)).style(style),
            cells[1],
        );
        hits.push(RowHit {
            index,
            label: cells[0],
            bar: cells[1],
        });
    }
    app.update_layout(hits);
}

fn render_row_cells(f: &mut Frame, area: Rect, cells: [Span; 3], style: Style) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Min(10),
            Constraint::Length(6),
        ])
        .split(area);
    let rects = [chunks[0], chunks[1], chunks[2]];
    for (cell, rect) in cells.into_iter().zip(rects) {
        f.render_widget(Paragraph::new(Line::from(cell)).style(style), rect);
    }
    rects
}

fn balance_bar(pan: f64, limit: f64, width: u16) -> Line<'static> {
    let width = width as usize;
    if width == 0 {
        return Line::from("");
    }
    let centre = (width - 1) / 2;
    let knob = knob_position(pan, limit, width);
    let track: String = (0..width)
        .map(|i| if i == centre { glyphs::CENTRE } else { glyphs::TRACK })
        .collect();
    let before: String = track.chars().take(knob).collect();
    let after: String = track.chars().skip(knob + 1).collect();
    Line::from(vec![
        Span::styled(before, Style::default().fg(Color::DarkGray)),
        Span::styled(
            glyphs::KNOB.to_string(),
            Style::default().fg(theme::pan_color(pan, limit)),
        ),
        Span::styled(after, Style::default().fg(Color::DarkGray)),
    ])
}

fn knob_position(pan: f64, limit: f64, width: usize) -> usize {
    if width <= 1 || limit <= 0.0 {
        return 0;
    }
    let ratio = ((pan + limit) / (2.0 * limit)).clamp(0.0, 1.0);
    (ratio * (width - 1) as f64).round() as usize
}

fn render_status<T: PanTool>(f: &mut Frame, app: &App<T>, area: Rect) {
    let style = if app.last_error.is_some() {
        theme::ERROR_STYLE
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let line = Line::from(vec![
        Span::styled(app.status.clone(), style),
        Span::styled("  ? help", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Yellow));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let bindings = [
        ("/", "Edit filter (Enter applies)"),
        ("j / Down", "Next process"),
        ("k / Up", "Previous process"),
        ("h / Left", "Pan left"),
        ("l / Right", "Pan right"),
        ("0 / c", "Centre"),
        ("click name", "Centre"),
        ("click bar", "Pan to position"),
        ("r", "Re-run filter"),
        ("?", "Toggle help"),
        ("q", "Quit"),
    ];
    let mut text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    text.extend(bindings.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("{key:<12}"), Color::Cyan),
            Span::raw(*action),
        ])
    }));

    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner_area);
}

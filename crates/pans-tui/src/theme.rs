use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const ERROR_STYLE: Style = Style::new().fg(Color::Rgb(254, 128, 25));

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

/// Knob colour drifts from blue (left) through grey (centre) to orange (right).
pub fn pan_color(pan: f64, limit: f64) -> Color {
    if limit <= 0.0 {
        return Color::Rgb(146, 131, 116);
    }
    let ratio = pan / limit;
    if ratio < -0.05 {
        Color::Rgb(131, 165, 152)
    } else if ratio > 0.05 {
        Color::Rgb(254, 128, 25)
    } else {
        Color::Rgb(146, 131, 116)
    }
}

pub mod glyphs {
    pub const TRACK: char = '─';
    pub const CENTRE: char = '┼';
    pub const KNOB: char = '●';
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use pans_core::{PanController, PanError, PanTool, RegistryEvent};
use ratatui::{layout::Rect, widgets::ListState};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    EditFilter,
}

/// Screen regions of one rendered process row, recorded by the renderer so
/// mouse clicks can be mapped back to registry positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHit {
    pub index: usize,
    pub label: Rect,
    pub bar: Rect,
}

pub struct App<T: PanTool> {
    pub controller: PanController<T>,
    pub pan_step: f64,
    pub mode: InputMode,
    pub filter_input: String,
    pub list_state: ListState,
    pub scroll_offset: usize,
    pub row_hits: Vec<RowHit>,
    pub status: String,
    pub last_error: Option<String>,
    pub show_help: bool,
    should_quit: bool,
}

impl<T: PanTool> App<T> {
    pub fn new(controller: PanController<T>, pan_step: f64) -> Self {
        Self {
            controller,
            pan_step,
            mode: InputMode::Normal,
            filter_input: String::new(),
            list_state: ListState::default(),
            scroll_offset: 0,
            row_hits: Vec::new(),
            status: "Press / to filter processes".to_string(),
            last_error: None,
            show_help: false,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state
            .selected()
            .filter(|idx| *idx < self.controller.registry().len())
    }

    pub fn update_layout(&mut self, row_hits: Vec<RowHit>) {
        self.row_hits = row_hits;
    }

    pub fn apply_filter(&mut self, pattern: String) {
        self.filter_input = pattern;
        match self.controller.apply_filter(&self.filter_input) {
            Ok(events) => self.on_registry_events(&events),
            Err(err) => self.set_error(err),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.mode {
            InputMode::EditFilter => self.handle_filter_key(key),
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                let pattern = self.filter_input.clone();
                self.apply_filter(pattern);
            }
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.filter_input = self.controller.pattern().to_string();
            }
            KeyCode::Backspace => {
                self.filter_input.pop();
            }
            KeyCode::Char(ch) => {
                self.filter_input.push(ch);
            }
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                self.show_help = false;
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.mode = InputMode::EditFilter;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.nudge_selected(-1.0);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.nudge_selected(1.0);
            }
            KeyCode::Char('0') | KeyCode::Char('c') => {
                if let Some(idx) = self.selected() {
                    self.reset(idx);
                }
            }
            KeyCode::Char('r') => {
                match self.controller.refresh() {
                    Ok(events) => self.on_registry_events(&events),
                    Err(err) => self.set_error(err),
                }
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_left_click(event.column, event.row);
            }
            MouseEventKind::ScrollUp => {
                self.move_selection(-1);
            }
            MouseEventKind::ScrollDown => {
                self.move_selection(1);
            }
            _ => {}
        }
    }

    fn handle_left_click(&mut self, column: u16, row: u16) {
        let Some(hit) = self
            .row_hits
            .iter()
            .find(|hit| contains(hit.label, column, row) || contains(hit.bar, column, row))
            .copied()
        else {
            return;
        };

        self.list_state.select(Some(hit.index));
        if contains(hit.label, column, row) {
            self.reset(hit.index);
        } else {
            let value = value_at(
                column,
                hit.bar,
                self.controller.pan_limit(),
                self.pan_step,
            );
            self.set_pan(hit.index, value);
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.controller.registry().len() as isize;
        if len == 0 {
            return;
        }

        let current = self.list_state.selected().unwrap_or(0) as isize;
        let mut next = current + delta;
        if next < 0 {
            next = len - 1;
        }
        if next >= len {
            next = 0;
        }
        self.list_state.select(Some(next as usize));
    }

    fn nudge_selected(&mut self, direction: f64) {
        let Some(idx) = self.selected() else {
            return;
        };
        let Some(current) = self.controller.registry().get(idx).map(|p| p.pan) else {
            return;
        };
        let target = snap(current + direction * self.pan_step, self.pan_step);
        self.set_pan(idx, target);
    }

    fn set_pan(&mut self, idx: usize, value: f64) {
        match self.controller.set_pan(idx, value) {
            Ok(applied) => {
                self.last_error = None;
                if let Some(process) = self.controller.registry().get(idx) {
                    self.status = format!("{} -> {:.1}", process.label(), applied);
                }
            }
            Err(err) => self.set_error(err),
        }
    }

    fn reset(&mut self, idx: usize) {
        match self.controller.reset_pan(idx) {
            Ok(()) => {
                self.last_error = None;
                if let Some(process) = self.controller.registry().get(idx) {
                    self.status = format!("{} centred", process.label());
                }
            }
            Err(err) => self.set_error(err),
        }
    }

    fn on_registry_events(&mut self, events: &[RegistryEvent]) {
        let created = events
            .iter()
            .filter(|event| matches!(event, RegistryEvent::Created { .. }))
            .count();
        self.last_error = None;
        self.row_hits.clear();
        self.list_state = ListState::default();
        self.scroll_offset = 0;
        if created > 0 {
            self.list_state.select(Some(0));
        }

        let pattern = self.controller.pattern();
        self.status = if pattern.is_empty() {
            "Filter cleared".to_string()
        } else {
            format!("{created} process(es) matching '{pattern}'")
        };
    }

    fn set_error(&mut self, err: PanError) {
        warn!(error = %err, "operation failed");
        let message = err.to_string();
        self.status = message.clone();
        self.last_error = Some(message);
    }
}

/// Maps a click inside a balance bar to a pan value, snapped to `step`.
pub fn value_at(column: u16, bar: Rect, limit: f64, step: f64) -> f64 {
    if bar.width <= 1 {
        return 0.0;
    }
    let offset = column.saturating_sub(bar.x).min(bar.width - 1) as f64;
    let ratio = offset / (bar.width - 1) as f64;
    snap(ratio * 2.0 * limit - limit, step)
}

fn snap(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    let snapped = (value / step).round() * step;
    // keep 0.1 steps from drifting to 0.30000000000000004
    (snapped * 1e6).round() / 1e6
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use pans_core::{ToolError, ToolRequest};

    #[derive(Default)]
    struct RecordingTool {
        listing: String,
        calls: Vec<ToolRequest>,
    }

    impl PanTool for RecordingTool {
        fn invoke(&mut self, request: &ToolRequest) -> Result<String, ToolError> {
            self.calls.push(request.clone());
            match request {
                ToolRequest::List { .. } => Ok(self.listing.clone()),
                _ => Ok(String::new()),
            }
        }
    }

    fn app() -> App<RecordingTool> {
        let tool = RecordingTool {
            listing: "#3 'firefox'\ninfo\n#5 'mpv'\ninfo\n".to_string(),
            calls: Vec::new(),
        };
        App::new(PanController::new(tool, 1.0), 0.1)
    }

    fn press(app: &mut App<RecordingTool>, code: KeyCode) {
        app.handle_key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        });
    }

    fn type_filter(app: &mut App<RecordingTool>, text: &str) {
        press(app, KeyCode::Char('/'));
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
        press(app, KeyCode::Enter);
    }

    #[test]
    fn committing_filter_populates_and_selects_first_row() {
        let mut app = app();
        type_filter(&mut app, "fi");
        assert_eq!(app.controller.registry().ids(), vec![3, 5]);
        assert_eq!(app.selected(), Some(0));
        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(app.controller.tool().calls, vec![ToolRequest::list("fi")]);
    }

    #[test]
    fn empty_commit_clears_without_tool_call() {
        let mut app = app();
        type_filter(&mut app, "");
        assert!(app.controller.registry().is_empty());
        assert!(app.controller.tool().calls.is_empty());
        assert_eq!(app.selected(), None);
    }

    #[test]
    fn arrow_keys_step_and_reset_recentres() {
        let mut app = app();
        type_filter(&mut app, "x");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.controller.registry().get(1).map(|p| p.pan), Some(0.3));

        press(&mut app, KeyCode::Char('0'));
        assert_eq!(app.controller.registry().get(1).map(|p| p.pan), Some(0.0));
        assert_eq!(
            app.controller.tool().calls.last(),
            Some(&ToolRequest::set("x", 5, 0.0))
        );
    }

    #[test]
    fn clicking_a_label_resets_and_clicking_the_bar_sets() {
        let mut app = app();
        type_filter(&mut app, "x");
        app.update_layout(vec![RowHit {
            index: 1,
            label: Rect::new(1, 3, 20, 1),
            bar: Rect::new(22, 3, 21, 1),
        }]);

        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 42,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.controller.registry().get(1).map(|p| p.pan), Some(1.0));

        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.controller.registry().get(1).map(|p| p.pan), Some(0.0));
        assert_eq!(app.selected(), Some(1));
    }

    #[test]
    fn bar_positions_map_across_the_range() {
        let bar = Rect::new(10, 0, 21, 1);
        assert_eq!(value_at(10, bar, 1.0, 0.1), -1.0);
        assert_eq!(value_at(20, bar, 1.0, 0.1), 0.0);
        assert_eq!(value_at(30, bar, 1.0, 0.1), 1.0);
        assert_eq!(value_at(99, bar, 1.0, 0.1), 1.0);
    }

    #[test]
    fn escape_restores_committed_filter_text() {
        let mut app = app();
        type_filter(&mut app, "x");
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.filter_input, "x");
        assert_eq!(app.controller.tool().calls.len(), 1);
    }
}

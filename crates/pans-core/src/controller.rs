use crate::error::PanError;
use crate::parser::parse_process_list;
use crate::registry::{Registry, RegistryEvent, NEUTRAL_PAN};
use crate::tool::{PanTool, ToolRequest};
use tracing::{debug, info, warn};

/// Owns the tracked process set and turns user gestures into tool calls.
///
/// Every non-empty filter rebuilds the registry from scratch: all previous
/// rows are destroyed and new ones created, even when the tool reports the
/// same processes again.
pub struct PanController<T: PanTool> {
    tool: T,
    registry: Registry,
    pattern: String,
    pan_limit: f64,
}

impl<T: PanTool> PanController<T> {
    /// `pan_limit` bounds values to `[-pan_limit, pan_limit]`.
    pub fn new(tool: T, pan_limit: f64) -> Self {
        Self {
            tool,
            registry: Registry::default(),
            pattern: String::new(),
            pan_limit: pan_limit.abs(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Filter of the last successful list query, empty when nothing is shown.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn pan_limit(&self) -> f64 {
        self.pan_limit
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn tool_mut(&mut self) -> &mut T {
        &mut self.tool
    }

    /// Replaces the registry with the processes matching `pattern`.
    ///
    /// An empty pattern clears the registry without calling the tool. On a
    /// tool or parse failure the previous registry is left untouched and no
    /// events are produced.
    pub fn apply_filter(&mut self, pattern: &str) -> Result<Vec<RegistryEvent>, PanError> {
        if pattern.is_empty() {
            let events: Vec<_> = self.registry.destroy_events().collect();
            self.registry = Registry::default();
            self.pattern.clear();
            debug!(destroyed = events.len(), "filter cleared");
            return Ok(events);
        }

        let raw = self.tool.invoke(&ToolRequest::list(pattern))?;
        let records = parse_process_list(&raw)?;
        let next = Registry::from_records(records);

        let mut events: Vec<_> = self.registry.destroy_events().collect();
        let destroyed = events.len();
        events.extend(next.create_events());
        info!(
            pattern,
            destroyed,
            created = next.len(),
            "registry rebuilt"
        );

        self.registry = next;
        self.pattern = pattern.to_string();
        Ok(events)
    }

    /// Re-runs the current filter.
    pub fn refresh(&mut self) -> Result<Vec<RegistryEvent>, PanError> {
        let pattern = self.pattern.clone();
        self.apply_filter(&pattern)
    }

    /// Stores `value` (clamped to the configured range) for the process at
    /// `index` and sends it to the tool. Returns the value actually applied.
    ///
    /// The stored value is kept even when the tool call fails.
    pub fn set_pan(&mut self, index: usize, value: f64) -> Result<f64, PanError> {
        let len = self.registry.len();
        let pan_limit = self.pan_limit;
        let entry = self
            .registry
            .get_mut(index)
            .ok_or(PanError::IndexOutOfRange { index, len })?;
        if !value.is_finite() {
            return Err(PanError::InvalidValue(value));
        }

        let clamped = value.clamp(-pan_limit, pan_limit);
        if clamped != value {
            debug!(value, clamped, "pan value clamped");
        }
        entry.pan = clamped;
        debug!(id = entry.id, display = %entry.pan_label(), "pan updated");

        self.push(index)?;
        Ok(clamped)
    }

    /// Re-centres the process at `index`, then pushes the centred value the
    /// same way a slider change would.
    pub fn reset_pan(&mut self, index: usize) -> Result<(), PanError> {
        let len = self.registry.len();
        let entry = self
            .registry
            .get_mut(index)
            .ok_or(PanError::IndexOutOfRange { index, len })?;
        entry.pan = NEUTRAL_PAN;
        debug!(id = entry.id, display = %entry.pan_label(), "pan recentred");

        self.push(index)
    }

    fn push(&mut self, index: usize) -> Result<(), PanError> {
        let len = self.registry.len();
        let entry = self
            .registry
            .get(index)
            .ok_or(PanError::IndexOutOfRange { index, len })?;
        let request = ToolRequest::set(self.pattern.as_str(), entry.id, entry.pan);
        if let Err(err) = self.tool.invoke(&request) {
            warn!(id = entry.id, error = %err, "pan tool rejected value; local value kept");
            return Err(err.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, ToolError};
    use std::collections::VecDeque;

    /// Replays canned outputs and records every request.
    #[derive(Default)]
    struct ScriptedTool {
        outputs: VecDeque<Result<String, ToolError>>,
        calls: Vec<ToolRequest>,
    }

    impl ScriptedTool {
        fn with_outputs<I: IntoIterator<Item = &'static str>>(outputs: I) -> Self {
            Self {
                outputs: outputs.into_iter().map(|o| Ok(o.to_string())).collect(),
                calls: Vec::new(),
            }
        }

        fn set_calls(&self) -> Vec<&ToolRequest> {
            self.calls
                .iter()
                .filter(|call| matches!(call, ToolRequest::Set { .. }))
                .collect()
        }
    }

    impl PanTool for ScriptedTool {
        fn invoke(&mut self, request: &ToolRequest) -> Result<String, ToolError> {
            self.calls.push(request.clone());
            self.outputs.pop_front().unwrap_or_else(|| Ok(String::new()))
        }
    }

    const TWO_PROCS: &str = "#3 'firefox'\n(info line)\n#5 'mpv'\n(info line)\n";

    fn exit_error() -> ToolError {
        ToolError::Exit {
            command: "pan".to_string(),
            status: "exit status: 1".to_string(),
            detail: "boom".to_string(),
        }
    }

    fn loaded() -> PanController<ScriptedTool> {
        let mut controller = PanController::new(ScriptedTool::with_outputs([TWO_PROCS]), 10.0);
        controller.apply_filter("x").expect("filter");
        controller
    }

    fn count(events: &[RegistryEvent]) -> (usize, usize) {
        let destroyed = events
            .iter()
            .filter(|e| matches!(e, RegistryEvent::Destroyed { .. }))
            .count();
        (destroyed, events.len() - destroyed)
    }

    #[test]
    fn filter_builds_registry_in_tool_order() {
        let controller = loaded();
        assert_eq!(controller.registry().ids(), vec![3, 5]);
        assert_eq!(controller.pattern(), "x");
        assert_eq!(controller.tool().calls, vec![ToolRequest::list("x")]);
        assert!(controller.registry().iter().all(|p| p.pan == NEUTRAL_PAN));
    }

    #[test]
    fn identical_refilter_tears_down_and_recreates_everything() {
        let mut controller =
            PanController::new(ScriptedTool::with_outputs([TWO_PROCS, TWO_PROCS]), 10.0);

        let first = controller.apply_filter("x").expect("first");
        assert_eq!(count(&first), (0, 2));

        let second = controller.apply_filter("x").expect("second");
        assert_eq!(count(&second), (2, 2));
        assert_eq!(
            second[0],
            RegistryEvent::Destroyed { index: 0, id: 3 }
        );
        assert_eq!(
            second[2],
            RegistryEvent::Created {
                index: 0,
                id: 3,
                name: "firefox".to_string(),
                pan: NEUTRAL_PAN,
            }
        );
    }

    #[test]
    fn refilter_resets_stored_values() {
        let mut controller =
            PanController::new(ScriptedTool::with_outputs([TWO_PROCS, "", TWO_PROCS]), 10.0);
        controller.apply_filter("x").expect("filter");
        controller.set_pan(1, 2.0).expect("set");
        controller.apply_filter("x").expect("refilter");
        assert_eq!(controller.registry().get(1).map(|p| p.pan), Some(NEUTRAL_PAN));
    }

    #[test]
    fn empty_filter_clears_without_calling_the_tool() {
        let mut controller = PanController::new(ScriptedTool::default(), 10.0);
        let events = controller.apply_filter("").expect("clear");
        assert!(events.is_empty());
        assert!(controller.registry().is_empty());
        assert!(controller.tool().calls.is_empty());

        let mut controller = loaded();
        let events = controller.apply_filter("").expect("clear");
        assert_eq!(count(&events), (2, 0));
        assert!(controller.registry().is_empty());
        assert_eq!(controller.pattern(), "");
        assert_eq!(controller.tool().calls.len(), 1);
    }

    #[test]
    fn vanished_processes_are_dropped() {
        let mut controller = PanController::new(
            ScriptedTool::with_outputs([TWO_PROCS, "#5 'mpv'\ninfo\n#8 'vlc'\ninfo\n"]),
            10.0,
        );
        controller.apply_filter("x").expect("first");
        controller.apply_filter("x").expect("second");
        assert_eq!(controller.registry().ids(), vec![5, 8]);
        assert_eq!(controller.registry().position_of(3), None);
    }

    #[test]
    fn malformed_output_keeps_previous_registry() {
        let mut controller =
            PanController::new(ScriptedTool::with_outputs([TWO_PROCS, "oops 'x'\ninfo\n"]), 10.0);
        controller.apply_filter("x").expect("first");
        let err = controller.apply_filter("y").expect_err("malformed");
        assert!(matches!(
            err,
            PanError::Parse(ParseError::MissingIdMarker { .. })
        ));
        assert_eq!(controller.registry().ids(), vec![3, 5]);
        assert_eq!(controller.pattern(), "x");
    }

    #[test]
    fn tool_failure_propagates_from_filter() {
        let mut tool = ScriptedTool::default();
        tool.outputs.push_back(Err(exit_error()));
        let mut controller = PanController::new(tool, 10.0);
        let err = controller.apply_filter("x").expect_err("tool fails");
        assert!(matches!(err, PanError::Tool(ToolError::Exit { .. })));
        assert!(controller.registry().is_empty());
    }

    #[test]
    fn set_pan_writes_through() {
        let mut controller = loaded();
        let applied = controller.set_pan(1, 3.5).expect("set");
        assert_eq!(applied, 3.5);
        assert_eq!(controller.registry().get(1).map(|p| p.pan), Some(3.5));
        assert_eq!(
            controller.tool().set_calls(),
            vec![&ToolRequest::set("x", 5, 3.5)]
        );
    }

    #[test]
    fn set_pan_clamps_to_configured_range() {
        let mut controller = PanController::new(ScriptedTool::with_outputs([TWO_PROCS]), 1.0);
        controller.apply_filter("x").expect("filter");
        assert_eq!(controller.set_pan(0, 3.5).expect("high"), 1.0);
        assert_eq!(controller.set_pan(0, -7.0).expect("low"), -1.0);
        assert_eq!(
            controller.tool().set_calls(),
            vec![&ToolRequest::set("x", 3, 1.0), &ToolRequest::set("x", 3, -1.0)]
        );
    }

    #[test]
    fn set_pan_rejects_nan() {
        let mut controller = loaded();
        let err = controller.set_pan(0, f64::NAN).expect_err("nan");
        assert!(matches!(err, PanError::InvalidValue(_)));
        assert!(controller.tool().set_calls().is_empty());
    }

    #[test]
    fn failed_set_keeps_local_value() {
        let mut controller = loaded();
        controller.tool_mut().outputs.push_back(Err(exit_error()));
        let err = controller.set_pan(0, 0.5).expect_err("tool fails");
        assert!(matches!(err, PanError::Tool(_)));
        assert_eq!(controller.registry().get(0).map(|p| p.pan), Some(0.5));
    }

    #[test]
    fn reset_recentres_and_sends_zero_once() {
        let mut controller = loaded();
        controller.set_pan(0, -4.0).expect("set");
        controller.reset_pan(0).expect("reset");
        let process = controller.registry().get(0).expect("row");
        assert_eq!(process.pan, 0.0);
        assert_eq!(process.pan_label(), "0.0");
        assert_eq!(
            controller.tool().set_calls(),
            vec![&ToolRequest::set("x", 3, -4.0), &ToolRequest::set("x", 3, 0.0)]
        );
    }

    #[test]
    fn out_of_range_index_is_rejected_without_tool_call() {
        let mut controller = loaded();
        let err = controller.set_pan(2, 1.0).expect_err("index");
        assert!(matches!(
            err,
            PanError::IndexOutOfRange { index: 2, len: 2 }
        ));
        assert!(matches!(
            controller.reset_pan(9),
            Err(PanError::IndexOutOfRange { index: 9, len: 2 })
        ));
        assert_eq!(controller.tool().calls.len(), 1);
    }

    #[test]
    fn refresh_reuses_last_pattern() {
        let mut controller =
            PanController::new(ScriptedTool::with_outputs([TWO_PROCS, TWO_PROCS]), 10.0);
        controller.apply_filter("fire").expect("filter");
        controller.refresh().expect("refresh");
        assert_eq!(
            controller.tool().calls,
            vec![ToolRequest::list("fire"), ToolRequest::list("fire")]
        );
    }
}

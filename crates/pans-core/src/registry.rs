use crate::parser::{ProcessId, ProcessRecord};
use std::collections::HashMap;

/// Starting value for a freshly discovered process. The tool's current value is
/// never read back, so every new row starts centred.
pub const NEUTRAL_PAN: f64 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedProcess {
    pub id: ProcessId,
    pub name: String,
    pub pan: f64,
}

impl TrackedProcess {
    fn from_record(record: ProcessRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            pan: NEUTRAL_PAN,
        }
    }

    pub fn label(&self) -> String {
        format!("#{}: {}", self.id, self.name)
    }

    pub fn pan_label(&self) -> String {
        format!("{:.1}", self.pan)
    }
}

/// Lifecycle notifications for the presentation layer, in the order they
/// happened.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    Destroyed {
        index: usize,
        id: ProcessId,
    },
    Created {
        index: usize,
        id: ProcessId,
        name: String,
        pan: f64,
    },
}

/// Tracked processes in list order, addressable by position and by id.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<TrackedProcess>,
    by_id: HashMap<ProcessId, usize>,
}

impl Registry {
    /// Records must have unique ids; the parser guarantees this.
    pub fn from_records(records: Vec<ProcessRecord>) -> Self {
        let entries: Vec<TrackedProcess> = records
            .into_iter()
            .map(TrackedProcess::from_record)
            .collect();
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.id, index))
            .collect();
        Self { entries, by_id }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedProcess> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&TrackedProcess> {
        self.entries.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut TrackedProcess> {
        self.entries.get_mut(index)
    }

    pub fn position_of(&self, id: ProcessId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn get_by_id(&self, id: ProcessId) -> Option<&TrackedProcess> {
        self.position_of(id).and_then(|index| self.entries.get(index))
    }

    pub fn ids(&self) -> Vec<ProcessId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub(crate) fn destroy_events(&self) -> impl Iterator<Item = RegistryEvent> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| RegistryEvent::Destroyed {
                index,
                id: entry.id,
            })
    }

    pub(crate) fn create_events(&self) -> impl Iterator<Item = RegistryEvent> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| RegistryEvent::Created {
                index,
                id: entry.id,
                name: entry.name.clone(),
                pan: entry.pan,
            })
    }
}

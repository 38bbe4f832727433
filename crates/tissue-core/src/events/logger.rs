//! Event Logger
//!
//! Append-only JSONL log of seeding and type-switch events.

use bevy_ecs::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

use tissue_events::{generate_event_id, CellTypeSwitched, Event, SeedingCompleted};

use crate::setup::SeedReport;
use crate::systems::SwitchOutcome;

/// Resource writing one event per line to a JSONL file
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    run_id: Uuid,
    event_count: u64,
    next_event_id: u64,
}

impl EventLogger {
    /// Create a logger that truncates and writes `path`
    pub fn new(path: impl AsRef<Path>, run_id: Uuid) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            run_id,
            event_count: 0,
            next_event_id: 1,
        })
    }

    /// Create a logger that discards events
    pub fn null(run_id: Uuid) -> Self {
        Self {
            writer: None,
            run_id,
            event_count: 0,
            next_event_id: 1,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_event_id(self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn log(&mut self, event: &Event) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn log_seeding(&mut self, time: f64, report: &SeedReport) -> std::io::Result<()> {
        let payload = SeedingCompleted {
            layout: report.layout.as_str().to_string(),
            cells_created: report.cells_created,
            by_type: report.by_type.iter().map(|(t, n)| (t.0, *n)).collect(),
            attribute: report.attribute.as_ref().map(|a| a.to_snapshot()),
            truncated_at_line: report.truncated_at.as_ref().map(|m| m.line),
        };
        let event = Event::seeding_completed(self.next_id(), self.run_id, time, payload);
        self.log(&event)
    }

    pub fn log_switches(&mut self, switches: &[SwitchOutcome]) -> std::io::Result<()> {
        for outcome in switches {
            let payload = CellTypeSwitched {
                cell_id: outcome.cell_id.0,
                from_type: outcome.from.0,
                to_type: outcome.to.0,
                to_name: outcome.to_name.clone(),
            };
            let event = Event::cell_type_switched(self.next_id(), self.run_id, outcome.time, payload);
            self.log(&event)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush event logger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CellId, CellTypeId};
    use crate::setup::layout::LayoutKind;
    use std::collections::BTreeMap;
    use std::fs;
    use tissue_events::{EventPayload, EventType};

    fn switch(cell: u64) -> SwitchOutcome {
        SwitchOutcome {
            cell_id: CellId(cell),
            from: CellTypeId(0),
            to: CellTypeId(1),
            to_name: "envelop cell".into(),
            time: 120.0,
        }
    }

    #[test]
    fn test_events_written_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        {
            let mut logger = EventLogger::new(&path, Uuid::nil()).unwrap();
            let report = SeedReport {
                layout: LayoutKind::Recorded,
                cells_created: 2,
                by_type: BTreeMap::from([(CellTypeId(0), 1), (CellTypeId(1), 1)]),
                attribute: None,
                truncated_at: None,
            };
            logger.log_seeding(0.0, &report).unwrap();
            logger.log_switches(&[switch(3), switch(4)]).unwrap();
            assert_eq!(logger.event_count(), 3);
        }

        let content = fs::read_to_string(&path).unwrap();
        let events: Vec<Event> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].event_id, "evt_00000001");
        assert_eq!(events[0].event_type, EventType::SeedingCompleted);
        assert_eq!(events[2].event_id, "evt_00000003");
        match &events[2].payload {
            EventPayload::CellTypeSwitched(p) => assert_eq!(p.cell_id, 4),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_null_logger_counts_without_writing() {
        let mut logger = EventLogger::null(Uuid::nil());
        logger.log_switches(&[switch(1)]).unwrap();
        assert_eq!(logger.event_count(), 1);
        assert_eq!(logger.next_id(), "evt_00000002");
    }
}

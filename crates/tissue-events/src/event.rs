//! Event Types
//!
//! Records emitted during setup and stepping, written one per line as JSONL.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::snapshot::AttributeSummarySnapshot;

/// Event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SeedingCompleted,
    CellTypeSwitched,
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}

/// A single logged event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    /// Seeding pass this event belongs to
    pub run_id: Uuid,
    /// Simulated time (minutes) at which the event happened
    pub time: f64,
    pub event_type: EventType,
    pub payload: EventPayload,
}

/// Event-specific data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    SeedingCompleted(SeedingCompleted),
    CellTypeSwitched(CellTypeSwitched),
}

/// Summary of a finished seeding pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedingCompleted {
    /// "recorded" or "packed"
    pub layout: String,
    pub cells_created: usize,
    /// (type tag, count) pairs in ascending tag order
    pub by_type: Vec<(u32, usize)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<AttributeSummarySnapshot>,
    /// Line number of the first malformed layout row, when reading stopped early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_at_line: Option<usize>,
}

/// One cell changed its type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellTypeSwitched {
    pub cell_id: u64,
    pub from_type: u32,
    pub to_type: u32,
    pub to_name: String,
}

impl Event {
    pub fn seeding_completed(
        event_id: impl Into<String>,
        run_id: Uuid,
        time: f64,
        payload: SeedingCompleted,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            run_id,
            time,
            event_type: EventType::SeedingCompleted,
            payload: EventPayload::SeedingCompleted(payload),
        }
    }

    pub fn cell_type_switched(
        event_id: impl Into<String>,
        run_id: Uuid,
        time: f64,
        payload: CellTypeSwitched,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            run_id,
            time,
            event_type: EventType::CellTypeSwitched,
            payload: EventPayload::CellTypeSwitched(payload),
        }
    }
}

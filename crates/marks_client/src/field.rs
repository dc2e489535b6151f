use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::domain::{Mark, StudentId};

use crate::{error::PersistFailure, scheduler::TimerSlot};

/// Local value of one editable mark field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Never held a value in this view.
    Unset,
    /// Cleared by the user.
    Empty,
    Numeric(Mark),
}

impl FieldValue {
    pub fn mark(self) -> Option<Mark> {
        match self {
            Self::Numeric(mark) => Some(mark),
            Self::Unset | Self::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Error,
}

/// What a field should look like, combining status with persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldIndicator {
    Blank,
    Ready,
    Saving,
    Saved,
    /// Idle, but the current value is the one the server holds.
    Persisted,
    Error,
}

impl FieldIndicator {
    pub fn label(self) -> &'static str {
        match self {
            Self::Blank => "",
            Self::Ready => "Ready",
            Self::Saving => "Saving...",
            Self::Saved => "Saved",
            Self::Persisted => "",
            Self::Error => "Error saving",
        }
    }
}

/// Read-only copy of a field handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub student_id: StudentId,
    pub value: FieldValue,
    pub persisted: Option<Mark>,
    pub status: SaveStatus,
    pub indicator: FieldIndicator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved_at: Option<DateTime<Utc>>,
}

/// One issued write: which sequence number, the edit revision it captured, and the value sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    pub seq: u64,
    pub revision: u64,
    pub value: Mark,
}

/// Everything the controller tracks for one student, kept together so the
/// value, persisted value, status and timers always move as a unit.
#[derive(Debug)]
pub(crate) struct FieldState {
    pub value: FieldValue,
    pub persisted: Option<Mark>,
    pub status: SaveStatus,
    pub last_error: Option<PersistFailure>,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Bumped on every edit.
    pub revision: u64,
    /// Sequence number of the most recently issued write.
    pub issued_seq: u64,
    /// Sequence number of the write that produced `persisted` (0 for the initial snapshot).
    pub persisted_seq: u64,
    pub in_flight: usize,
    pub flush_timer: TimerSlot,
    pub status_timer: TimerSlot,
}

impl FieldState {
    pub fn new(initial: Option<Mark>) -> Self {
        Self {
            value: initial.map_or(FieldValue::Unset, FieldValue::Numeric),
            persisted: initial,
            status: SaveStatus::Idle,
            last_error: None,
            last_saved_at: None,
            revision: 0,
            issued_seq: 0,
            persisted_seq: 0,
            in_flight: 0,
            flush_timer: TimerSlot::default(),
            status_timer: TimerSlot::default(),
        }
    }

    /// Stores an edit and drops any verdict that was on display.
    ///
    /// Timers are left to the caller; returns the previous status.
    pub fn apply_edit(&mut self, value: FieldValue) -> SaveStatus {
        let previous = self.status;
        self.value = value;
        self.revision += 1;
        self.status = SaveStatus::Idle;
        self.last_error = None;
        self.status_timer.cancel();
        previous
    }

    /// Moves to `Saving` and records a new attempt for the current value.
    pub fn begin_attempt(&mut self) -> Option<Attempt> {
        let value = self.value.mark()?;
        self.issued_seq += 1;
        self.in_flight += 1;
        self.status = SaveStatus::Saving;
        self.last_error = None;
        self.status_timer.cancel();
        Some(Attempt {
            seq: self.issued_seq,
            revision: self.revision,
            value,
        })
    }

    /// True while no newer write was issued and no edit happened since `attempt`.
    pub fn is_current(&self, attempt: &Attempt) -> bool {
        attempt.seq == self.issued_seq && attempt.revision == self.revision
    }

    pub fn indicator(&self) -> FieldIndicator {
        match self.status {
            SaveStatus::Saving => FieldIndicator::Saving,
            SaveStatus::Saved => FieldIndicator::Saved,
            SaveStatus::Error => FieldIndicator::Error,
            SaveStatus::Idle => match self.value.mark() {
                Some(mark) if self.persisted == Some(mark) => FieldIndicator::Persisted,
                Some(_) => FieldIndicator::Ready,
                None => FieldIndicator::Blank,
            },
        }
    }

    pub fn is_quiet(&self) -> bool {
        !self.flush_timer.is_armed() && self.in_flight == 0
    }

    pub fn snapshot(&self, student_id: &StudentId) -> FieldSnapshot {
        FieldSnapshot {
            student_id: student_id.clone(),
            value: self.value,
            persisted: self.persisted,
            status: self.status,
            indicator: self.indicator(),
            last_error: self.last_error.as_ref().map(PersistFailure::user_message),
            last_saved_at: self.last_saved_at,
        }
    }
}

#[cfg(test)]
#[path = "tests/field_tests.rs"]
mod tests;

//! Decides which write completions are still authoritative for a field.
//!
//! Staleness is judged by attempt sequence and edit revision, never by
//! comparing values: two edits can land on the same number.

use chrono::Utc;

use crate::{
    error::PersistFailure,
    field::{Attempt, FieldState, SaveStatus},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reconciliation {
    /// The write persisted and the field still shows the value that was sent.
    Saved,
    /// The write persisted but the field has moved on; status untouched.
    PersistedSuperseded,
    /// The write persisted but a newer write had already landed.
    Stale,
    Failed(PersistFailure),
    /// The write failed after a newer write already persisted.
    FailureSuperseded(PersistFailure),
}

pub(crate) fn on_write_result(
    field: &mut FieldState,
    attempt: &Attempt,
    result: Result<(), PersistFailure>,
) -> Reconciliation {
    field.in_flight = field.in_flight.saturating_sub(1);

    match result {
        Ok(()) => {
            if attempt.seq <= field.persisted_seq {
                return Reconciliation::Stale;
            }
            field.persisted = Some(attempt.value);
            field.persisted_seq = attempt.seq;
            field.last_saved_at = Some(Utc::now());

            if field.is_current(attempt) {
                field.status = SaveStatus::Saved;
                Reconciliation::Saved
            } else {
                Reconciliation::PersistedSuperseded
            }
        }
        Err(failure) => {
            if attempt.seq < field.persisted_seq {
                return Reconciliation::FailureSuperseded(failure);
            }
            field.status = SaveStatus::Error;
            field.last_error = Some(failure.clone());
            Reconciliation::Failed(failure)
        }
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;

use std::{collections::HashMap, sync::Arc};

use shared::domain::{Mark, MarkScale, StudentId};
use tokio::sync::{broadcast, Mutex, Notify};
use tracing::{debug, info, warn};

use crate::{
    error::{EditError, PersistFailure},
    field::{Attempt, FieldSnapshot, FieldState, FieldValue, SaveStatus},
    reconcile::{self, Reconciliation},
    scheduler::DebounceScheduler,
    validation::{validate, Validation},
    AutosaveSettings, PersistContext, PersistenceClient,
};

#[derive(Debug, Clone, PartialEq)]
pub enum AutosaveEvent {
    ValueChanged {
        student_id: StudentId,
        value: FieldValue,
    },
    StatusChanged {
        student_id: StudentId,
        status: SaveStatus,
    },
    Persisted {
        student_id: StudentId,
        mark: Mark,
    },
    PersistFailed {
        student_id: StudentId,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    Applied(FieldValue),
    /// Input failed validation; nothing changed.
    Rejected,
}

/// Per-student debounced autosave over a fixed roster.
///
/// All field state lives behind one lock, so transitions for a student are
/// applied one event at a time no matter which task delivers them.
pub struct AutosaveController {
    persistence: Arc<dyn PersistenceClient>,
    context: PersistContext,
    scale: MarkScale,
    flush_scheduler: DebounceScheduler,
    status_scheduler: DebounceScheduler,
    roster: Vec<StudentId>,
    fields: Mutex<HashMap<StudentId, FieldState>>,
    events: broadcast::Sender<AutosaveEvent>,
    settled: Notify,
}

impl AutosaveController {
    pub fn new(
        persistence: Arc<dyn PersistenceClient>,
        context: PersistContext,
        scale: MarkScale,
        settings: AutosaveSettings,
        initial: impl IntoIterator<Item = (StudentId, Option<Mark>)>,
    ) -> Arc<Self> {
        let mut roster = Vec::new();
        let mut fields = HashMap::new();
        for (student_id, mark) in initial {
            if fields.contains_key(&student_id) {
                warn!(student_id = %student_id, "autosave: duplicate student in roster ignored");
                continue;
            }
            fields.insert(student_id.clone(), FieldState::new(mark));
            roster.push(student_id);
        }

        let (events, _) = broadcast::channel(1024);
        Arc::new(Self {
            persistence,
            context,
            scale,
            flush_scheduler: DebounceScheduler::new(settings.debounce_window),
            status_scheduler: DebounceScheduler::new(settings.saved_display_window),
            roster,
            fields: Mutex::new(fields),
            events,
            settled: Notify::new(),
        })
    }

    pub fn scale(&self) -> MarkScale {
        self.scale
    }

    pub fn context(&self) -> &PersistContext {
        &self.context
    }

    pub fn roster(&self) -> &[StudentId] {
        &self.roster
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AutosaveEvent> {
        self.events.subscribe()
    }

    /// Keystroke entry point: validates, stores, and (re)arms the save timer.
    pub async fn handle_input(
        self: &Arc<Self>,
        student_id: &StudentId,
        raw: &str,
    ) -> Result<EditOutcome, EditError> {
        match validate(raw, self.scale) {
            Validation::Accepted(value) => {
                self.apply_edit(student_id, value).await?;
                Ok(EditOutcome::Applied(value))
            }
            Validation::Rejected => {
                if !self.fields.lock().await.contains_key(student_id) {
                    return Err(EditError::UnknownStudent(student_id.clone()));
                }
                debug!(student_id = %student_id, raw, "autosave: input rejected");
                Ok(EditOutcome::Rejected)
            }
        }
    }

    /// Stores a validated value and resets the student's status to idle in one step.
    ///
    /// A number arms the flush timer; an empty value cancels it without writing.
    pub async fn apply_edit(
        self: &Arc<Self>,
        student_id: &StudentId,
        value: FieldValue,
    ) -> Result<(), EditError> {
        let mut fields = self.fields.lock().await;
        let field = fields
            .get_mut(student_id)
            .ok_or_else(|| EditError::UnknownStudent(student_id.clone()))?;

        let previous = field.apply_edit(value);
        self.emit(AutosaveEvent::ValueChanged {
            student_id: student_id.clone(),
            value,
        });
        if previous != SaveStatus::Idle {
            self.emit(AutosaveEvent::StatusChanged {
                student_id: student_id.clone(),
                status: SaveStatus::Idle,
            });
        }

        match value {
            FieldValue::Numeric(_) => {
                let controller = Arc::clone(self);
                let key = student_id.clone();
                self.flush_scheduler
                    .schedule(&mut field.flush_timer, move |generation| async move {
                        controller.flush(key, generation).await;
                    });
            }
            FieldValue::Empty | FieldValue::Unset => {
                if field.flush_timer.cancel() {
                    debug!(student_id = %student_id, "autosave: field cleared, pending save cancelled");
                }
                self.settled.notify_waiters();
            }
        }
        Ok(())
    }

    async fn flush(self: Arc<Self>, student_id: StudentId, generation: u64) {
        let attempt = {
            let mut fields = self.fields.lock().await;
            let Some(field) = fields.get_mut(&student_id) else {
                return;
            };
            if !field.flush_timer.claim(generation) {
                return;
            }
            let Some(attempt) = field.begin_attempt() else {
                self.settled.notify_waiters();
                return;
            };
            self.emit(AutosaveEvent::StatusChanged {
                student_id: student_id.clone(),
                status: SaveStatus::Saving,
            });
            attempt
        };

        debug!(
            student_id = %student_id,
            seq = attempt.seq,
            mark = %attempt.value,
            "autosave: flushing"
        );
        let result = self
            .persistence
            .persist(&student_id, attempt.value, &self.context)
            .await;
        self.complete(&student_id, attempt, result).await;
    }

    async fn complete(
        self: &Arc<Self>,
        student_id: &StudentId,
        attempt: Attempt,
        result: Result<(), PersistFailure>,
    ) {
        let mut fields = self.fields.lock().await;
        let Some(field) = fields.get_mut(student_id) else {
            return;
        };

        match reconcile::on_write_result(field, &attempt, result) {
            Reconciliation::Saved => {
                info!(student_id = %student_id, seq = attempt.seq, mark = %attempt.value, "autosave: saved");
                self.emit(AutosaveEvent::Persisted {
                    student_id: student_id.clone(),
                    mark: attempt.value,
                });
                self.emit(AutosaveEvent::StatusChanged {
                    student_id: student_id.clone(),
                    status: SaveStatus::Saved,
                });
                let controller = Arc::clone(self);
                let key = student_id.clone();
                self.status_scheduler
                    .schedule(&mut field.status_timer, move |generation| async move {
                        controller.expire_saved(key, generation).await;
                    });
            }
            Reconciliation::PersistedSuperseded => {
                info!(
                    student_id = %student_id,
                    seq = attempt.seq,
                    mark = %attempt.value,
                    "autosave: saved, field has changed since"
                );
                self.emit(AutosaveEvent::Persisted {
                    student_id: student_id.clone(),
                    mark: attempt.value,
                });
            }
            Reconciliation::Stale => {
                debug!(student_id = %student_id, seq = attempt.seq, "autosave: stale save result ignored");
            }
            Reconciliation::Failed(failure) => {
                warn!(student_id = %student_id, seq = attempt.seq, error = %failure, "autosave: save failed");
                self.emit(AutosaveEvent::PersistFailed {
                    student_id: student_id.clone(),
                    message: failure.user_message(),
                });
                self.emit(AutosaveEvent::StatusChanged {
                    student_id: student_id.clone(),
                    status: SaveStatus::Error,
                });
            }
            Reconciliation::FailureSuperseded(failure) => {
                warn!(
                    student_id = %student_id,
                    seq = attempt.seq,
                    error = %failure,
                    "autosave: save failed after a newer save landed"
                );
            }
        }

        drop(fields);
        self.settled.notify_waiters();
    }

    async fn expire_saved(self: Arc<Self>, student_id: StudentId, generation: u64) {
        let mut fields = self.fields.lock().await;
        let Some(field) = fields.get_mut(&student_id) else {
            return;
        };
        if !field.status_timer.claim(generation) || field.status != SaveStatus::Saved {
            return;
        }
        field.status = SaveStatus::Idle;
        self.emit(AutosaveEvent::StatusChanged {
            student_id,
            status: SaveStatus::Idle,
        });
    }

    /// Resolves once no save timer is armed and no write is in flight.
    pub async fn wait_settled(&self) {
        loop {
            let notified = self.settled.notified();
            if self.fields.lock().await.values().all(FieldState::is_quiet) {
                return;
            }
            notified.await;
        }
    }

    pub async fn value(&self, student_id: &StudentId) -> Option<FieldValue> {
        self.fields.lock().await.get(student_id).map(|field| field.value)
    }

    pub async fn status(&self, student_id: &StudentId) -> Option<SaveStatus> {
        self.fields.lock().await.get(student_id).map(|field| field.status)
    }

    pub async fn persisted(&self, student_id: &StudentId) -> Option<Mark> {
        self.fields
            .lock()
            .await
            .get(student_id)
            .and_then(|field| field.persisted)
    }

    pub async fn has_pending_flush(&self, student_id: &StudentId) -> bool {
        self.fields
            .lock()
            .await
            .get(student_id)
            .is_some_and(|field| field.flush_timer.is_armed())
    }

    pub async fn snapshot(&self, student_id: &StudentId) -> Option<FieldSnapshot> {
        self.fields
            .lock()
            .await
            .get(student_id)
            .map(|field| field.snapshot(student_id))
    }

    /// Snapshots of every field in roster order.
    pub async fn snapshots(&self) -> Vec<FieldSnapshot> {
        let fields = self.fields.lock().await;
        self.roster
            .iter()
            .filter_map(|student_id| fields.get(student_id).map(|field| field.snapshot(student_id)))
            .collect()
    }

    fn emit(&self, event: AutosaveEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

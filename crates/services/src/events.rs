//! Analytics events.
//!
//! The quiz reports what happens to an `EventSink`; where the events end up
//! is the sink's business.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::info;

use quiz_core::model::{AreaKey, QuestionIndex, RunId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEventKind {
    AreaSelected {
        area: AreaKey,
        resumed: bool,
    },
    SessionStarted {
        area: AreaKey,
        run: RunId,
        total: usize,
        shuffled: bool,
    },
    QuestionAnswered {
        area: AreaKey,
        run: RunId,
        index: QuestionIndex,
        correct: bool,
    },
    SessionCompleted {
        area: AreaKey,
        run: RunId,
        correct: usize,
        fail: usize,
    },
    LoadFailed {
        target: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizEvent {
    pub at: DateTime<Utc>,
    pub kind: QuizEventKind,
}

pub trait EventSink: Send + Sync {
    fn record(&self, event: &QuizEvent);
}

/// Writes events to the `tracing` pipeline under the `quiz::events` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: &QuizEvent) {
        info!(target: "quiz::events", at = %event.at, kind = ?event.kind);
    }
}

/// Keeps events in memory; used by tests.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<QuizEvent>>,
}

impl RecordingEventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<QuizEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingEventSink {
    fn record(&self, event: &QuizEvent) {
        let mut guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(event.clone());
    }
}

#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod loader;
pub mod sessions;
pub mod source;

pub use quiz_core::Clock;

pub use error::{LoadError, LoadTarget, QuizError, SourceError};
pub use events::{EventSink, QuizEvent, QuizEventKind, RecordingEventSink, TracingEventSink};
pub use source::{DEFAULT_AREAS_FILE, DirectorySource, HttpSource, InMemorySource, QuestionSource};

pub use sessions::{
    AnswerOutcome, QuestionView, QuizEngine, QuizSession, Screen, Selection, SessionRng,
    SessionStart, ShufflePrefs,
};

mod options;
mod plan;
mod progress;
mod resume;
mod rng;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use options::{AnswerOrderMemory, MAX_SHUFFLE_ATTEMPTS, shuffle_options};
pub use plan::{Selection, SessionOrderer, SessionPlan};
pub use progress::ProgressTracker;
pub use resume::{ResumeDecision, decide, prune_saved, resume_position};
pub use rng::SessionRng;
pub use service::QuizSession;
pub use view::{AnswerOutcome, QuestionView, Screen};
pub use workflow::{QuizEngine, SessionStart, ShufflePrefs};

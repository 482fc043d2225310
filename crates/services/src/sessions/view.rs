use std::collections::BTreeSet;

use quiz_core::model::{ProgressCounts, Question, QuestionIndex};

/// Screen the quiz is on. Exactly one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    AreaSelection,
    MenuSelection,
    SectionPicker {
        selected: BTreeSet<String>,
    },
    QuestionPicker {
        selected: BTreeSet<QuestionIndex>,
    },
    /// Question at `position` of the session list, unanswered view.
    Question {
        position: usize,
    },
    /// Feedback for the question just answered.
    Result {
        position: usize,
        outcome: AnswerOutcome,
    },
    /// Session overview; `resume` is where "continue" goes.
    StatusOverview {
        resume: Option<usize>,
    },
    Completed,
}

impl Screen {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Screen::AreaSelection => "area selection",
            Screen::MenuSelection => "menu",
            Screen::SectionPicker { .. } => "section picker",
            Screen::QuestionPicker { .. } => "question picker",
            Screen::Question { .. } => "question",
            Screen::Result { .. } => "result",
            Screen::StatusOverview { .. } => "status overview",
            Screen::Completed => "completed",
        }
    }

    /// Screens that belong to a running session.
    #[must_use]
    pub fn in_session(&self) -> bool {
        matches!(
            self,
            Screen::Question { .. }
                | Screen::Result { .. }
                | Screen::StatusOverview { .. }
                | Screen::Completed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub given: String,
    pub expected: String,
    pub explanation: String,
}

/// A session question as it is shown, options in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView<'a> {
    pub position: usize,
    pub question: &'a Question,
    pub options: &'a [String],
    pub counts: ProgressCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_screens() {
        assert!(Screen::Completed.in_session());
        assert!(Screen::Question { position: 0 }.in_session());
        assert!(!Screen::MenuSelection.in_session());
        assert!(
            !Screen::SectionPicker {
                selected: BTreeSet::new()
            }
            .in_session()
        );
        assert_eq!(Screen::default(), Screen::AreaSelection);
        assert_eq!(Screen::StatusOverview { resume: None }.name(), "status overview");
    }
}

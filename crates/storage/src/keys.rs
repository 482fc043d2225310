//! Names of persisted keys.
//!
//! Every area owns a family of keys suffixed with its short name; a single
//! global pointer remembers the area that was open last.

use quiz_core::model::AreaKey;

pub const CURRENT_AREA: &str = "currentArea";

/// Pre-namespacing status key, migrated once into an area's own key.
pub const LEGACY_STATUS: &str = "quizStatus";

const STATUS_PREFIX: &str = "quizStatus_";
const CURRENT_QUESTION_PREFIX: &str = "currentQuestion_";
const SELECTED_QUESTIONS_PREFIX: &str = "selectedQuestions_";
const SELECTED_SECTIONS_PREFIX: &str = "selectedSections_";
const SHUFFLE_QUESTIONS_PREFIX: &str = "shuffleQuestions_";
const SHUFFLE_ANSWERS_PREFIX: &str = "shuffleAnswers_";

/// The key family of one area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaKeys {
    pub status: String,
    pub current_question: String,
    pub selected_questions: String,
    pub selected_sections: String,
    pub shuffle_questions: String,
    pub shuffle_answers: String,
}

impl AreaKeys {
    #[must_use]
    pub fn for_area(area: &AreaKey) -> Self {
        let key = area.as_str();
        Self {
            status: format!("{STATUS_PREFIX}{key}"),
            current_question: format!("{CURRENT_QUESTION_PREFIX}{key}"),
            selected_questions: format!("{SELECTED_QUESTIONS_PREFIX}{key}"),
            selected_sections: format!("{SELECTED_SECTIONS_PREFIX}{key}"),
            shuffle_questions: format!("{SHUFFLE_QUESTIONS_PREFIX}{key}"),
            shuffle_answers: format!("{SHUFFLE_ANSWERS_PREFIX}{key}"),
        }
    }

    /// Keys cleared by a reset. Shuffle preferences survive.
    #[must_use]
    pub fn session_keys(&self) -> [&str; 4] {
        [
            self.status.as_str(),
            self.current_question.as_str(),
            self.selected_questions.as_str(),
            self.selected_sections.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_short_name() {
        let keys = AreaKeys::for_area(&AreaKey::new("ipc"));
        assert_eq!(keys.status, "quizStatus_ipc");
        assert_eq!(keys.current_question, "currentQuestion_ipc");
        assert_eq!(keys.selected_questions, "selectedQuestions_ipc");
        assert_eq!(keys.shuffle_questions, "shuffleQuestions_ipc");
        assert_eq!(keys.shuffle_answers, "shuffleAnswers_ipc");
    }

    #[test]
    fn distinct_areas_never_share_keys() {
        let a = AreaKeys::for_area(&AreaKey::new("log1"));
        let b = AreaKeys::for_area(&AreaKey::new("log2"));
        assert_ne!(a.status, b.status);
        assert_ne!(a.current_question, b.current_question);
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionIndex;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {index} has an empty option list")]
    EmptyOptions { index: QuestionIndex },

    #[error("question {index} answer {answer:?} is not one of its options")]
    AnswerNotInOptions { index: QuestionIndex, answer: String },
}

//
// ─── WIRE SHAPE ────────────────────────────────────────────────────────────────
//

/// Question as stored in a bank file. The index is assigned on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub section: String,
    pub number: u32,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appears_in: Option<Vec<String>>,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A loaded question with its stable index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    index: QuestionIndex,
    section: String,
    number: u32,
    text: String,
    answer: String,
    explanation: String,
    options: Option<Vec<String>>,
    appears_in: Vec<String>,
}

impl Question {
    #[must_use]
    pub fn from_record(index: QuestionIndex, record: QuestionRecord) -> Self {
        Self {
            index,
            section: record.section,
            number: record.number,
            text: record.question,
            answer: record.answer,
            explanation: record.explanation,
            options: record.options,
            appears_in: record.appears_in.unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn index(&self) -> QuestionIndex {
        self.index
    }

    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Display ordinal; sequential sessions sort by this.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Literal expected answer (never a bare letter for multiple choice).
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Source-ordered literal options, present for multiple choice only.
    #[must_use]
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    #[must_use]
    pub fn appears_in(&self) -> &[String] {
        &self.appears_in
    }

    /// Checks that a multiple-choice answer is one of the literal options.
    ///
    /// Questions without options always pass.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyOptions` for an empty option list and
    /// `QuestionError::AnswerNotInOptions` when the answer is not a literal option.
    pub fn check_literal_answer(&self) -> Result<(), QuestionError> {
        let Some(options) = self.options.as_deref() else {
            return Ok(());
        };
        if options.is_empty() {
            return Err(QuestionError::EmptyOptions { index: self.index });
        }
        if options.iter().any(|o| o == &self.answer) {
            Ok(())
        } else {
            Err(QuestionError::AnswerNotInOptions {
                index: self.index,
                answer: self.answer.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(answer: &str) -> Question {
        Question::from_record(
            QuestionIndex::new(3),
            QuestionRecord {
                section: "Tema 1".into(),
                number: 4,
                question: "Capital of France?".into(),
                answer: answer.into(),
                explanation: String::new(),
                options: Some(vec!["Paris".into(), "Lyon".into(), "Nice".into()]),
                appears_in: None,
            },
        )
    }

    #[test]
    fn record_parses_camel_case_fields() {
        let raw = r#"{"section":"S","number":2,"question":"Q?","answer":"V","appearsIn":["2021"]}"#;
        let record: QuestionRecord = serde_json::from_str(raw).unwrap();
        let q = Question::from_record(QuestionIndex::new(0), record);
        assert_eq!(q.appears_in(), ["2021".to_string()]);
        assert_eq!(q.explanation(), "");
        assert!(q.options().is_none());
    }

    #[test]
    fn literal_answer_accepted() {
        assert!(mcq("Paris").check_literal_answer().is_ok());
    }

    #[test]
    fn letter_answer_rejected() {
        let err = mcq("a").check_literal_answer().unwrap_err();
        assert!(matches!(err, QuestionError::AnswerNotInOptions { .. }));
    }
}

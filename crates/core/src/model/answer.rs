use crate::model::question::Question;

/// What the learner picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerChoice {
    True,
    False,
    /// Position in the displayed (possibly shuffled) option order.
    Option(usize),
}

/// Outcome of checking a choice against a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerMatch {
    pub correct: bool,
    /// Literal text of what was chosen.
    pub given: String,
}

impl AnswerChoice {
    /// Checks the choice against the question's literal answer.
    ///
    /// `displayed` is the option order the learner saw. Returns `None` when
    /// the choice does not apply (an option position out of range, or an
    /// option picked on a question without options).
    #[must_use]
    pub fn evaluate(self, question: &Question, displayed: &[String]) -> Option<AnswerMatch> {
        match self {
            AnswerChoice::True | AnswerChoice::False => {
                let given = if self == AnswerChoice::True { "V" } else { "F" };
                Some(AnswerMatch {
                    correct: true_false_matches(given, question.answer()),
                    given: given.to_owned(),
                })
            }
            AnswerChoice::Option(position) => {
                question.options()?;
                let picked = displayed.get(position)?;
                Some(AnswerMatch {
                    correct: picked.trim() == question.answer().trim(),
                    given: picked.clone(),
                })
            }
        }
    }
}

fn true_false_matches(given: &str, expected: &str) -> bool {
    let user = given.trim().to_uppercase();
    let expected = expected.trim().to_uppercase();
    user == expected
        || (user == "V" && expected == "VERDADERO")
        || (user == "F" && expected == "FALSO")
        || (user == "VERDADERO" && expected == "V")
        || (user == "FALSO" && expected == "F")
}

/// Display letter for an option position: 0 -> 'A'.
#[must_use]
pub fn option_letter(position: usize) -> char {
    u8::try_from(position)
        .ok()
        .and_then(|p| b'A'.checked_add(p))
        .filter(u8::is_ascii_uppercase)
        .map_or('?', char::from)
}

/// Inverse of [`option_letter`], case-insensitive.
#[must_use]
pub fn option_position(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| usize::from(upper as u8 - b'A'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionIndex, QuestionRecord};

    fn question(answer: &str, options: Option<Vec<&str>>) -> Question {
        Question::from_record(
            QuestionIndex::new(0),
            QuestionRecord {
                section: "S".into(),
                number: 1,
                question: "Q".into(),
                answer: answer.into(),
                explanation: String::new(),
                options: options.map(|o| o.into_iter().map(String::from).collect()),
                appears_in: None,
            },
        )
    }

    #[test]
    fn true_false_accepts_both_spellings() {
        let q = question("Verdadero", None);
        assert!(AnswerChoice::True.evaluate(&q, &[]).unwrap().correct);
        assert!(!AnswerChoice::False.evaluate(&q, &[]).unwrap().correct);

        let q = question(" f ", None);
        assert!(AnswerChoice::False.evaluate(&q, &[]).unwrap().correct);
    }

    #[test]
    fn option_checked_against_displayed_order() {
        let q = question("Lyon", Some(vec!["Paris", "Lyon", "Nice"]));
        let displayed: Vec<String> = ["Nice", "Lyon", "Paris"].map(String::from).to_vec();
        let hit = AnswerChoice::Option(1).evaluate(&q, &displayed).unwrap();
        assert!(hit.correct);
        assert_eq!(hit.given, "Lyon");
        assert!(!AnswerChoice::Option(2).evaluate(&q, &displayed).unwrap().correct);
        assert!(AnswerChoice::Option(3).evaluate(&q, &displayed).is_none());
    }

    #[test]
    fn option_on_true_false_question_does_not_apply() {
        let q = question("V", None);
        assert!(AnswerChoice::Option(0).evaluate(&q, &[]).is_none());
    }

    #[test]
    fn letters_round_trip() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
        assert_eq!(option_position('c'), Some(2));
        assert_eq!(option_position('1'), None);
    }
}

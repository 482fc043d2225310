use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{BTreeSet, HashSet};

use quiz_core::model::{Question, QuestionIndex};

/// Which part of the bank a session covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Sections(BTreeSet<String>),
    Questions(BTreeSet<QuestionIndex>),
    /// A previously persisted subset, in its persisted order.
    Saved(Vec<QuestionIndex>),
}

/// Ordered questions of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
    pub shuffled: bool,
}

impl SessionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Indices in session order, the persisted `selectedQuestions` value.
    #[must_use]
    pub fn indices(&self) -> Vec<QuestionIndex> {
        self.questions.iter().map(Question::index).collect()
    }
}

/// Builds the question sequence of a session from the full bank.
pub struct SessionOrderer<'a> {
    bank: &'a [Question],
    shuffle: bool,
}

impl<'a> SessionOrderer<'a> {
    #[must_use]
    pub fn new(bank: &'a [Question]) -> Self {
        Self {
            bank,
            shuffle: false,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Select and order questions.
    ///
    /// - sequential: ascending `number`
    /// - shuffled: Fisher–Yates over the selection
    ///
    /// `Selection::Saved` always keeps its persisted order, whatever the
    /// shuffle flag, so a saved cursor stays meaningful.
    pub fn build<R: Rng + ?Sized>(self, selection: &Selection, rng: &mut R) -> SessionPlan {
        let mut questions = select(self.bank, selection);
        match selection {
            Selection::Saved(_) => {}
            _ if self.shuffle => questions.shuffle(rng),
            _ => questions.sort_by_key(Question::number),
        }
        SessionPlan {
            questions,
            shuffled: self.shuffle,
        }
    }
}

fn select(bank: &[Question], selection: &Selection) -> Vec<Question> {
    match selection {
        Selection::All => bank.to_vec(),
        Selection::Sections(sections) => bank
            .iter()
            .filter(|q| sections.contains(q.section()))
            .cloned()
            .collect(),
        Selection::Questions(indices) => bank
            .iter()
            .filter(|q| indices.contains(&q.index()))
            .cloned()
            .collect(),
        Selection::Saved(indices) => {
            let mut seen = HashSet::new();
            indices
                .iter()
                .filter(|i| seen.insert(**i))
                .filter_map(|i| bank.iter().find(|q| q.index() == *i))
                .cloned()
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::rng::SessionRng;
    use quiz_core::model::QuestionRecord;

    fn q(index: u32, section: &str, number: u32) -> Question {
        Question::from_record(
            QuestionIndex::new(index),
            QuestionRecord {
                section: section.into(),
                number,
                question: format!("Q{number}"),
                answer: "V".into(),
                explanation: String::new(),
                options: None,
                appears_in: None,
            },
        )
    }

    fn numbers(plan: &SessionPlan) -> Vec<u32> {
        plan.questions.iter().map(Question::number).collect()
    }

    fn bank() -> Vec<Question> {
        (0..12)
            .map(|i| q(i, if i % 2 == 0 { "even" } else { "odd" }, 12 - i))
            .collect()
    }

    #[test]
    fn sequential_sorts_by_number() {
        let bank = vec![q(0, "S", 3), q(1, "S", 1), q(2, "S", 2)];
        let mut rng = SessionRng::seeded(1);
        let plan = SessionOrderer::new(&bank).build(&Selection::All, &mut rng);
        assert_eq!(numbers(&plan), vec![1, 2, 3]);
        assert!(!plan.shuffled);

        let again = SessionOrderer::new(&bank).build(&Selection::All, &mut rng);
        assert_eq!(plan, again);
    }

    #[test]
    fn shuffled_is_a_permutation_and_reproducible_per_seed() {
        let bank = bank();
        let plan_a = SessionOrderer::new(&bank)
            .with_shuffle(true)
            .build(&Selection::All, &mut SessionRng::seeded(7));
        let plan_b = SessionOrderer::new(&bank)
            .with_shuffle(true)
            .build(&Selection::All, &mut SessionRng::seeded(7));
        assert_eq!(plan_a, plan_b);

        let mut sorted = numbers(&plan_a);
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn section_and_question_subsets() {
        let bank = bank();
        let mut rng = SessionRng::seeded(3);
        let sections: BTreeSet<String> = ["odd".to_string()].into();
        let plan = SessionOrderer::new(&bank).build(&Selection::Sections(sections), &mut rng);
        assert_eq!(plan.total(), 6);
        assert!(plan.questions.iter().all(|q| q.section() == "odd"));

        let picked: BTreeSet<QuestionIndex> = [QuestionIndex::new(0), QuestionIndex::new(5)].into();
        let plan = SessionOrderer::new(&bank).build(&Selection::Questions(picked), &mut rng);
        assert_eq!(plan.indices(), vec![QuestionIndex::new(5), QuestionIndex::new(0)]);
    }

    #[test]
    fn empty_subset_gives_empty_plan() {
        let bank = bank();
        let plan = SessionOrderer::new(&bank)
            .with_shuffle(true)
            .build(&Selection::Sections(BTreeSet::new()), &mut SessionRng::seeded(1));
        assert!(plan.is_empty());
    }

    #[test]
    fn saved_order_is_kept_when_shuffled_and_drops_unknown_indices() {
        let bank = bank();
        let saved = vec![
            QuestionIndex::new(4),
            QuestionIndex::new(99),
            QuestionIndex::new(1),
            QuestionIndex::new(4),
        ];
        let plan = SessionOrderer::new(&bank)
            .with_shuffle(true)
            .build(&Selection::Saved(saved), &mut SessionRng::seeded(9));
        assert_eq!(plan.indices(), vec![QuestionIndex::new(4), QuestionIndex::new(1)]);
    }

    #[test]
    fn saved_order_is_kept_when_sequential() {
        let bank = bank();
        // Numbers 11 then 8: sorting would swap them.
        let saved = vec![QuestionIndex::new(1), QuestionIndex::new(4)];
        let plan = SessionOrderer::new(&bank)
            .build(&Selection::Saved(saved.clone()), &mut SessionRng::seeded(9));
        assert_eq!(plan.indices(), saved);
        assert!(!plan.shuffled);
    }
}

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};

use quiz_core::model::{AreaKey, Question, QuestionIndex};

/// Random permutations tried before falling back to a rotation.
pub const MAX_SHUFFLE_ATTEMPTS: usize = 5;

/// Returns a display order for `options`.
///
/// With two or more distinct values the result never equals `previous`:
/// after `MAX_SHUFFLE_ATTEMPTS` unlucky draws the candidate is rotated by one
/// position, which changes any list that is not constant.
pub fn shuffle_options<R: Rng + ?Sized>(
    options: &[String],
    previous: Option<&[String]>,
    rng: &mut R,
) -> Vec<String> {
    let distinct: HashSet<&String> = options.iter().collect();
    if distinct.len() < 2 {
        return options.to_vec();
    }

    let mut candidate = options.to_vec();
    for _ in 0..MAX_SHUFFLE_ATTEMPTS {
        candidate.shuffle(rng);
        if previous != Some(candidate.as_slice()) {
            return candidate;
        }
    }
    candidate.rotate_left(1);
    candidate
}

/// Option orders shown in the current run and the run before it.
///
/// Lives as long as the engine; forgotten when another area is entered.
#[derive(Debug, Clone, Default)]
pub struct AnswerOrderMemory {
    area: Option<AreaKey>,
    current: HashMap<QuestionIndex, Vec<String>>,
    previous: HashMap<QuestionIndex, Vec<String>>,
}

impl AnswerOrderMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `area`, dropping everything remembered for another area.
    pub fn enter_area(&mut self, area: &AreaKey) {
        if self.area.as_ref() != Some(area) {
            self.current.clear();
            self.previous.clear();
            self.area = Some(area.clone());
        }
    }

    /// Start a new run of the same area: this run's orders become "previous".
    pub fn begin_run(&mut self) {
        if !self.current.is_empty() {
            self.previous = std::mem::take(&mut self.current);
        }
    }

    /// Display order for a question in this run, computed once per run.
    pub fn display_order<R: Rng + ?Sized>(
        &mut self,
        question: &Question,
        shuffle: bool,
        rng: &mut R,
    ) -> Vec<String> {
        let Some(options) = question.options() else {
            return Vec::new();
        };
        if let Some(order) = self.current.get(&question.index()) {
            return order.clone();
        }
        let order = if shuffle {
            let previous = self.previous.get(&question.index()).map(Vec::as_slice);
            shuffle_options(options, previous, rng)
        } else {
            options.to_vec()
        };
        self.current.insert(question.index(), order.clone());
        order
    }

    #[must_use]
    pub fn current(&self, index: QuestionIndex) -> Option<&[String]> {
        self.current.get(&index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn previous(&self, index: QuestionIndex) -> Option<&[String]> {
        self.previous.get(&index).map(Vec::as_slice)
    }
}

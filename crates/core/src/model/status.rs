use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::model::ids::QuestionIndex;

/// Answer state of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Correct,
    Fail,
    Pending,
}

impl QuestionStatus {
    #[must_use]
    pub fn from_outcome(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Fail }
    }

    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Status per question index for one area.
///
/// Serialized as a JSON object keyed by index (`{"0":"pending","3":"fail"}`),
/// which is the persisted `quizStatus_<area>` format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMap(BTreeMap<QuestionIndex, QuestionStatus>);

impl StatusMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every index starts pending.
    #[must_use]
    pub fn all_pending(indices: impl IntoIterator<Item = QuestionIndex>) -> Self {
        Self(
            indices
                .into_iter()
                .map(|i| (i, QuestionStatus::Pending))
                .collect(),
        )
    }

    /// Tracks exactly `indices`, keeping any status already saved for them.
    #[must_use]
    pub fn merged(saved: Option<&StatusMap>, indices: impl IntoIterator<Item = QuestionIndex>) -> Self {
        Self(
            indices
                .into_iter()
                .map(|i| {
                    let status = saved
                        .and_then(|s| s.get(i))
                        .unwrap_or(QuestionStatus::Pending);
                    (i, status)
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, index: QuestionIndex) -> Option<QuestionStatus> {
        self.0.get(&index).copied()
    }

    /// Overwrites the status of `index`; re-answering never adds an entry.
    pub fn record(&mut self, index: QuestionIndex, correct: bool) {
        self.0.insert(index, QuestionStatus::from_outcome(correct));
    }

    pub fn set(&mut self, index: QuestionIndex, status: QuestionStatus) {
        self.0.insert(index, status);
    }

    /// Drops indices that no longer exist in the question bank.
    pub fn retain_domain(&mut self, domain: &HashSet<QuestionIndex>) {
        self.0.retain(|index, _| domain.contains(index));
    }

    #[must_use]
    pub fn contains(&self, index: QuestionIndex) -> bool {
        self.0.contains_key(&index)
    }

    pub fn indices(&self) -> impl Iterator<Item = QuestionIndex> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionIndex, QuestionStatus)> + '_ {
        self.0.iter().map(|(i, s)| (*i, *s))
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.0.values().any(|s| s.is_pending())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Counts over the given session indices; untracked ones count as pending.
    #[must_use]
    pub fn counts(&self, session: impl IntoIterator<Item = QuestionIndex>) -> ProgressCounts {
        let mut counts = ProgressCounts::default();
        for index in session {
            counts.total += 1;
            match self.get(index).unwrap_or(QuestionStatus::Pending) {
                QuestionStatus::Correct => counts.correct += 1,
                QuestionStatus::Fail => counts.fail += 1,
                QuestionStatus::Pending => counts.pending += 1,
            }
        }
        counts
    }
}

/// Tally of a session's statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounts {
    pub total: usize,
    pub correct: usize,
    pub fail: usize,
    pub pending: usize,
}

impl ProgressCounts {
    #[must_use]
    pub fn answered(&self) -> usize {
        self.correct + self.fail
    }

    /// True once a non-empty session has no pending question.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.pending == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: u32) -> QuestionIndex {
        QuestionIndex::new(i)
    }

    #[test]
    fn persisted_format_round_trips() {
        let mut map = StatusMap::all_pending([idx(0), idx(2)]);
        map.record(idx(2), false);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"0":"pending","2":"fail"}"#);
        let back: StatusMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn reanswering_overwrites() {
        let mut map = StatusMap::all_pending([idx(0), idx(1)]);
        map.record(idx(0), false);
        map.record(idx(0), true);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(idx(0)), Some(QuestionStatus::Correct));
    }

    #[test]
    fn merged_keeps_saved_and_fills_pending() {
        let mut saved = StatusMap::new();
        saved.record(idx(1), true);
        saved.record(idx(9), false);
        let merged = StatusMap::merged(Some(&saved), [idx(0), idx(1)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(idx(0)), Some(QuestionStatus::Pending));
        assert_eq!(merged.get(idx(1)), Some(QuestionStatus::Correct));
        assert!(!merged.contains(idx(9)));
    }

    #[test]
    fn counts_and_completion() {
        let mut map = StatusMap::all_pending([idx(0), idx(1), idx(2)]);
        map.record(idx(0), true);
        map.record(idx(1), false);
        let counts = map.counts(map.indices().collect::<Vec<_>>());
        assert_eq!(counts.total, 3);
        assert_eq!(counts.answered(), 2);
        assert!(!counts.is_complete());

        map.record(idx(2), true);
        assert!(map.counts([idx(0), idx(1), idx(2)]).is_complete());
        assert!(!ProgressCounts::default().is_complete());
    }

    #[test]
    fn retain_domain_drops_vanished_questions() {
        let mut map = StatusMap::all_pending([idx(0), idx(5)]);
        map.retain_domain(&[idx(0)].into_iter().collect());
        assert_eq!(map.indices().collect::<Vec<_>>(), vec![idx(0)]);
    }
}

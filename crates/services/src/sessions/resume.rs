//! Decision taken when an area is entered.

use std::collections::{BTreeSet, HashSet};

use quiz_core::model::{Question, QuestionIndex, QuestionStatus, StatusMap};
use storage::SavedProgress;

use crate::sessions::plan::{Selection, SessionPlan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeDecision {
    /// Nothing saved: show the menu.
    Fresh,
    /// Every tracked question answered: show the menu, drop the cursor.
    Completed,
    /// Rebuild the session from `selection` and continue it.
    Resume {
        selection: Selection,
        status: StatusMap,
        cursor: Option<usize>,
    },
}

/// Reconcile saved progress with a freshly loaded bank.
///
/// Saved entries for indices the bank no longer has are dropped. The saved
/// subset, when present, wins over the status keys as the session domain and
/// keeps its persisted order.
#[must_use]
pub fn decide(bank: &[Question], saved: &SavedProgress) -> ResumeDecision {
    if saved.status.is_none() && saved.cursor.is_none() {
        return ResumeDecision::Fresh;
    }

    let domain: HashSet<QuestionIndex> = bank.iter().map(Question::index).collect();
    let mut status = saved.status.clone().unwrap_or_default();
    status.retain_domain(&domain);

    let selection = match &saved.selected {
        Some(selected) => {
            let kept: Vec<QuestionIndex> = selected
                .iter()
                .copied()
                .filter(|i| domain.contains(i))
                .collect();
            if kept.is_empty() {
                return ResumeDecision::Fresh;
            }
            Selection::Saved(kept)
        }
        None => {
            let tracked: BTreeSet<QuestionIndex> = status.indices().collect();
            if tracked.is_empty() {
                return ResumeDecision::Fresh;
            }
            Selection::Questions(tracked)
        }
    };

    let session: Vec<QuestionIndex> = match &selection {
        Selection::Saved(indices) => indices.clone(),
        Selection::Questions(indices) => indices.iter().copied().collect(),
        Selection::All | Selection::Sections(_) => Vec::new(),
    };
    let status = StatusMap::merged(Some(&status), session);
    if !status.has_pending() {
        return ResumeDecision::Completed;
    }

    ResumeDecision::Resume {
        selection,
        status,
        cursor: saved.cursor,
    }
}

/// Drop saved entries for questions the bank no longer has.
///
/// Returns the cleaned progress when a status key or subset entry was
/// removed, `None` when the saved slots already fit the bank.
#[must_use]
pub fn prune_saved(bank: &[Question], saved: &SavedProgress) -> Option<SavedProgress> {
    let domain: HashSet<QuestionIndex> = bank.iter().map(Question::index).collect();
    let mut pruned = saved.clone();
    if let Some(status) = pruned.status.as_mut() {
        status.retain_domain(&domain);
    }
    if let Some(selected) = pruned.selected.as_mut() {
        selected.retain(|i| domain.contains(i));
    }
    (pruned != *saved).then_some(pruned)
}

/// Where a resumed session opens.
///
/// A saved cursor inside the session wins; an out-of-range one is ignored
/// in favour of the first pending question, then the first question.
#[must_use]
pub fn resume_position(plan: &SessionPlan, status: &StatusMap, cursor: Option<usize>) -> usize {
    if let Some(cursor) = cursor.filter(|c| *c < plan.total()) {
        return cursor;
    }
    plan.questions
        .iter()
        .position(|q| status.get(q.index()).is_none_or(QuestionStatus::is_pending))
        .unwrap_or(0)
}

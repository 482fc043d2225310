use quiz_core::model::{
    AreaKey, ProgressCounts, Question, QuestionIndex, QuestionStatus, RunId, StatusMap,
};
use storage::StorageError;

use super::plan::SessionPlan;
use super::progress::ProgressTracker;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One ordered run through part of an area's bank.
///
/// Positions are offsets into the session list; status is keyed by stable
/// question index so reordering never loses progress.
#[derive(Clone)]
pub struct QuizSession {
    area: AreaKey,
    run_id: RunId,
    plan: SessionPlan,
    tracker: ProgressTracker,
}

impl QuizSession {
    #[must_use]
    pub fn new(area: AreaKey, plan: SessionPlan, tracker: ProgressTracker) -> Self {
        Self {
            area,
            run_id: RunId::new_v4(),
            plan,
            tracker,
        }
    }

    #[must_use]
    pub fn area(&self) -> &AreaKey {
        &self.area
    }

    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.plan.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.plan.total()
    }

    #[must_use]
    pub fn shuffled(&self) -> bool {
        self.plan.shuffled
    }

    #[must_use]
    pub fn question_at(&self, position: usize) -> Option<&Question> {
        self.plan.questions.get(position)
    }

    #[must_use]
    pub fn status(&self) -> &StatusMap {
        self.tracker.status()
    }

    #[must_use]
    pub fn status_of(&self, index: QuestionIndex) -> QuestionStatus {
        self.tracker.status_of(index)
    }

    #[must_use]
    pub fn counts(&self) -> ProgressCounts {
        self.tracker.counts(&self.plan.questions)
    }

    #[must_use]
    pub fn pending_questions(&self) -> Vec<(usize, &Question)> {
        self.tracker.pending_questions(&self.plan.questions)
    }

    #[must_use]
    pub fn next_pending_after(&self, position: usize) -> Option<usize> {
        self.tracker.next_pending_after(&self.plan.questions, position)
    }

    #[must_use]
    pub fn first_pending(&self) -> Option<usize> {
        self.tracker.first_pending(&self.plan.questions)
    }

    /// No pending question left in the session.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.counts().is_complete()
    }

    pub(crate) async fn persist_status(&self) -> Result<(), StorageError> {
        self.tracker.persist().await
    }

    pub(crate) async fn record_answer(
        &mut self,
        index: QuestionIndex,
        correct: bool,
    ) -> Result<(), StorageError> {
        self.tracker.record_answer(index, correct).await
    }
}

use quiz_core::model::{AreaKey, ProgressCounts, Question, QuestionIndex, QuestionStatus, StatusMap};
use storage::{ProgressStore, StorageError};

/// Status map of the open area, written through on every change.
#[derive(Clone)]
pub struct ProgressTracker {
    area: AreaKey,
    status: StatusMap,
    store: ProgressStore,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(area: AreaKey, status: StatusMap, store: ProgressStore) -> Self {
        Self {
            area,
            status,
            store,
        }
    }

    #[must_use]
    pub fn status(&self) -> &StatusMap {
        &self.status
    }

    #[must_use]
    pub fn status_of(&self, index: QuestionIndex) -> QuestionStatus {
        self.status.get(index).unwrap_or(QuestionStatus::Pending)
    }

    /// Persist the whole map as it is now.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn persist(&self) -> Result<(), StorageError> {
        self.store.save_status(&self.area, &self.status).await
    }

    /// Mark a question correct or failed and persist the map.
    ///
    /// Re-answering overwrites the earlier status.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; the in-memory status is
    /// already updated at that point.
    pub async fn record_answer(
        &mut self,
        index: QuestionIndex,
        correct: bool,
    ) -> Result<(), StorageError> {
        self.status.record(index, correct);
        self.persist().await
    }

    /// Session questions still pending, with their session positions.
    #[must_use]
    pub fn pending_questions<'a>(&self, session: &'a [Question]) -> Vec<(usize, &'a Question)> {
        session
            .iter()
            .enumerate()
            .filter(|(_, q)| self.status_of(q.index()).is_pending())
            .collect()
    }

    /// First pending position after `position`, wrapping around.
    #[must_use]
    pub fn next_pending_after(&self, session: &[Question], position: usize) -> Option<usize> {
        let len = session.len();
        (1..=len)
            .map(|step| (position + step) % len)
            .find(|p| self.status_of(session[*p].index()).is_pending())
    }

    #[must_use]
    pub fn first_pending(&self, session: &[Question]) -> Option<usize> {
        session
            .iter()
            .position(|q| self.status_of(q.index()).is_pending())
    }

    #[must_use]
    pub fn counts(&self, session: &[Question]) -> ProgressCounts {
        self.status.counts(session.iter().map(Question::index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionRecord;
    use std::sync::Arc;
    use storage::InMemoryStore;

    fn q(index: u32) -> Question {
        Question::from_record(
            QuestionIndex::new(index),
            QuestionRecord {
                section: "S".into(),
                number: index + 1,
                question: "Q".into(),
                answer: "V".into(),
                explanation: String::new(),
                options: None,
                appears_in: None,
            },
        )
    }

    fn tracker(session: &[Question]) -> (ProgressStore, ProgressTracker) {
        let store = ProgressStore::new(Arc::new(InMemoryStore::new()));
        let status = StatusMap::all_pending(session.iter().map(Question::index));
        let tracker = ProgressTracker::new(AreaKey::new("a"), status, store.clone());
        (store, tracker)
    }

    #[tokio::test]
    async fn record_answer_persists_and_overwrites() {
        let session = vec![q(0), q(1), q(2)];
        let (store, mut tracker) = tracker(&session);

        tracker.record_answer(QuestionIndex::new(1), false).await.unwrap();
        tracker.record_answer(QuestionIndex::new(1), true).await.unwrap();

        assert_eq!(tracker.status().len(), 3);
        let saved = store.load(&AreaKey::new("a")).await.unwrap();
        assert_eq!(
            saved.status.unwrap().get(QuestionIndex::new(1)),
            Some(QuestionStatus::Correct)
        );
        let pending: Vec<usize> = tracker
            .pending_questions(&session)
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(pending, vec![0, 2]);
    }

    #[tokio::test]
    async fn next_pending_wraps_and_ends() {
        let session = vec![q(0), q(1), q(2)];
        let (_, mut tracker) = tracker(&session);
        tracker.record_answer(QuestionIndex::new(2), true).await.unwrap();
        assert_eq!(tracker.next_pending_after(&session, 1), Some(0));

        tracker.record_answer(QuestionIndex::new(0), true).await.unwrap();
        assert_eq!(tracker.next_pending_after(&session, 0), Some(1));
        assert_eq!(tracker.next_pending_after(&session, 1), Some(1));

        tracker.record_answer(QuestionIndex::new(1), false).await.unwrap();
        assert_eq!(tracker.next_pending_after(&session, 1), None);
        assert_eq!(tracker.first_pending(&session), None);
        assert!(tracker.counts(&session).is_complete());
    }

    #[test]
    fn next_pending_on_empty_session() {
        let (_, tracker) = tracker(&[]);
        assert_eq!(tracker.next_pending_after(&[], 0), None);
    }
}

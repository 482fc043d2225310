use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

use quiz_core::model::{AreaKey, QuestionIndex, StatusMap};

use crate::keys::{AreaKeys, CURRENT_AREA, LEGACY_STATUS};
use crate::repository::{KeyValueStore, StorageError};

/// Everything persisted for one area, each slot independently optional.
///
/// Slots are written one by one, so any combination may be present after an
/// interrupted write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedProgress {
    pub status: Option<StatusMap>,
    pub cursor: Option<usize>,
    pub selected: Option<Vec<QuestionIndex>>,
    pub sections: Option<Vec<String>>,
    pub shuffle_questions: Option<bool>,
    pub shuffle_answers: Option<bool>,
}

/// Typed access to the per-area key family on top of a `KeyValueStore`.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialization(format!("{key}: {err}")))?;
        self.kv.set(key, &raw).await
    }

    /// Read every slot of an area.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a slot holds malformed JSON.
    pub async fn load(&self, area: &AreaKey) -> Result<SavedProgress, StorageError> {
        let keys = AreaKeys::for_area(area);
        Ok(SavedProgress {
            status: self.read_json(&keys.status).await?,
            cursor: self.read_json(&keys.current_question).await?,
            selected: self.read_json(&keys.selected_questions).await?,
            sections: self.read_json(&keys.selected_sections).await?,
            shuffle_questions: self.read_json(&keys.shuffle_questions).await?,
            shuffle_answers: self.read_json(&keys.shuffle_answers).await?,
        })
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_status(&self, area: &AreaKey, status: &StatusMap) -> Result<(), StorageError> {
        self.write_json(&AreaKeys::for_area(area).status, status).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_cursor(&self, area: &AreaKey, cursor: usize) -> Result<(), StorageError> {
        self.write_json(&AreaKeys::for_area(area).current_question, &cursor)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    pub async fn clear_cursor(&self, area: &AreaKey) -> Result<(), StorageError> {
        self.kv
            .remove(&AreaKeys::for_area(area).current_question)
            .await
    }

    /// Store the session's indices in session order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_selection(
        &self,
        area: &AreaKey,
        indices: &[QuestionIndex],
    ) -> Result<(), StorageError> {
        self.write_json(&AreaKeys::for_area(area).selected_questions, indices)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_sections(&self, area: &AreaKey, sections: &[String]) -> Result<(), StorageError> {
        self.write_json(&AreaKeys::for_area(area).selected_sections, sections)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_shuffle_questions(&self, area: &AreaKey, on: bool) -> Result<(), StorageError> {
        self.write_json(&AreaKeys::for_area(area).shuffle_questions, &on)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_shuffle_answers(&self, area: &AreaKey, on: bool) -> Result<(), StorageError> {
        self.write_json(&AreaKeys::for_area(area).shuffle_answers, &on)
            .await
    }

    /// Forget status, cursor and selections of an area. Shuffle preferences stay.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a delete fails.
    pub async fn reset(&self, area: &AreaKey) -> Result<(), StorageError> {
        let keys = AreaKeys::for_area(area);
        for key in keys.session_keys() {
            self.kv.remove(key).await?;
        }
        debug!(area = %area, "cleared persisted session");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be read or decoded.
    pub async fn current_area(&self) -> Result<Option<AreaKey>, StorageError> {
        self.read_json(CURRENT_AREA).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn set_current_area(&self, area: &AreaKey) -> Result<(), StorageError> {
        self.write_json(CURRENT_AREA, area).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    pub async fn clear_current_area(&self) -> Result<(), StorageError> {
        self.kv.remove(CURRENT_AREA).await
    }

    /// Move the pre-namespacing global status into `target`'s key.
    ///
    /// The legacy key is always deleted once seen; its content is copied only
    /// when `target` has no status of its own. Returns whether a copy happened.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if reading or writing a key fails.
    pub async fn migrate_legacy_status(&self, target: &AreaKey) -> Result<bool, StorageError> {
        let Some(raw) = self.kv.get(LEGACY_STATUS).await? else {
            return Ok(false);
        };
        let keys = AreaKeys::for_area(target);
        let copied = if self.kv.get(&keys.status).await?.is_none() {
            self.kv.set(&keys.status, &raw).await?;
            true
        } else {
            false
        };
        self.kv.remove(LEGACY_STATUS).await?;
        info!(area = %target, copied, "migrated legacy quiz status");
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;

    fn idx(i: u32) -> QuestionIndex {
        QuestionIndex::new(i)
    }

    fn store() -> (InMemoryStore, ProgressStore) {
        let kv = InMemoryStore::new();
        let progress = ProgressStore::new(Arc::new(kv.clone()));
        (kv, progress)
    }

    #[tokio::test]
    async fn empty_area_loads_default() {
        let (_, progress) = store();
        let saved = progress.load(&AreaKey::new("log1")).await.unwrap();
        assert_eq!(saved, SavedProgress::default());
    }

    #[tokio::test]
    async fn slots_round_trip_in_persisted_format() {
        let (kv, progress) = store();
        let area = AreaKey::new("ipc");
        let mut status = StatusMap::all_pending([idx(0), idx(1)]);
        status.record(idx(1), true);

        progress.save_status(&area, &status).await.unwrap();
        progress.save_cursor(&area, 1).await.unwrap();
        progress.save_selection(&area, &[idx(1), idx(0)]).await.unwrap();
        progress.save_shuffle_questions(&area, false).await.unwrap();

        assert_eq!(
            kv.get("quizStatus_ipc").await.unwrap().as_deref(),
            Some(r#"{"0":"pending","1":"correct"}"#)
        );
        assert_eq!(kv.get("currentQuestion_ipc").await.unwrap().as_deref(), Some("1"));
        assert_eq!(kv.get("selectedQuestions_ipc").await.unwrap().as_deref(), Some("[1,0]"));

        let saved = progress.load(&area).await.unwrap();
        assert_eq!(saved.status, Some(status));
        assert_eq!(saved.cursor, Some(1));
        assert_eq!(saved.selected, Some(vec![idx(1), idx(0)]));
        assert_eq!(saved.shuffle_questions, Some(false));
        assert_eq!(saved.shuffle_answers, None);
    }

    #[tokio::test]
    async fn reset_keeps_preferences_and_other_areas() {
        let (_, progress) = store();
        let a = AreaKey::new("a");
        let b = AreaKey::new("b");
        for area in [&a, &b] {
            progress
                .save_status(area, &StatusMap::all_pending([idx(0)]))
                .await
                .unwrap();
            progress.save_cursor(area, 0).await.unwrap();
        }
        progress.save_shuffle_answers(&a, false).await.unwrap();

        progress.reset(&a).await.unwrap();

        let saved_a = progress.load(&a).await.unwrap();
        assert!(saved_a.status.is_none());
        assert!(saved_a.cursor.is_none());
        assert_eq!(saved_a.shuffle_answers, Some(false));
        let saved_b = progress.load(&b).await.unwrap();
        assert!(saved_b.status.is_some());
        assert_eq!(saved_b.cursor, Some(0));
    }

    #[tokio::test]
    async fn malformed_slot_is_a_serialization_error() {
        let (kv, progress) = store();
        kv.set("quizStatus_x", "{not json").await.unwrap();
        let err = progress.load(&AreaKey::new("x")).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn legacy_status_moves_once() {
        let (kv, progress) = store();
        let area = AreaKey::new("log1");
        kv.set(LEGACY_STATUS, r#"{"0":"correct"}"#).await.unwrap();

        assert!(progress.migrate_legacy_status(&area).await.unwrap());
        assert!(kv.get(LEGACY_STATUS).await.unwrap().is_none());
        let saved = progress.load(&area).await.unwrap();
        assert_eq!(
            saved.status.unwrap().get(idx(0)),
            Some(quiz_core::model::QuestionStatus::Correct)
        );

        assert!(!progress.migrate_legacy_status(&area).await.unwrap());
    }

    #[tokio::test]
    async fn legacy_status_never_overwrites_namespaced_status() {
        let (kv, progress) = store();
        let area = AreaKey::new("log1");
        kv.set(LEGACY_STATUS, r#"{"0":"fail"}"#).await.unwrap();
        kv.set("quizStatus_log1", r#"{"0":"correct"}"#).await.unwrap();

        assert!(!progress.migrate_legacy_status(&area).await.unwrap());
        assert!(kv.get(LEGACY_STATUS).await.unwrap().is_none());
        assert_eq!(
            kv.get("quizStatus_log1").await.unwrap().as_deref(),
            Some(r#"{"0":"correct"}"#)
        );
    }

    #[tokio::test]
    async fn current_area_pointer() {
        let (kv, progress) = store();
        progress.set_current_area(&AreaKey::new("ipc")).await.unwrap();
        assert_eq!(kv.get(CURRENT_AREA).await.unwrap().as_deref(), Some("\"ipc\""));
        assert_eq!(
            progress.current_area().await.unwrap(),
            Some(AreaKey::new("ipc"))
        );
        progress.clear_current_area().await.unwrap();
        assert_eq!(progress.current_area().await.unwrap(), None);
    }
}

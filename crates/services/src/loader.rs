//! Area catalog and question bank loading.

use tracing::{debug, warn};

use quiz_core::model::{Area, Catalog, Question, QuestionIndex, QuestionRecord};

use crate::error::{LoadError, LoadTarget};
use crate::source::QuestionSource;

/// Fetch and validate the area catalog.
///
/// # Errors
///
/// Returns a `LoadError` for fetch failures and for catalogs with invalid or
/// colliding areas.
pub async fn load_catalog(source: &dyn QuestionSource) -> Result<Catalog, LoadError> {
    let fail = |message: String| LoadError {
        target: LoadTarget::Catalog,
        message,
    };
    let records = source
        .fetch_catalog()
        .await
        .map_err(|err| fail(err.to_string()))?;
    let catalog = Catalog::from_records(records).map_err(|err| fail(err.to_string()))?;
    debug!(areas = catalog.len(), "catalog loaded");
    Ok(catalog)
}

/// Fetch an area's questions and assign indices in load order.
///
/// # Errors
///
/// Returns a `LoadError` targeting the area when the fetch fails.
pub async fn load_bank(source: &dyn QuestionSource, area: &Area) -> Result<Vec<Question>, LoadError> {
    let records = source
        .fetch_questions(area.file())
        .await
        .map_err(|err| LoadError {
            target: LoadTarget::Area(area.key().clone()),
            message: err.to_string(),
        })?;
    let bank = index_questions(records);
    for question in &bank {
        if let Err(err) = question.check_literal_answer() {
            warn!(area = %area.key(), %err, "question answer is not a literal option");
        }
    }
    debug!(area = %area.key(), questions = bank.len(), "question bank loaded");
    Ok(bank)
}

/// Positions in the source array become the stable indices.
#[must_use]
pub fn index_questions(records: Vec<QuestionRecord>) -> Vec<Question> {
    records
        .into_iter()
        .zip(0_u32..)
        .map(|(record, i)| Question::from_record(QuestionIndex::new(i), record))
        .collect()
}

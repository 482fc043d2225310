use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use quiz_core::Clock;
use quiz_core::model::{
    AnswerChoice, Area, AreaKey, Catalog, ProgressCounts, Question, QuestionIndex, SectionGroup,
    StatusMap, group_by_section, section_names,
};
use storage::{KeyValueStore, ProgressStore, SavedProgress};

use crate::error::{LoadError, LoadTarget, QuizError};
use crate::events::{EventSink, QuizEvent, QuizEventKind, TracingEventSink};
use crate::loader;
use crate::source::QuestionSource;

use super::options::AnswerOrderMemory;
use super::plan::{Selection, SessionOrderer};
use super::progress::ProgressTracker;
use super::resume::{self, ResumeDecision};
use super::rng::SessionRng;
use super::service::QuizSession;
use super::view::{AnswerOutcome, QuestionView, Screen};

//
// ─── PREFERENCES ───────────────────────────────────────────────────────────────
//

/// Per-area order preferences. Both default to shuffled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShufflePrefs {
    pub questions: bool,
    pub answers: bool,
}

impl Default for ShufflePrefs {
    fn default() -> Self {
        Self {
            questions: true,
            answers: true,
        }
    }
}

impl ShufflePrefs {
    fn from_saved(saved: &SavedProgress) -> Self {
        let defaults = Self::default();
        Self {
            questions: saved.shuffle_questions.unwrap_or(defaults.questions),
            answers: saved.shuffle_answers.unwrap_or(defaults.answers),
        }
    }
}

/// Result of an explicit start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStart {
    Started { total: usize },
    /// The selection matched no question; back on the menu.
    Empty,
}

struct OpenArea {
    area: Area,
    bank: Vec<Question>,
    prefs: ShufflePrefs,
    session: Option<QuizSession>,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// The quiz state machine.
///
/// Every operation runs to completion, persisting as it goes, before the
/// next one is accepted. Operations that do not apply to the current screen
/// fail with `QuizError::InvalidTransition` and leave the state untouched.
pub struct QuizEngine {
    source: Arc<dyn QuestionSource>,
    progress: ProgressStore,
    clock: Clock,
    rng: SessionRng,
    events: Arc<dyn EventSink>,
    catalog: Option<Catalog>,
    load_error: Option<LoadError>,
    screen: Screen,
    open: Option<OpenArea>,
    answer_orders: AnswerOrderMemory,
}

impl QuizEngine {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            source,
            progress: ProgressStore::new(kv),
            clock: Clock::default(),
            rng: SessionRng::default(),
            events: Arc::new(TracingEventSink),
            catalog: None,
            load_error: None,
            screen: Screen::AreaSelection,
            open: None,
            answer_orders: AnswerOrderMemory::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_rng(mut self, rng: SessionRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    // ─── accessors ───

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    /// The last fetch failure, cleared by a successful load.
    #[must_use]
    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    #[must_use]
    pub fn area(&self) -> Option<&Area> {
        self.open.as_ref().map(|open| &open.area)
    }

    /// Questions of the open area in load order; empty if none is open or
    /// its fetch failed.
    #[must_use]
    pub fn bank(&self) -> &[Question] {
        self.open
            .as_ref()
            .map(|open| open.bank.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.open.as_ref().and_then(|open| open.session.as_ref())
    }

    #[must_use]
    pub fn prefs(&self) -> Option<ShufflePrefs> {
        self.open.as_ref().map(|open| open.prefs)
    }

    #[must_use]
    pub fn counts(&self) -> Option<ProgressCounts> {
        self.session().map(QuizSession::counts)
    }

    #[must_use]
    pub fn pending_questions(&self) -> Vec<(usize, &Question)> {
        self.session()
            .map(QuizSession::pending_questions)
            .unwrap_or_default()
    }

    /// Sections of the open area, for the pickers.
    #[must_use]
    pub fn section_groups(&self) -> Vec<SectionGroup<'_>> {
        group_by_section(self.bank())
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.rng.seed()
    }

    /// The question on screen, with options in the order they are shown.
    #[must_use]
    pub fn question_view(&self) -> Option<QuestionView<'_>> {
        let position = match &self.screen {
            Screen::Question { position } | Screen::Result { position, .. } => *position,
            _ => return None,
        };
        let session = self.session()?;
        let question = session.question_at(position)?;
        let options = self
            .answer_orders
            .current(question.index())
            .or_else(|| question.options())
            .unwrap_or(&[]);
        Some(QuestionView {
            position,
            question,
            options,
            counts: session.counts(),
        })
    }

    // ─── catalog & areas ───

    /// Fetch the catalog and return to area selection.
    ///
    /// A fetch failure is kept as `load_error` and leaves the catalog empty.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the legacy status migration fails.
    pub async fn load_catalog(&mut self) -> Result<(), QuizError> {
        self.open = None;
        self.screen = Screen::AreaSelection;
        match loader::load_catalog(self.source.as_ref()).await {
            Ok(catalog) => {
                if let Some(first) = catalog.first() {
                    self.progress.migrate_legacy_status(first.key()).await?;
                }
                info!(areas = catalog.len(), "catalog ready");
                self.catalog = Some(catalog);
                self.load_error = None;
            }
            Err(err) => {
                self.catalog = None;
                self.fail_load(err);
            }
        }
        Ok(())
    }

    /// Repeat the fetch that failed last. No-op without a load error.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if persisted state cannot be read or written.
    pub async fn retry_load(&mut self) -> Result<(), QuizError> {
        let Some(err) = self.load_error.clone() else {
            return Ok(());
        };
        debug!(load = %err.target, "retrying load");
        match err.target {
            LoadTarget::Catalog => self.load_catalog().await,
            LoadTarget::Area(key) => {
                let area = self.catalog_area(&key)?.clone();
                self.enter_area(area).await
            }
        }
    }

    /// Re-enter the area that was open when the application last ran.
    ///
    /// Returns whether an area was entered.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if persisted state cannot be read or written.
    pub async fn restore_last_area(&mut self) -> Result<bool, QuizError> {
        if self.screen != Screen::AreaSelection {
            return Ok(false);
        }
        let Some(key) = self.progress.current_area().await? else {
            return Ok(false);
        };
        let Ok(area) = self.catalog_area(&key).cloned() else {
            warn!(area = %key, "last area is no longer in the catalog");
            self.progress.clear_current_area().await?;
            return Ok(false);
        };
        self.enter_area(area).await?;
        Ok(true)
    }

    /// Enter an area: load its bank and saved state, then resume or show the menu.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownArea` for keys outside the catalog,
    /// `QuizError::InvalidTransition` outside area selection, and
    /// `QuizError::Storage` on persistence failures.
    pub async fn select_area(&mut self, key: &AreaKey) -> Result<(), QuizError> {
        self.require(self.screen == Screen::AreaSelection, "select an area")?;
        let area = self.catalog_area(key)?.clone();
        self.enter_area(area).await
    }

    /// [`Self::select_area`] by 1-based catalog position.
    ///
    /// # Errors
    ///
    /// As `select_area`; `QuizError::NoAreaAtPosition` for a position
    /// outside the catalog.
    pub async fn select_area_at(&mut self, position: usize) -> Result<(), QuizError> {
        self.require(self.screen == Screen::AreaSelection, "select an area")?;
        let key = self
            .catalog
            .as_ref()
            .and_then(|catalog| catalog.by_position(position))
            .map(|area| area.key().clone())
            .ok_or(QuizError::NoAreaAtPosition(position))?;
        self.select_area(&key).await
    }

    /// Leave the open area. Its persisted progress is kept.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` when no area is open and
    /// `QuizError::Storage` if the pointer cannot be removed.
    pub async fn change_area(&mut self) -> Result<(), QuizError> {
        self.require(self.open.is_some(), "change area")?;
        self.progress.clear_current_area().await?;
        if let Some(open) = self.open.take() {
            debug!(area = %open.area.key(), "left area");
        }
        if matches!(
            self.load_error,
            Some(LoadError {
                target: LoadTarget::Area(_),
                ..
            })
        ) {
            self.load_error = None;
        }
        self.screen = Screen::AreaSelection;
        Ok(())
    }

    async fn enter_area(&mut self, area: Area) -> Result<(), QuizError> {
        let key = area.key().clone();
        self.progress.set_current_area(&key).await?;
        self.answer_orders.enter_area(&key);
        let saved = self.progress.load(&key).await?;
        let prefs = ShufflePrefs::from_saved(&saved);

        let (bank, decision) = match loader::load_bank(self.source.as_ref(), &area).await {
            Ok(bank) => {
                self.load_error = None;
                let saved = match resume::prune_saved(&bank, &saved) {
                    Some(pruned) => {
                        self.store_pruned(&key, &pruned).await?;
                        pruned
                    }
                    None => saved,
                };
                let decision = resume::decide(&bank, &saved);
                (bank, decision)
            }
            Err(err) => {
                self.fail_load(err);
                (Vec::new(), ResumeDecision::Fresh)
            }
        };

        let mut open = OpenArea {
            area,
            bank,
            prefs,
            session: None,
        };
        let mut resume_at = None;
        match decision {
            ResumeDecision::Fresh => debug!(area = %key, "nothing to resume"),
            ResumeDecision::Completed => {
                self.progress.clear_cursor(&key).await?;
                debug!(area = %key, "previous run complete, not resuming");
            }
            ResumeDecision::Resume {
                selection,
                status,
                cursor,
            } => {
                let plan = SessionOrderer::new(&open.bank)
                    .with_shuffle(prefs.questions)
                    .build(&selection, &mut self.rng);
                let position = resume::resume_position(&plan, &status, cursor);
                let tracker = ProgressTracker::new(key.clone(), status, self.progress.clone());
                let session = QuizSession::new(key.clone(), plan, tracker);
                session.persist_status().await?;
                info!(area = %key, position, total = session.total(), "resuming session");
                open.session = Some(session);
                resume_at = Some(position);
            }
        }

        self.open = Some(open);
        self.screen = Screen::MenuSelection;
        self.emit(QuizEventKind::AreaSelected {
            area: key,
            resumed: resume_at.is_some(),
        });
        if let Some(position) = resume_at {
            self.go_to(position).await?;
        }
        Ok(())
    }

    async fn store_pruned(&self, key: &AreaKey, pruned: &SavedProgress) -> Result<(), QuizError> {
        if let Some(status) = &pruned.status {
            self.progress.save_status(key, status).await?;
        }
        if let Some(selected) = &pruned.selected {
            self.progress.save_selection(key, selected).await?;
        }
        warn!(area = %key, "dropped saved progress for questions no longer in the bank");
        Ok(())
    }

    // ─── preferences ───

    /// Applies from the next explicit start.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the menu and
    /// `QuizError::Storage` if the flag cannot be saved.
    pub async fn set_shuffle_questions(&mut self, on: bool) -> Result<(), QuizError> {
        self.require(self.screen == Screen::MenuSelection, "change question order")?;
        let open = self.open.as_mut().ok_or(QuizError::NoAreaSelected)?;
        self.progress.save_shuffle_questions(open.area.key(), on).await?;
        open.prefs.questions = on;
        Ok(())
    }

    /// Applies from the next question shown.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoAreaSelected` without an open area and
    /// `QuizError::Storage` if the flag cannot be saved.
    pub async fn set_shuffle_answers(&mut self, on: bool) -> Result<(), QuizError> {
        let open = self.open.as_mut().ok_or(QuizError::NoAreaSelected)?;
        self.progress.save_shuffle_answers(open.area.key(), on).await?;
        open.prefs.answers = on;
        Ok(())
    }

    // ─── pickers ───

    /// Open the section picker, preselecting the sections chosen last time.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the menu and
    /// `QuizError::Storage` if saved sections cannot be read.
    pub async fn open_section_picker(&mut self) -> Result<(), QuizError> {
        self.require(self.screen == Screen::MenuSelection, "open the section picker")?;
        let key = self.open_key()?;
        let saved = self.progress.load(&key).await?.sections.unwrap_or_default();
        let known = section_names(self.bank());
        let selected = saved
            .into_iter()
            .filter(|name| known.contains(name))
            .collect();
        self.screen = Screen::SectionPicker { selected };
        Ok(())
    }

    /// Flip one section. Names that are not sections of the area are ignored.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the section picker.
    pub fn toggle_section(&mut self, name: &str) -> Result<(), QuizError> {
        let known = self.bank().iter().any(|q| q.section() == name);
        let Screen::SectionPicker { selected } = &mut self.screen else {
            return Err(self.invalid("toggle a section"));
        };
        if known && !selected.remove(name) {
            selected.insert(name.to_owned());
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the section picker.
    pub fn select_all_sections(&mut self) -> Result<(), QuizError> {
        let all: BTreeSet<String> = section_names(self.bank()).into_iter().collect();
        let Screen::SectionPicker { selected } = &mut self.screen else {
            return Err(self.invalid("select all sections"));
        };
        *selected = all;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the section picker.
    pub fn clear_sections(&mut self) -> Result<(), QuizError> {
        let Screen::SectionPicker { selected } = &mut self.screen else {
            return Err(self.invalid("clear sections"));
        };
        selected.clear();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the menu.
    pub fn open_question_picker(&mut self) -> Result<(), QuizError> {
        self.require(self.screen == Screen::MenuSelection, "open the question picker")?;
        self.screen = Screen::QuestionPicker {
            selected: BTreeSet::new(),
        };
        Ok(())
    }

    /// Flip one question. Indices outside the bank are ignored.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the question picker.
    pub fn toggle_question(&mut self, index: QuestionIndex) -> Result<(), QuizError> {
        let known = self.bank().iter().any(|q| q.index() == index);
        let Screen::QuestionPicker { selected } = &mut self.screen else {
            return Err(self.invalid("toggle a question"));
        };
        if known && !selected.remove(&index) {
            selected.insert(index);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the question picker.
    pub fn clear_questions(&mut self) -> Result<(), QuizError> {
        let Screen::QuestionPicker { selected } = &mut self.screen else {
            return Err(self.invalid("clear questions"));
        };
        selected.clear();
        Ok(())
    }

    /// Back to the menu from either picker.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the pickers.
    pub fn cancel_picker(&mut self) -> Result<(), QuizError> {
        self.require(
            matches!(
                self.screen,
                Screen::SectionPicker { .. } | Screen::QuestionPicker { .. }
            ),
            "cancel a picker",
        )?;
        self.screen = Screen::MenuSelection;
        Ok(())
    }

    // ─── explicit starts ───

    /// Start a fresh session over the whole bank.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the menu and
    /// `QuizError::Storage` on persistence failures.
    pub async fn start_all(&mut self) -> Result<SessionStart, QuizError> {
        self.require(self.screen == Screen::MenuSelection, "start a quiz")?;
        self.start(Selection::All).await
    }

    /// Start a fresh session over the sections chosen in the picker.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the section picker and
    /// `QuizError::Storage` on persistence failures.
    pub async fn start_sections(&mut self) -> Result<SessionStart, QuizError> {
        let Screen::SectionPicker { selected } = &self.screen else {
            return Err(self.invalid("start by sections"));
        };
        let selected = selected.clone();
        let ordered: Vec<String> = section_names(self.bank())
            .into_iter()
            .filter(|name| selected.contains(name))
            .collect();
        let started = self.start(Selection::Sections(selected)).await?;
        if let SessionStart::Started { .. } = started {
            let key = self.open_key()?;
            self.progress.save_sections(&key, &ordered).await?;
        }
        Ok(started)
    }

    /// Start a fresh session over the questions chosen in the picker.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the question picker and
    /// `QuizError::Storage` on persistence failures.
    pub async fn start_questions(&mut self) -> Result<SessionStart, QuizError> {
        let Screen::QuestionPicker { selected } = &self.screen else {
            return Err(self.invalid("start by questions"));
        };
        let selected = selected.clone();
        self.start(Selection::Questions(selected)).await
    }

    async fn start(&mut self, selection: Selection) -> Result<SessionStart, QuizError> {
        let open = self.open.as_mut().ok_or(QuizError::NoAreaSelected)?;
        let key = open.area.key().clone();
        let plan = SessionOrderer::new(&open.bank)
            .with_shuffle(open.prefs.questions)
            .build(&selection, &mut self.rng);
        if plan.is_empty() {
            debug!(area = %key, "selection matched no question");
            self.screen = Screen::MenuSelection;
            return Ok(SessionStart::Empty);
        }

        self.progress.reset(&key).await?;
        self.progress.save_selection(&key, &plan.indices()).await?;
        let status = StatusMap::all_pending(plan.indices());
        let tracker = ProgressTracker::new(key.clone(), status, self.progress.clone());
        let session = QuizSession::new(key.clone(), plan, tracker);
        session.persist_status().await?;

        let total = session.total();
        let shuffled = session.shuffled();
        let run = session.run_id();
        open.session = Some(session);
        self.answer_orders.begin_run();
        info!(area = %key, total, shuffled, "session started");
        self.emit(QuizEventKind::SessionStarted {
            area: key,
            run,
            total,
            shuffled,
        });
        self.go_to(0).await?;
        Ok(SessionStart::Started { total })
    }

    // ─── in session ───

    /// Answer the question on screen and show the result.
    ///
    /// The cursor is moved to the next pending question, or cleared when
    /// this was the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside a question,
    /// `QuizError::InvalidAnswer` when the choice does not fit the question,
    /// and `QuizError::Storage` on persistence failures.
    pub async fn answer(&mut self, choice: AnswerChoice) -> Result<AnswerOutcome, QuizError> {
        let Screen::Question { position } = self.screen else {
            return Err(self.invalid("answer"));
        };
        let session = self
            .open
            .as_mut()
            .and_then(|open| open.session.as_mut())
            .ok_or(QuizError::NoAreaSelected)?;
        let len = session.total();
        let question = session
            .question_at(position)
            .cloned()
            .ok_or(QuizError::OutOfRange { position, len })?;
        let displayed = self
            .answer_orders
            .current(question.index())
            .or_else(|| question.options())
            .unwrap_or(&[]);
        let matched = choice
            .evaluate(&question, displayed)
            .ok_or(QuizError::InvalidAnswer)?;

        let was_pending = session.status_of(question.index()).is_pending();
        session
            .record_answer(question.index(), matched.correct)
            .await?;
        let completed = was_pending && session.is_complete();
        let next = session.next_pending_after(position);
        let area = session.area().clone();
        let run = session.run_id();
        let counts = session.counts();
        match next {
            Some(next) => self.progress.save_cursor(&area, next).await?,
            None => self.progress.clear_cursor(&area).await?,
        }

        let outcome = AnswerOutcome {
            correct: matched.correct,
            given: matched.given,
            expected: question.answer().to_owned(),
            explanation: question.explanation().to_owned(),
        };
        self.screen = Screen::Result {
            position,
            outcome: outcome.clone(),
        };
        self.emit(QuizEventKind::QuestionAnswered {
            area: area.clone(),
            run,
            index: question.index(),
            correct: outcome.correct,
        });
        if completed {
            info!(area = %area, correct = counts.correct, fail = counts.fail, "session completed");
            self.emit(QuizEventKind::SessionCompleted {
                area,
                run,
                correct: counts.correct,
                fail: counts.fail,
            });
        }
        Ok(outcome)
    }

    /// Move on: from a result to the next pending question, from the status
    /// overview back to where it was opened.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` on other screens and
    /// `QuizError::Storage` if the cursor cannot be saved.
    pub async fn continue_session(&mut self) -> Result<(), QuizError> {
        let target = match &self.screen {
            Screen::Result { position, .. } => {
                let position = *position;
                self.session_or_invalid("continue")?
                    .next_pending_after(position)
            }
            Screen::StatusOverview { resume: Some(position) } => Some(*position),
            Screen::StatusOverview { resume: None } => {
                self.session_or_invalid("continue")?.first_pending()
            }
            _ => return Err(self.invalid("continue")),
        };
        match target {
            Some(position) => self.go_to(position).await,
            None => {
                self.screen = Screen::Completed;
                Ok(())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside a session.
    pub fn show_status(&mut self) -> Result<(), QuizError> {
        let resume = match &self.screen {
            Screen::Question { position } => Some(*position),
            Screen::Result { position, .. } => {
                let position = *position;
                self.session_or_invalid("show status")?
                    .next_pending_after(position)
            }
            Screen::Completed => None,
            _ => return Err(self.invalid("show status")),
        };
        self.screen = Screen::StatusOverview { resume };
        Ok(())
    }

    /// Open any session question from the overview, answered or not.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside the overview or the
    /// completed screen, `QuizError::OutOfRange` for a bad position.
    pub async fn open_question(&mut self, position: usize) -> Result<(), QuizError> {
        self.require(
            matches!(
                self.screen,
                Screen::StatusOverview { .. } | Screen::Completed
            ),
            "open a question",
        )?;
        self.go_to(position).await
    }

    /// Drop the session and its persisted status, cursor and subset.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` outside a session and
    /// `QuizError::Storage` if the reset fails.
    pub async fn restart(&mut self) -> Result<(), QuizError> {
        self.require(self.screen.in_session(), "restart")?;
        let open = self.open.as_mut().ok_or(QuizError::NoAreaSelected)?;
        self.progress.reset(open.area.key()).await?;
        open.session = None;
        debug!(area = %open.area.key(), "session restarted");
        self.screen = Screen::MenuSelection;
        Ok(())
    }

    async fn go_to(&mut self, position: usize) -> Result<(), QuizError> {
        let open = self.open.as_ref().ok_or(QuizError::NoAreaSelected)?;
        let Some(session) = open.session.as_ref() else {
            return Err(self.invalid("open a question"));
        };
        let len = session.total();
        let question = session
            .question_at(position)
            .ok_or(QuizError::OutOfRange { position, len })?;
        self.answer_orders
            .display_order(question, open.prefs.answers, &mut self.rng);
        self.progress.save_cursor(session.area(), position).await?;
        self.screen = Screen::Question { position };
        Ok(())
    }

    // ─── helpers ───

    fn catalog_area(&self, key: &AreaKey) -> Result<&Area, QuizError> {
        self.catalog
            .as_ref()
            .and_then(|catalog| catalog.get(key))
            .ok_or_else(|| QuizError::UnknownArea(key.clone()))
    }

    fn open_key(&self) -> Result<AreaKey, QuizError> {
        self.area()
            .map(|area| area.key().clone())
            .ok_or(QuizError::NoAreaSelected)
    }

    fn session_or_invalid(&self, action: &'static str) -> Result<&QuizSession, QuizError> {
        self.session().ok_or_else(|| self.invalid(action))
    }

    fn invalid(&self, action: &'static str) -> QuizError {
        QuizError::InvalidTransition {
            from: self.screen.name(),
            action,
        }
    }

    fn require(&self, allowed: bool, action: &'static str) -> Result<(), QuizError> {
        if allowed {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn fail_load(&mut self, err: LoadError) {
        warn!(%err, "load failed");
        self.emit(QuizEventKind::LoadFailed {
            target: err.target.to_string(),
            message: err.message.clone(),
        });
        self.load_error = Some(err);
    }

    fn emit(&self, kind: QuizEventKind) {
        self.events.record(&QuizEvent {
            at: self.clock.now(),
            kind,
        });
    }
}

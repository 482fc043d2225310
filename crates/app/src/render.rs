//! Plain-text screens.

use std::fmt::{self, Write};

use quiz_core::model::{
    Question, QuestionStatus, QuizType, option_letter, section_names,
};
use services::{QuizEngine, Screen};

const LIST_TEXT_WIDTH: usize = 60;

/// Questions of the question picker in listing order.
#[must_use]
pub fn picker_questions(engine: &QuizEngine) -> Vec<&Question> {
    engine
        .section_groups()
        .into_iter()
        .flat_map(|group| group.questions)
        .collect()
}

/// Sections of the section picker in listing order.
#[must_use]
pub fn picker_sections(engine: &QuizEngine) -> Vec<String> {
    section_names(engine.bank())
}

fn short(text: &str) -> String {
    let mut line: String = text.chars().take(LIST_TEXT_WIDTH).collect();
    if text.chars().count() > LIST_TEXT_WIDTH {
        line.push('…');
    }
    line
}

fn mark(status: QuestionStatus) -> &'static str {
    match status {
        QuestionStatus::Correct => "[+]",
        QuestionStatus::Fail => "[x]",
        QuestionStatus::Pending => "[ ]",
    }
}

pub fn render(engine: &QuizEngine, out: &mut impl Write) -> fmt::Result {
    if let Some(err) = engine.load_error() {
        writeln!(out, "! {err} (r to retry)")?;
    }
    match engine.screen() {
        Screen::AreaSelection => render_areas(engine, out),
        Screen::MenuSelection => render_menu(engine, out),
        Screen::SectionPicker { selected } => {
            writeln!(out, "Sections:")?;
            for (n, name) in picker_sections(engine).iter().enumerate() {
                let tick = if selected.contains(name) { "[x]" } else { "[ ]" };
                writeln!(out, "  {}. {tick} {name}", n + 1)?;
            }
            writeln!(out, "number toggles, * all, - none, g start, b back")
        }
        Screen::QuestionPicker { selected } => {
            let mut section = "";
            for (n, question) in picker_questions(engine).iter().enumerate() {
                if question.section() != section {
                    section = question.section();
                    writeln!(out, "{section}")?;
                }
                let tick = if selected.contains(&question.index()) { "[x]" } else { "[ ]" };
                writeln!(
                    out,
                    "  {}. {tick} #{} {}",
                    n + 1,
                    question.number(),
                    short(question.text())
                )?;
            }
            writeln!(out, "number toggles, - none, g start, b back")
        }
        Screen::Question { .. } => render_question(engine, out),
        Screen::Result { outcome, .. } => {
            if outcome.correct {
                writeln!(out, "Correct.")?;
            } else {
                writeln!(out, "Wrong: you answered {}, the answer is {}.", outcome.given, outcome.expected)?;
            }
            if !outcome.explanation.is_empty() {
                writeln!(out, "{}", outcome.explanation)?;
            }
            writeln!(out, "c continue, e status, a change area")
        }
        Screen::StatusOverview { resume } => {
            render_status(engine, out)?;
            if resume.is_some() {
                writeln!(out, "number opens a question, c continue, r restart, a change area")
            } else {
                writeln!(out, "number opens a question, r restart, a change area")
            }
        }
        Screen::Completed => {
            writeln!(out, "Session complete.")?;
            if let Some(counts) = engine.counts() {
                writeln!(
                    out,
                    "{} correct, {} wrong out of {}.",
                    counts.correct, counts.fail, counts.total
                )?;
            }
            writeln!(out, "e status, r restart, a change area")
        }
    }
}

fn render_areas(engine: &QuizEngine, out: &mut impl Write) -> fmt::Result {
    writeln!(out, "Choose an area:")?;
    if let Some(catalog) = engine.catalog() {
        for (n, area) in catalog.areas().iter().enumerate() {
            writeln!(out, "  {}. {} ({})", n + 1, area.name(), area.quiz_type().label())?;
        }
    }
    writeln!(out, "number selects, q quits")
}

fn render_menu(engine: &QuizEngine, out: &mut impl Write) -> fmt::Result {
    if let Some(area) = engine.area() {
        writeln!(out, "{} ({} questions)", area.name(), engine.bank().len())?;
    }
    let prefs = engine.prefs().unwrap_or_default();
    let on = |flag: bool| if flag { "on" } else { "off" };
    writeln!(out, "  t  take the whole quiz")?;
    writeln!(out, "  s  choose sections")?;
    writeln!(out, "  p  choose questions")?;
    writeln!(out, "  o  shuffle questions: {}", on(prefs.questions))?;
    writeln!(out, "  k  shuffle answers: {}", on(prefs.answers))?;
    writeln!(out, "  a  change area")
}

fn render_question(engine: &QuizEngine, out: &mut impl Write) -> fmt::Result {
    let Some(view) = engine.question_view() else {
        return Ok(());
    };
    let question = view.question;
    writeln!(
        out,
        "[{}/{}] {} #{}  ({} answered)",
        view.position + 1,
        view.counts.total,
        question.section(),
        question.number(),
        view.counts.answered()
    )?;
    writeln!(out, "{}", question.text())?;
    if !question.appears_in().is_empty() {
        writeln!(out, "(appears in: {})", question.appears_in().join(", "))?;
    }
    let multiple_choice = engine
        .area()
        .is_some_and(|area| area.quiz_type() == QuizType::MultipleChoice)
        || !view.options.is_empty();
    if multiple_choice {
        for (position, option) in view.options.iter().enumerate() {
            writeln!(out, "  {}) {option}", option_letter(position))?;
        }
        writeln!(out, "letter answers, e status")
    } else {
        writeln!(out, "v true, f false, e status")
    }
}

fn render_status(engine: &QuizEngine, out: &mut impl Write) -> fmt::Result {
    let Some(session) = engine.session() else {
        return Ok(());
    };
    for (n, question) in session.questions().iter().enumerate() {
        writeln!(
            out,
            "  {}. {} #{} {}",
            n + 1,
            mark(session.status_of(question.index())),
            question.number(),
            short(question.text())
        )?;
    }
    let counts = session.counts();
    writeln!(
        out,
        "{} correct, {} wrong, {} pending",
        counts.correct, counts.fail, counts.pending
    )
}

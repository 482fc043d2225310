//! Keyboard commands, interpreted per screen.

use quiz_core::model::{AnswerChoice, option_position};
use services::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// 1-based catalog position.
    SelectArea(usize),
    Retry,
    StartAll,
    OpenSections,
    OpenQuestions,
    ToggleShuffleQuestions,
    ToggleShuffleAnswers,
    /// 1-based entry of the picker list.
    Toggle(usize),
    SelectAll,
    ClearPicker,
    StartPicked,
    CancelPicker,
    Answer(AnswerChoice),
    ShowStatus,
    Continue,
    /// 1-based session position.
    OpenQuestion(usize),
    Restart,
    ChangeArea,
    Quit,
}

/// Interpret one input line on `screen`.
///
/// `options` is the number of options of the question on screen, zero for
/// true/false questions. On a multiple-choice question options are picked by
/// letter or by 1-based digit, and letters take precedence over commands.
#[must_use]
pub fn parse(line: &str, screen: &Screen, options: usize) -> Option<Command> {
    let input = line.trim().to_ascii_lowercase();
    if let Ok(number) = input.parse::<usize>() {
        if number == 0 {
            return None;
        }
        return match screen {
            Screen::AreaSelection => Some(Command::SelectArea(number)),
            Screen::SectionPicker { .. } | Screen::QuestionPicker { .. } => {
                Some(Command::Toggle(number))
            }
            Screen::StatusOverview { .. } | Screen::Completed => {
                Some(Command::OpenQuestion(number))
            }
            Screen::Question { .. } if number <= options => {
                Some(Command::Answer(AnswerChoice::Option(number - 1)))
            }
            _ => None,
        };
    }

    let mut chars = input.chars();
    let (Some(key), None) = (chars.next(), chars.next()) else {
        return None;
    };

    if let Screen::Question { .. } = screen {
        if options > 0 {
            if let Some(position) = option_position(key).filter(|p| *p < options) {
                return Some(Command::Answer(AnswerChoice::Option(position)));
            }
        } else {
            match key {
                'v' => return Some(Command::Answer(AnswerChoice::True)),
                'f' => return Some(Command::Answer(AnswerChoice::False)),
                _ => {}
            }
        }
    }

    let command = match (screen, key) {
        (_, 'q') => Command::Quit,
        (Screen::AreaSelection | Screen::MenuSelection, 'r') => Command::Retry,
        (Screen::MenuSelection, 't') => Command::StartAll,
        (Screen::MenuSelection, 's') => Command::OpenSections,
        (Screen::MenuSelection, 'p') => Command::OpenQuestions,
        (Screen::MenuSelection, 'o') => Command::ToggleShuffleQuestions,
        (Screen::MenuSelection, 'k') => Command::ToggleShuffleAnswers,
        (Screen::SectionPicker { .. }, '*') => Command::SelectAll,
        (Screen::SectionPicker { .. } | Screen::QuestionPicker { .. }, '-') => {
            Command::ClearPicker
        }
        (Screen::SectionPicker { .. } | Screen::QuestionPicker { .. }, 'g') => {
            Command::StartPicked
        }
        (Screen::SectionPicker { .. } | Screen::QuestionPicker { .. }, 'b') => {
            Command::CancelPicker
        }
        (Screen::Question { .. } | Screen::Result { .. } | Screen::Completed, 'e') => {
            Command::ShowStatus
        }
        (Screen::Result { .. } | Screen::StatusOverview { .. }, 'c') => Command::Continue,
        (Screen::StatusOverview { .. } | Screen::Completed, 'r') => Command::Restart,
        (screen, 'a') if !matches!(screen, Screen::AreaSelection) => Command::ChangeArea,
        _ => return None,
    };
    Some(command)
}

mod answer;
mod area;
mod ids;
mod question;
mod sections;
mod status;

pub use answer::{AnswerChoice, AnswerMatch, option_letter, option_position};
pub use area::{Area, AreaRecord, Catalog, CatalogError, QuizType};
pub use ids::{AreaKey, QuestionIndex, RunId};
pub use question::{Question, QuestionError, QuestionRecord};
pub use sections::{SectionGroup, group_by_section, section_names};
pub use status::{ProgressCounts, QuestionStatus, StatusMap};

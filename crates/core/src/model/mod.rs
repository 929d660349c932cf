mod answer_key;
mod catalog;
mod history;
mod ids;
mod question;
mod session;
mod settings;
mod subject;

pub use ids::{
    Choice, EditionId, PageIndex, ParseIdError, QuestionNumber, question_count_for_pages,
};
pub use subject::{Subject, SubjectError};

pub use answer_key::AnswerKey;
pub use catalog::{
    Edition, EditionCatalog, FieldCatalog, FieldError, FieldGroup, default_edition_label,
};
pub use history::{AnswerHistory, HistoryEntry, RecordOutcome, Verdict};
pub use question::{ParseQuestionIdError, QuestionId, QuestionRef};
pub use session::{SessionSummary, SessionSummaryError};
pub use settings::{
    AnswerPolicy, MAX_CHOICES, ViewerSettings, ViewerSettingsDraft, ViewerSettingsError,
};

use thiserror::Error;

use crate::model::{
    FieldError, ParseIdError, ParseQuestionIdError, SessionSummaryError, SubjectError,
    ViewerSettingsError,
};
use crate::navigation::NavigationError;

/// Any domain-level failure raised by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    QuestionId(#[from] ParseQuestionIdError),
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Settings(#[from] ViewerSettingsError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

#![forbid(unsafe_code)]

pub mod alert;
pub mod answer_keys;
pub mod app_services;
pub mod audit;
pub mod catalog;
pub mod documents;
pub mod error;
pub mod results_service;
pub mod viewer;

pub use quiz_core::Clock;

pub use alert::{Alert, AlertKind, Loaded};
pub use app_services::{AppServices, open_resource_store};
pub use error::{AppServicesError, DocumentError, ResultsServiceError, ViewerError};
pub use results_service::{SessionSummaryRow, SessionSummaryService};
pub use viewer::{
    AnswerOutcome, QuestionLoad, QuestionView, SummarySave, ViewerController, ViewerService,
};

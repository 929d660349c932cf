mod controller;
mod service;
mod view;

pub use controller::{AnswerOutcome, QuestionLoad, SummarySave, ViewerController};
pub use service::{CatalogSnapshot, ViewerService};
pub use view::{Feedback, QuestionView};

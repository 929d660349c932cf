mod results_vm;
mod summary_vm;
mod time_fmt;
mod viewer_vm;

pub use results_vm::{ResultRowVm, ResultsVm, map_results};
pub use summary_vm::{SummaryCardVm, map_summary_cards};
pub use time_fmt::format_datetime;
pub use viewer_vm::{
    ChoiceButtonVm, FeedbackVm, PickerVm, QuestionVm, SelectOptionVm, ViewerIntent, ViewerMode,
    ViewerVm, map_picker, map_viewer,
};

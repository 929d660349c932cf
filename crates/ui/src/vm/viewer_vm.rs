use quiz_core::model::{
    Choice, EditionCatalog, EditionId, FieldCatalog, QuestionNumber, Subject, Verdict,
};
use quiz_core::navigation::{Event, ViewerState};
use services::{Alert, ViewerController};

use crate::vm::results_vm::{ResultsVm, map_results};

/// What the user asked the viewer to do.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerIntent {
    StartEdition { edition: EditionId, subject: Subject },
    StartField { subject: Subject, field_name: String },
    Next,
    Prev,
    JumpTo(QuestionNumber),
    Answer(Choice),
    ShowResults,
    CloseResults,
    Review(usize),
    Reset,
    DismissAlerts,
}

impl ViewerIntent {
    /// Reducer event for plain navigation intents.
    #[must_use]
    pub fn navigation_event(&self) -> Option<Event> {
        match self {
            Self::Next => Some(Event::Next),
            Self::Prev => Some(Event::Prev),
            Self::JumpTo(number) => Some(Event::JumpTo(*number)),
            Self::ShowResults => Some(Event::ShowResults),
            Self::CloseResults => Some(Event::CloseResults),
            Self::Review(row) => Some(Event::Review(*row)),
            Self::Reset => Some(Event::Reset),
            Self::StartEdition { .. }
            | Self::StartField { .. }
            | Self::Answer(_)
            | Self::DismissAlerts => None,
        }
    }
}

/// Which control set the page shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerMode {
    Idle,
    Edition,
    Field,
    Results(ResultsVm),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceButtonVm {
    pub choice: Choice,
    pub label: String,
    pub selected: bool,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackVm {
    pub text: String,
    pub class: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id_label: String,
    pub page_src: Option<String>,
    pub loading: bool,
    pub choices: Vec<ChoiceButtonVm>,
    pub feedback: Option<FeedbackVm>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerVm {
    pub mode: ViewerMode,
    pub starting: bool,
    pub session_label: Option<String>,
    pub position_label: Option<String>,
    pub score_label: String,
    pub can_prev: bool,
    pub can_next: bool,
    /// Upper bound for the jump input; `None` outside edition mode.
    pub jump_max: Option<u32>,
    pub question: Option<QuestionVm>,
    pub alerts: Vec<String>,
}

#[must_use]
pub fn map_viewer(controller: &ViewerController) -> ViewerVm {
    let state = controller.state();
    let mode = match state {
        ViewerState::Idle => ViewerMode::Idle,
        ViewerState::EditionMode(_) => ViewerMode::Edition,
        ViewerState::FieldMode(_) => ViewerMode::Field,
        ViewerState::Results(results) => ViewerMode::Results(map_results(results.session())),
    };
    let position = state.position();

    ViewerVm {
        mode,
        starting: controller.is_starting(),
        session_label: state.session().map(|session| session.kind().label()),
        position_label: position.map(|(current, total)| format!("Question {current} / {total}")),
        score_label: format!("Score: {}", state.score()),
        can_prev: state.can_prev(),
        can_next: state.can_next(),
        jump_max: position.filter(|_| state.can_jump()).map(|(_, total)| total),
        question: map_question(controller),
        alerts: controller.alerts().iter().map(Alert::to_string).collect(),
    }
}

fn map_question(controller: &ViewerController) -> Option<QuestionVm> {
    let question = controller.state().current_question()?;
    let view = controller.view()?;
    let entry = view.entry();
    let locked = controller.answers_locked();

    let choices = controller
        .settings()
        .choices()
        .into_iter()
        .map(|choice| ChoiceButtonVm {
            choice,
            label: choice.to_string(),
            selected: entry.is_some_and(|entry| entry.selected == choice),
            disabled: locked,
        })
        .collect();

    let feedback = view.feedback().map(|feedback| FeedbackVm {
        text: feedback.to_string(),
        class: match feedback.entry.verdict {
            Verdict::Correct => "correct",
            Verdict::Incorrect => "incorrect",
            Verdict::Unknown => "unknown",
        },
    });

    Some(QuestionVm {
        id_label: question.id().to_string(),
        page_src: view.page().map(|page| page.source.to_string()),
        loading: !view.is_ready(),
        choices,
        feedback,
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOptionVm {
    pub value: String,
    pub label: String,
}

/// Options for the mode picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickerVm {
    pub subjects: Vec<SelectOptionVm>,
    pub editions: Vec<SelectOptionVm>,
    pub fields: Vec<SelectOptionVm>,
}

#[must_use]
pub fn map_picker(
    subjects: &[Subject],
    editions: &EditionCatalog,
    fields: &FieldCatalog,
    subject: &Subject,
) -> PickerVm {
    PickerVm {
        subjects: subjects
            .iter()
            .map(|subject| SelectOptionVm {
                value: subject.to_string(),
                label: subject.to_string(),
            })
            .collect(),
        editions: editions
            .editions()
            .iter()
            .map(|edition| SelectOptionVm {
                value: edition.id().to_string(),
                label: edition.label().to_string(),
            })
            .collect(),
        fields: fields
            .fields_for(subject)
            .iter()
            .map(|field| SelectOptionVm {
                value: field.name().to_string(),
                label: format!("{} ({})", field.name(), field.questions().len()),
            })
            .collect(),
    }
}

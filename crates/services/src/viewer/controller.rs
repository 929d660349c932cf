use tracing::{debug, error, warn};

use quiz_core::Clock;
use quiz_core::model::{
    Choice, EditionId, FieldCatalog, HistoryEntry, Subject, ViewerSettings,
};
use quiz_core::navigation::{
    Effect, Event, Generation, LoadTicket, NavigationError, Session, SessionStart, ViewerState,
};

use crate::alert::{Alert, AlertKind};
use crate::documents::RenderedPage;
use crate::error::{DocumentError, ResultsServiceError, ViewerError};
use crate::viewer::view::QuestionView;

/// Everything fetched for one question.
#[derive(Debug)]
pub struct QuestionLoad {
    pub ticket: LoadTicket,
    pub correct: Option<Choice>,
    pub page: Result<RenderedPage, DocumentError>,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Recorded(HistoryEntry),
    /// The question was already answered; the stored entry is unchanged.
    AlreadyAnswered(HistoryEntry),
}

/// A summary write for the session shown in the results view.
#[derive(Debug, Clone)]
pub struct SummarySave {
    pub session: Session,
    /// Row to replace, once the session has been saved before.
    pub existing: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SaveState {
    #[default]
    Idle,
    InFlight {
        resave: bool,
    },
}

/// Owns the navigation state and the loaded view of the current question.
///
/// All methods are synchronous. I/O happens in `ViewerService`; its results
/// are handed back here and applied only if their ticket still matches.
#[derive(Debug)]
pub struct ViewerController {
    state: ViewerState,
    settings: ViewerSettings,
    clock: Clock,
    generation: Generation,
    pending_start: Option<Generation>,
    view: Option<QuestionView>,
    alerts: Vec<Alert>,
    summary_id: Option<i64>,
    save_state: SaveState,
}

impl ViewerController {
    #[must_use]
    pub fn new(settings: ViewerSettings, clock: Clock) -> Self {
        Self {
            state: ViewerState::Idle,
            settings,
            clock,
            generation: Generation::default(),
            pending_start: None,
            view: None,
            alerts: Vec::new(),
            summary_id: None,
            save_state: SaveState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    #[must_use]
    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn view(&self) -> Option<&QuestionView> {
        self.view.as_ref()
    }

    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    pub fn push_alert(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    /// Id of the persisted summary for the current session, once saved.
    #[must_use]
    pub fn summary_id(&self) -> Option<i64> {
        self.summary_id
    }

    pub fn set_summary_id(&mut self, id: i64) {
        self.summary_id = Some(id);
    }

    /// Claim the summary write for the current session.
    ///
    /// Returns `None` when idle, or when a write is already in flight; the
    /// running write is then repeated once it finishes, so the saved row
    /// ends up with the latest counts and there is only one of it.
    pub fn begin_summary_save(&mut self) -> Option<SummarySave> {
        let session = self.state.session()?.clone();
        match self.save_state {
            SaveState::InFlight { .. } => {
                self.save_state = SaveState::InFlight { resave: true };
                None
            }
            SaveState::Idle => {
                self.save_state = SaveState::InFlight { resave: false };
                Some(SummarySave {
                    session,
                    existing: self.summary_id,
                })
            }
        }
    }

    /// Record the outcome of a write started by `begin_summary_save`.
    ///
    /// Outcomes for an earlier session are dropped without an alert. Returns
    /// the follow-up write when results were reopened meanwhile.
    pub fn finish_summary_save(
        &mut self,
        generation: Generation,
        saved: Result<i64, ResultsServiceError>,
    ) -> Option<SummarySave> {
        if self.state.generation() != Some(generation) {
            debug!(
                generation = generation.value(),
                "dropping summary save of an earlier session"
            );
            return None;
        }
        match saved {
            Ok(id) => self.summary_id = Some(id),
            Err(err) => {
                warn!(%err, "session summary not saved");
                self.alerts.push(Alert::new(
                    AlertKind::SummaryNotSaved,
                    format!("results were not saved: {err}"),
                ));
            }
        }
        let resave = self.save_state == SaveState::InFlight { resave: true };
        self.save_state = SaveState::Idle;
        if resave {
            self.begin_summary_save()
        } else {
            None
        }
    }

    /// Whether a mode start is waiting for its document.
    #[must_use]
    pub fn is_starting(&self) -> bool {
        self.pending_start.is_some()
    }

    #[must_use]
    pub fn answers_locked(&self) -> bool {
        self.view
            .as_ref()
            .is_none_or(|view| view.answers_locked(self.settings.answer_policy()))
    }

    //
    // ─── SESSION START ─────────────────────────────────────────────────────────
    //

    /// Reserve a generation for a new session. Any earlier start that has not
    /// finished yet becomes stale.
    pub fn begin_start(&mut self) -> SessionStart {
        self.generation = self.generation.next();
        self.pending_start = Some(self.generation);
        SessionStart {
            generation: self.generation,
            policy: self.settings.answer_policy(),
            started_at: self.clock.now(),
        }
    }

    /// Complete an edition start once its question count is known.
    ///
    /// Returns the first question to load, or `None` if the start was
    /// superseded or failed (a failure also returns the viewer to idle).
    pub fn finish_edition_start(
        &mut self,
        start: SessionStart,
        edition: EditionId,
        subject: Subject,
        question_count: Result<u32, DocumentError>,
    ) -> Option<LoadTicket> {
        if self.pending_start != Some(start.generation) {
            debug!(
                generation = start.generation.value(),
                "dropping superseded edition start"
            );
            return None;
        }
        self.pending_start = None;

        match question_count {
            Ok(total_questions) => self.apply_start(Event::StartEdition {
                start,
                edition,
                subject,
                total_questions,
            }),
            Err(err) => {
                warn!(%edition, %subject, %err, "cannot open exam paper");
                self.clear_session();
                self.state = ViewerState::Idle;
                self.alerts.push(Alert::new(
                    AlertKind::DocumentMissing,
                    format!("exam paper not available: {err}"),
                ));
                None
            }
        }
    }

    /// Start browsing the named field of `subject`.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::UnknownField` if the catalog has no such field.
    pub fn start_field(
        &mut self,
        fields: &FieldCatalog,
        subject: &Subject,
        name: &str,
    ) -> Result<Option<LoadTicket>, ViewerError> {
        let field = fields
            .find(subject, name)
            .cloned()
            .ok_or_else(|| ViewerError::UnknownField {
                name: name.to_string(),
            })?;
        let start = self.begin_start();
        self.pending_start = None;
        Ok(self.apply_start(Event::StartField { start, field }))
    }

    fn apply_start(&mut self, event: Event) -> Option<LoadTicket> {
        self.clear_session();
        let transition = std::mem::take(&mut self.state).apply(event);
        self.state = transition.state;
        match transition.effect {
            Effect::LoadQuestion(ticket) => {
                self.view = Some(QuestionView::loading(ticket.clone(), None, None));
                Some(ticket)
            }
            Effect::Rejected(NavigationError::EmptySession) => {
                self.alerts.push(Alert::new(
                    AlertKind::EmptyDocument,
                    "the selected paper has no question pages",
                ));
                None
            }
            other => {
                debug!(?other, "unexpected start effect");
                None
            }
        }
    }

    fn clear_session(&mut self) {
        self.view = None;
        self.summary_id = None;
        self.save_state = SaveState::Idle;
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Apply a navigation event. Returns the question to load, if the
    /// position changed.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Navigation` when the event is not valid in the
    /// current state; the state is left unchanged.
    pub fn dispatch(&mut self, event: Event) -> Result<Option<LoadTicket>, ViewerError> {
        let transition = std::mem::take(&mut self.state).apply(event);
        self.state = transition.state;
        match transition.effect {
            Effect::LoadQuestion(ticket) => {
                let previous_page = self.view.take().and_then(|view| view.page().cloned());
                let entry = self.state.current_entry().copied();
                self.view = Some(QuestionView::loading(ticket.clone(), previous_page, entry));
                Ok(Some(ticket))
            }
            Effect::AnswerRecorded { entry, .. } => {
                if let Some(view) = self.view.as_mut() {
                    view.set_entry(entry);
                }
                Ok(None)
            }
            Effect::ResultsOpened => Ok(None),
            Effect::Cleared => {
                self.pending_start = None;
                self.clear_session();
                Ok(None)
            }
            Effect::AnswerIgnored { .. } | Effect::Unchanged => Ok(None),
            Effect::Rejected(err) => Err(err.into()),
        }
    }

    /// Submit an answer for the question on screen.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::ChoiceNotOffered` for a choice beyond the
    /// configured count, `ViewerError::QuestionNotReady` while the key is still
    /// loading, or `ViewerError::Navigation` when no question is shown.
    pub fn answer(&mut self, choice: Choice) -> Result<AnswerOutcome, ViewerError> {
        let max = self.settings.choice_count();
        if choice.value() > max {
            return Err(ViewerError::ChoiceNotOffered {
                provided: choice.value(),
                max,
            });
        }

        let correct = match &self.view {
            Some(view) if view.is_ready() && self.state.accepts(view.ticket()) => view.correct(),
            _ if self.state.current_question().is_some() => {
                return Err(ViewerError::QuestionNotReady);
            }
            // No question on screen: let the reducer reject it.
            _ => None,
        };

        let transition = std::mem::take(&mut self.state).apply(Event::Answer { choice, correct });
        self.state = transition.state;
        match transition.effect {
            Effect::AnswerRecorded { id, entry } => {
                debug!(question = %id, verdict = ?entry.verdict, "answer recorded");
                if let Some(view) = self.view.as_mut() {
                    view.set_entry(entry);
                }
                Ok(AnswerOutcome::Recorded(entry))
            }
            Effect::AnswerIgnored { existing, .. } => Ok(AnswerOutcome::AlreadyAnswered(existing)),
            Effect::Rejected(err) => Err(err.into()),
            other => {
                debug!(?other, "unexpected answer effect");
                Err(ViewerError::QuestionNotReady)
            }
        }
    }

    /// Apply a finished load. Loads for a question that is no longer on
    /// screen are dropped; their alerts are still kept.
    pub fn apply_load(&mut self, load: QuestionLoad) -> bool {
        self.alerts.extend(load.alerts);

        if !self.state.accepts(&load.ticket) {
            debug!(
                question = %load.ticket.question.id(),
                generation = load.ticket.generation.value(),
                "dropping stale question load"
            );
            return false;
        }
        let Some(view) = self
            .view
            .as_mut()
            .filter(|view| view.ticket() == &load.ticket)
        else {
            return false;
        };

        let page = match load.page {
            Ok(page) => Some(page),
            Err(err) => {
                error!(question = %load.ticket.question.id(), %err, "page render failed");
                self.alerts.push(Alert::new(
                    AlertKind::RenderFailed,
                    format!("could not show question {}: {err}", load.ticket.question.number),
                ));
                None
            }
        };
        view.finish(load.correct, page);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{FieldGroup, QuestionNumber, QuestionRef, ViewerSettingsDraft, Verdict};
    use quiz_core::time::fixed_clock;
    use storage::resources::ResourceError;
    use url::Url;

    fn kanka() -> Subject {
        Subject::new("kanka").unwrap()
    }

    fn controller() -> ViewerController {
        controller_with_retry(false)
    }

    fn controller_with_retry(allow_retry_after_unknown: bool) -> ViewerController {
        let settings = ViewerSettingsDraft {
            subjects: vec!["kanka".into()],
            choice_count: Some(5),
            allow_retry_after_unknown,
        }
        .validate()
        .unwrap();
        ViewerController::new(settings, fixed_clock())
    }

    fn choice(value: u8) -> Choice {
        Choice::new(value).unwrap()
    }

    fn page(ticket: &LoadTicket) -> RenderedPage {
        RenderedPage {
            source: Url::parse("memory:///pdf/75/75_kanka.pdf").unwrap(),
            page_index: ticket.question.page_index(),
        }
    }

    fn load(ticket: &LoadTicket, correct: Option<u8>) -> QuestionLoad {
        QuestionLoad {
            ticket: ticket.clone(),
            correct: correct.and_then(Choice::new),
            page: Ok(page(ticket)),
            alerts: Vec::new(),
        }
    }

    fn started(ctl: &mut ViewerController, total: u32) -> LoadTicket {
        let start = ctl.begin_start();
        ctl.finish_edition_start(start, EditionId::new(75), kanka(), Ok(total))
            .unwrap()
    }

    #[test]
    fn answer_waits_for_load() {
        let mut ctl = controller();
        let ticket = started(&mut ctl, 25);
        assert!(ctl.answers_locked());
        assert_eq!(ctl.answer(choice(2)), Err(ViewerError::QuestionNotReady));

        assert!(ctl.apply_load(load(&ticket, Some(2))));
        assert!(!ctl.answers_locked());
        let outcome = ctl.answer(choice(2)).unwrap();
        assert!(matches!(outcome, AnswerOutcome::Recorded(e) if e.verdict == Verdict::Correct));
        assert!(ctl.answers_locked());
        assert_eq!(ctl.state().score(), 1);
    }

    #[test]
    fn choice_beyond_configured_count_is_rejected() {
        let mut ctl = controller();
        let ticket = started(&mut ctl, 3);
        ctl.apply_load(load(&ticket, Some(1)));
        assert_eq!(
            ctl.answer(choice(6)),
            Err(ViewerError::ChoiceNotOffered { provided: 6, max: 5 })
        );
    }

    #[test]
    fn superseded_start_is_dropped() {
        let mut ctl = controller();
        let slow = ctl.begin_start();
        let fast = ctl.begin_start();
        assert!(
            ctl.finish_edition_start(fast, EditionId::new(74), kanka(), Ok(10))
                .is_some()
        );
        assert!(
            ctl.finish_edition_start(slow, EditionId::new(75), kanka(), Ok(25))
                .is_none()
        );
        let question = ctl.state().current_question().unwrap();
        assert_eq!(question.edition, EditionId::new(74));
    }

    #[test]
    fn stale_load_does_not_touch_view() {
        let mut ctl = controller();
        let first = started(&mut ctl, 5);
        let second = ctl.dispatch(Event::Next).unwrap().unwrap();
        assert!(!ctl.apply_load(load(&first, Some(1))));
        assert!(!ctl.view().unwrap().is_ready());
        assert!(ctl.apply_load(load(&second, Some(3))));
        assert_eq!(ctl.view().unwrap().correct(), Some(choice(3)));
    }

    #[test]
    fn missing_document_returns_to_idle_with_alert() {
        let mut ctl = controller();
        let ticket = started(&mut ctl, 5);
        ctl.apply_load(load(&ticket, Some(1)));
        ctl.answer(choice(1)).unwrap();

        let start = ctl.begin_start();
        let missing = DocumentError::Resource(ResourceError::NotFound {
            path: "pdf/60/60_kanka.pdf".into(),
        });
        assert!(
            ctl.finish_edition_start(start, EditionId::new(60), kanka(), Err(missing))
                .is_none()
        );
        assert_eq!(ctl.state(), &ViewerState::Idle);
        assert_eq!(ctl.state().score(), 0);
        assert!(ctl.view().is_none());
        let alert = &ctl.alerts()[0];
        assert_eq!(alert.kind(), AlertKind::DocumentMissing);
        assert!(alert.message().contains("pdf/60/60_kanka.pdf"));
    }

    #[test]
    fn cover_only_document_raises_alert() {
        let mut ctl = controller();
        let start = ctl.begin_start();
        assert!(
            ctl.finish_edition_start(start, EditionId::new(75), kanka(), Ok(0))
                .is_none()
        );
        assert_eq!(ctl.state(), &ViewerState::Idle);
        assert_eq!(ctl.take_alerts()[0].kind(), AlertKind::EmptyDocument);
        assert!(ctl.alerts().is_empty());
    }

    #[test]
    fn render_failure_keeps_last_page() {
        let mut ctl = controller();
        let first = started(&mut ctl, 5);
        ctl.apply_load(load(&first, Some(1)));
        let second = ctl.dispatch(Event::Next).unwrap().unwrap();
        ctl.apply_load(QuestionLoad {
            ticket: second.clone(),
            correct: Some(choice(2)),
            page: Err(DocumentError::Parse {
                path: "pdf/75/75_kanka.pdf".into(),
                message: "truncated".into(),
            }),
            alerts: Vec::new(),
        });
        let view = ctl.view().unwrap();
        assert!(view.is_ready());
        assert_eq!(view.page().unwrap().page_index, first.question.page_index());
        assert_eq!(ctl.alerts()[0].kind(), AlertKind::RenderFailed);
    }

    #[test]
    fn revisit_restores_entry_into_view() {
        let mut ctl = controller();
        let first = started(&mut ctl, 5);
        ctl.apply_load(load(&first, Some(4)));
        ctl.answer(choice(1)).unwrap();
        ctl.dispatch(Event::Next).unwrap();
        let back = ctl.dispatch(Event::Prev).unwrap().unwrap();
        let entry = ctl.view().unwrap().entry().copied().unwrap();
        assert_eq!(entry.verdict, Verdict::Incorrect);
        ctl.apply_load(load(&back, Some(4)));
        assert!(ctl.answers_locked());
        assert_eq!(
            ctl.answer(choice(4)).unwrap(),
            AnswerOutcome::AlreadyAnswered(entry)
        );
        assert_eq!(ctl.state().score(), 0);
    }

    #[test]
    fn field_start_requires_known_field() {
        let mut ctl = controller();
        let mut fields = FieldCatalog::new();
        let question = QuestionRef::new(EditionId::new(70), kanka(), QuestionNumber::new(3).unwrap());
        fields.push(FieldGroup::new("circulatory", kanka(), vec![question.clone()]).unwrap());

        let err = ctl.start_field(&fields, &kanka(), "renal").unwrap_err();
        assert_eq!(err, ViewerError::UnknownField { name: "renal".into() });

        let ticket = ctl.start_field(&fields, &kanka(), "circulatory").unwrap().unwrap();
        assert_eq!(ticket.question, question);
        assert!(!ctl.state().can_jump());
    }

    #[test]
    fn reset_clears_everything() {
        let mut ctl = controller();
        started(&mut ctl, 5);
        ctl.set_summary_id(7);
        ctl.begin_start();
        ctl.dispatch(Event::Reset).unwrap();
        assert!(!ctl.is_starting());
        assert!(ctl.summary_id().is_none());
        assert!(ctl.view().is_none());
        assert_eq!(
            ctl.dispatch(Event::Next),
            Err(ViewerError::Navigation(NavigationError::NoActiveSession))
        );
    }

    #[test]
    fn retry_policy_keeps_first_unknown_while_key_missing() {
        let mut ctl = controller_with_retry(true);
        let ticket = started(&mut ctl, 25);
        ctl.apply_load(load(&ticket, None));

        let first = match ctl.answer(choice(1)).unwrap() {
            AnswerOutcome::Recorded(entry) => entry,
            other => panic!("expected a recorded answer, got {other:?}"),
        };
        assert_eq!(first.verdict, Verdict::Unknown);
        assert!(ctl.answers_locked());

        assert_eq!(ctl.answer(choice(3)), Ok(AnswerOutcome::AlreadyAnswered(first)));
        let stored = ctl.view().and_then(QuestionView::entry).copied();
        assert_eq!(stored, Some(first));
    }

    #[test]
    fn reopening_results_during_a_save_queues_one_replace() {
        let mut ctl = controller();
        started(&mut ctl, 5);
        ctl.dispatch(Event::ShowResults).unwrap();
        let first = ctl.begin_summary_save().expect("first save");
        assert_eq!(first.existing, None);
        let generation = first.session.generation();

        ctl.dispatch(Event::CloseResults).unwrap();
        ctl.dispatch(Event::ShowResults).unwrap();
        assert!(ctl.begin_summary_save().is_none());

        let follow_up = ctl
            .finish_summary_save(generation, Ok(11))
            .expect("queued save");
        assert_eq!(follow_up.existing, Some(11));
        assert!(ctl.finish_summary_save(generation, Ok(11)).is_none());
        assert_eq!(ctl.summary_id(), Some(11));
        assert!(ctl.begin_summary_save().is_some());
    }

    #[test]
    fn summary_save_of_an_earlier_session_is_dropped_quietly() {
        let mut ctl = controller();
        started(&mut ctl, 5);
        ctl.dispatch(Event::ShowResults).unwrap();
        let save = ctl.begin_summary_save().expect("save");

        ctl.dispatch(Event::Reset).unwrap();
        started(&mut ctl, 5);
        let outcome = ctl.finish_summary_save(
            save.session.generation(),
            Err(ResultsServiceError::NoSession),
        );
        assert!(outcome.is_none());
        assert!(ctl.alerts().is_empty());
        assert!(ctl.summary_id().is_none());
    }
}

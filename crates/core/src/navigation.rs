//! Viewer navigation state machine.
//!
//! `ViewerState` is a tagged union of the four viewer states. Every change
//! goes through [`ViewerState::apply`], which consumes the old state and
//! returns the next one together with the [`Effect`] the caller must carry out
//! (loading a page, showing a verdict, ...). The reducer never performs I/O.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{
    AnswerHistory, AnswerPolicy, Choice, EditionId, FieldGroup, HistoryEntry, QuestionId,
    QuestionNumber, QuestionRef, RecordOutcome, SessionSummary, SessionSummaryError, Subject,
};
use crate::results::ResultsTable;
use crate::scoring::Accuracy;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("no session is active")]
    NoActiveSession,
    #[error("session has no questions")]
    EmptySession,
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("already at the last question")]
    AtLastQuestion,
    #[error("jumping is only available when browsing by edition")]
    JumpNotAllowed,
    #[error("question {requested} is outside 1..={total}")]
    PositionOutOfRange { requested: u32, total: u32 },
    #[error("close the results view first")]
    ResultsOpen,
    #[error("results view is not open")]
    NotShowingResults,
    #[error("row {row} is outside a session of {len} questions")]
    ReviewOutOfRange { row: usize, len: usize },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Session counter used to discard loads that belong to an older session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// How the session question list was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKind {
    Edition { edition: EditionId, subject: Subject },
    Field { subject: Subject, field_name: String },
}

impl SessionKind {
    #[must_use]
    pub fn subject(&self) -> &Subject {
        match self {
            Self::Edition { subject, .. } | Self::Field { subject, .. } => subject,
        }
    }

    /// Short human label, e.g. `edition 75 / kanka`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Edition { edition, subject } => format!("edition {edition} / {subject}"),
            Self::Field {
                subject,
                field_name,
            } => format!("field {field_name} / {subject}"),
        }
    }
}

/// Data shared by all states of one mode invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    generation: Generation,
    kind: SessionKind,
    questions: Vec<QuestionRef>,
    history: AnswerHistory,
    policy: AnswerPolicy,
    started_at: DateTime<Utc>,
}

impl Session {
    fn new(start: SessionStart, kind: SessionKind, questions: Vec<QuestionRef>) -> Self {
        Self {
            generation: start.generation,
            kind,
            questions,
            history: AnswerHistory::new(),
            policy: start.policy,
            started_at: start.started_at,
        }
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn kind(&self) -> &SessionKind {
        &self.kind
    }

    /// Full question list of this session, in navigation order.
    #[must_use]
    pub fn questions(&self) -> &[QuestionRef] {
        &self.questions
    }

    #[must_use]
    pub fn history(&self) -> &AnswerHistory {
        &self.history
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of distinct questions answered correctly.
    #[must_use]
    pub fn score(&self) -> usize {
        self.history.correct_count()
    }

    #[must_use]
    pub fn accuracy(&self) -> Accuracy {
        Accuracy::from_counts(self.score(), self.questions.len())
    }

    #[must_use]
    pub fn results(&self) -> ResultsTable {
        ResultsTable::build(&self.questions, &self.history)
    }

    /// Snapshot for persistence.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if `completed_at` precedes the start.
    pub fn summary(&self, completed_at: DateTime<Utc>) -> Result<SessionSummary, SessionSummaryError> {
        let table = self.results();
        let count = |value: usize| u32::try_from(value).unwrap_or(u32::MAX);
        SessionSummary::from_persisted(
            self.kind.label(),
            self.started_at,
            completed_at,
            count(table.total()),
            count(table.answered()),
            count(table.correct()),
            count(table.unknown()),
        )
    }

    fn total(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    fn record(&mut self, question: &QuestionRef, choice: Choice, correct: Option<Choice>) -> Effect {
        let id = question.id();
        let entry = HistoryEntry::judge(choice, correct);
        match self.history.record(id.clone(), entry, self.policy) {
            RecordOutcome::Recorded(entry) | RecordOutcome::Replaced { entry, .. } => {
                Effect::AnswerRecorded { id, entry }
            }
            RecordOutcome::AlreadyAnswered(existing) => Effect::AnswerIgnored { id, existing },
        }
    }
}

/// Parameters common to both ways of starting a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStart {
    /// Must be newer than any generation handed out before.
    pub generation: Generation,
    pub policy: AnswerPolicy,
    pub started_at: DateTime<Utc>,
}

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

/// Browsing one edition's paper; `position` is within `1..=total`.
#[derive(Debug, Clone, PartialEq)]
pub struct EditionCursor {
    session: Session,
    position: QuestionNumber,
}

impl EditionCursor {
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn position(&self) -> QuestionNumber {
        self.position
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.session.total()
    }

    #[must_use]
    pub fn current(&self) -> &QuestionRef {
        let index = usize::try_from(self.position.value() - 1).unwrap_or(usize::MAX);
        &self.session.questions[index]
    }
}

/// Browsing a field list; `index` is within `0..len`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCursor {
    session: Session,
    index: usize,
}

impl FieldCursor {
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current(&self) -> &QuestionRef {
        &self.session.questions[self.index]
    }
}

/// Where to go back to when the results view is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Edition(QuestionNumber),
    Field(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsState {
    session: Session,
    resume: Resume,
}

impl ResultsState {
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn resume(&self) -> Resume {
        self.resume
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewerState {
    #[default]
    Idle,
    EditionMode(EditionCursor),
    FieldMode(FieldCursor),
    Results(ResultsState),
}

//
// ─── EVENTS & EFFECTS ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Browse `total_questions` questions of one edition's `subject` paper.
    StartEdition {
        start: SessionStart,
        edition: EditionId,
        subject: Subject,
        total_questions: u32,
    },
    StartField {
        start: SessionStart,
        field: FieldGroup,
    },
    Next,
    Prev,
    JumpTo(QuestionNumber),
    /// `correct` is the key's choice for the current question, if any.
    Answer {
        choice: Choice,
        correct: Option<Choice>,
    },
    ShowResults,
    CloseResults,
    /// Jump to a row of the results table.
    Review(usize),
    Reset,
}

/// Identifies one question load so late responses can be recognised.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub generation: Generation,
    pub question: QuestionRef,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The current question changed: load its key and page.
    LoadQuestion(LoadTicket),
    AnswerRecorded {
        id: QuestionId,
        entry: HistoryEntry,
    },
    /// The question already had a verdict; nothing was recorded.
    AnswerIgnored {
        id: QuestionId,
        existing: HistoryEntry,
    },
    ResultsOpened,
    Cleared,
    Unchanged,
    Rejected(NavigationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ViewerState,
    pub effect: Effect,
}

impl Transition {
    fn new(state: ViewerState, effect: Effect) -> Self {
        Self { state, effect }
    }

    fn rejected(state: ViewerState, error: NavigationError) -> Self {
        Self::new(state, Effect::Rejected(error))
    }

    fn load(state: ViewerState) -> Self {
        match state.ticket() {
            Some(ticket) => Self::new(state, Effect::LoadQuestion(ticket)),
            None => Self::new(state, Effect::Unchanged),
        }
    }
}

#[derive(Clone, Copy)]
enum Step {
    Back,
    Forward,
}

//
// ─── REDUCER ───────────────────────────────────────────────────────────────────
//

impl ViewerState {
    /// Apply one event. Rejected events hand back the unchanged state.
    #[must_use]
    pub fn apply(self, event: Event) -> Transition {
        match event {
            Event::StartEdition {
                start,
                edition,
                subject,
                total_questions,
            } => Self::start_edition(start, edition, subject, total_questions),
            Event::StartField { start, field } => Self::start_field(start, field),
            Event::Next => self.step(Step::Forward),
            Event::Prev => self.step(Step::Back),
            Event::JumpTo(number) => self.jump_to(number),
            Event::Answer { choice, correct } => self.answer(choice, correct),
            Event::ShowResults => self.show_results(),
            Event::CloseResults => self.close_results(),
            Event::Review(row) => self.review(row),
            Event::Reset => Transition::new(Self::Idle, Effect::Cleared),
        }
    }

    // A new session always replaces the old one, so score and history start empty.
    fn start_edition(
        start: SessionStart,
        edition: EditionId,
        subject: Subject,
        total_questions: u32,
    ) -> Transition {
        if total_questions == 0 {
            return Transition::rejected(Self::Idle, NavigationError::EmptySession);
        }
        let questions = (1..=total_questions)
            .filter_map(QuestionNumber::new)
            .map(|number| QuestionRef::new(edition, subject.clone(), number))
            .collect();
        let session = Session::new(start, SessionKind::Edition { edition, subject }, questions);
        Transition::load(Self::EditionMode(EditionCursor {
            session,
            position: QuestionNumber::first(),
        }))
    }

    fn start_field(start: SessionStart, field: FieldGroup) -> Transition {
        if field.questions().is_empty() {
            return Transition::rejected(Self::Idle, NavigationError::EmptySession);
        }
        let kind = SessionKind::Field {
            subject: field.subject().clone(),
            field_name: field.name().to_string(),
        };
        let session = Session::new(start, kind, field.questions().to_vec());
        Transition::load(Self::FieldMode(FieldCursor { session, index: 0 }))
    }

    fn step(self, step: Step) -> Transition {
        match self {
            Self::EditionMode(mut cursor) => {
                let target = match step {
                    Step::Back => cursor.position.prev(),
                    Step::Forward => (cursor.position.value() < cursor.total_questions())
                        .then(|| cursor.position.next()),
                };
                match target {
                    Some(position) => {
                        cursor.position = position;
                        Transition::load(Self::EditionMode(cursor))
                    }
                    None => Transition::rejected(Self::EditionMode(cursor), boundary_error(step)),
                }
            }
            Self::FieldMode(mut cursor) => {
                let len = cursor.session.questions.len();
                let target = match step {
                    Step::Back => cursor.index.checked_sub(1),
                    Step::Forward => (cursor.index + 1 < len).then_some(cursor.index + 1),
                };
                match target {
                    Some(index) => {
                        cursor.index = index;
                        Transition::load(Self::FieldMode(cursor))
                    }
                    None => Transition::rejected(Self::FieldMode(cursor), boundary_error(step)),
                }
            }
            other => other.reject_inactive(),
        }
    }

    fn jump_to(self, number: QuestionNumber) -> Transition {
        match self {
            Self::EditionMode(mut cursor) => {
                let total = cursor.total_questions();
                if number.value() > total {
                    return Transition::rejected(
                        Self::EditionMode(cursor),
                        NavigationError::PositionOutOfRange {
                            requested: number.value(),
                            total,
                        },
                    );
                }
                if number == cursor.position {
                    return Transition::new(Self::EditionMode(cursor), Effect::Unchanged);
                }
                cursor.position = number;
                Transition::load(Self::EditionMode(cursor))
            }
            Self::FieldMode(cursor) => {
                Transition::rejected(Self::FieldMode(cursor), NavigationError::JumpNotAllowed)
            }
            other => other.reject_inactive(),
        }
    }

    fn answer(self, choice: Choice, correct: Option<Choice>) -> Transition {
        match self {
            Self::EditionMode(mut cursor) => {
                let question = cursor.current().clone();
                let effect = cursor.session.record(&question, choice, correct);
                Transition::new(Self::EditionMode(cursor), effect)
            }
            Self::FieldMode(mut cursor) => {
                let question = cursor.current().clone();
                let effect = cursor.session.record(&question, choice, correct);
                Transition::new(Self::FieldMode(cursor), effect)
            }
            other => other.reject_inactive(),
        }
    }

    fn show_results(self) -> Transition {
        match self {
            Self::EditionMode(cursor) => Transition::new(
                Self::Results(ResultsState {
                    session: cursor.session,
                    resume: Resume::Edition(cursor.position),
                }),
                Effect::ResultsOpened,
            ),
            Self::FieldMode(cursor) => Transition::new(
                Self::Results(ResultsState {
                    session: cursor.session,
                    resume: Resume::Field(cursor.index),
                }),
                Effect::ResultsOpened,
            ),
            Self::Results(results) => Transition::new(Self::Results(results), Effect::Unchanged),
            Self::Idle => Transition::rejected(Self::Idle, NavigationError::NoActiveSession),
        }
    }

    fn close_results(self) -> Transition {
        match self {
            Self::Results(results) => {
                let resume = results.resume;
                Transition::load(results.resume_at(resume))
            }
            other => Transition::rejected(other, NavigationError::NotShowingResults),
        }
    }

    fn review(self, row: usize) -> Transition {
        match self {
            Self::Results(results) => {
                let len = results.session.questions.len();
                let Some(question) = results.session.questions.get(row) else {
                    return Transition::rejected(
                        Self::Results(results),
                        NavigationError::ReviewOutOfRange { row, len },
                    );
                };
                let resume = match results.session.kind {
                    SessionKind::Edition { .. } => Resume::Edition(question.number),
                    SessionKind::Field { .. } => Resume::Field(row),
                };
                Transition::load(results.resume_at(resume))
            }
            other => Transition::rejected(other, NavigationError::NotShowingResults),
        }
    }

    fn reject_inactive(self) -> Transition {
        let error = match self {
            Self::Results(_) => NavigationError::ResultsOpen,
            _ => NavigationError::NoActiveSession,
        };
        Transition::rejected(self, error)
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Idle => None,
            Self::EditionMode(cursor) => Some(&cursor.session),
            Self::FieldMode(cursor) => Some(&cursor.session),
            Self::Results(results) => Some(&results.session),
        }
    }

    /// Question on screen; `None` while idle or showing results.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuestionRef> {
        match self {
            Self::EditionMode(cursor) => Some(cursor.current()),
            Self::FieldMode(cursor) => Some(cursor.current()),
            Self::Idle | Self::Results(_) => None,
        }
    }

    /// Recorded answer for the question on screen.
    #[must_use]
    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        let question = self.current_question()?;
        self.session()?.history.get(&question.id())
    }

    /// `(current, total)`, both 1-based for display.
    #[must_use]
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            Self::EditionMode(cursor) => {
                Some((cursor.position.value(), cursor.total_questions()))
            }
            Self::FieldMode(cursor) => {
                let current = u32::try_from(cursor.index + 1).unwrap_or(u32::MAX);
                Some((current, cursor.session.total()))
            }
            Self::Idle | Self::Results(_) => None,
        }
    }

    #[must_use]
    pub fn can_prev(&self) -> bool {
        self.position().is_some_and(|(current, _)| current > 1)
    }

    #[must_use]
    pub fn can_next(&self) -> bool {
        self.position().is_some_and(|(current, total)| current < total)
    }

    #[must_use]
    pub fn can_jump(&self) -> bool {
        matches!(self, Self::EditionMode(_))
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.session().map_or(0, Session::score)
    }

    #[must_use]
    pub fn generation(&self) -> Option<Generation> {
        self.session().map(Session::generation)
    }

    /// Ticket for the question on screen.
    #[must_use]
    pub fn ticket(&self) -> Option<LoadTicket> {
        Some(LoadTicket {
            generation: self.generation()?,
            question: self.current_question()?.clone(),
        })
    }

    /// Whether a load issued for `ticket` still matches what is on screen.
    #[must_use]
    pub fn accepts(&self, ticket: &LoadTicket) -> bool {
        self.ticket().as_ref() == Some(ticket)
    }
}

impl ResultsState {
    fn resume_at(self, resume: Resume) -> ViewerState {
        match resume {
            Resume::Edition(position) => ViewerState::EditionMode(EditionCursor {
                session: self.session,
                position,
            }),
            Resume::Field(index) => ViewerState::FieldMode(FieldCursor {
                session: self.session,
                index,
            }),
        }
    }
}

fn boundary_error(step: Step) -> NavigationError {
    match step {
        Step::Back => NavigationError::AtFirstQuestion,
        Step::Forward => NavigationError::AtLastQuestion,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

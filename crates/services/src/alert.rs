use std::fmt;

/// What went wrong, for styling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    CatalogUnavailable,
    FieldsUnavailable,
    AnswerKeyMissing,
    DocumentMissing,
    EmptyDocument,
    RenderFailed,
    SummaryNotSaved,
}

/// User-facing notice raised by a loader fallback.
///
/// Loaders never fail outright; they degrade to empty data and hand back one
/// of these for the UI to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    kind: AlertKind,
    message: String,
    path: Option<String>,
}

impl Alert {
    #[must_use]
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} (path: {path})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A loader result: the value to use plus an alert when it is a fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub alert: Option<Alert>,
}

impl<T> Loaded<T> {
    #[must_use]
    pub fn ok(value: T) -> Self {
        Self { value, alert: None }
    }

    #[must_use]
    pub fn fallback(value: T, alert: Alert) -> Self {
        Self {
            value,
            alert: Some(alert),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.alert.is_some()
    }
}

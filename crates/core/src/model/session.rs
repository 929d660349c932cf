use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::scoring::Accuracy;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("session label cannot be empty")]
    EmptyLabel,

    #[error("answered ({answered}) exceeds total questions ({total})")]
    TooManyAnswers { answered: u32, total: u32 },

    #[error("verdict counts ({sum}) exceed answered ({answered})")]
    CountMismatch { answered: u32, sum: u32 },
}

/// Aggregate record of one viewing session, kept after the session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    label: String,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total: u32,
    answered: u32,
    correct: u32,
    unknown: u32,
}

impl SessionSummary {
    /// Rehydrate a session summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if timestamps or counts are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        label: impl Into<String>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total: u32,
        answered: u32,
        correct: u32,
        unknown: u32,
    ) -> Result<Self, SessionSummaryError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(SessionSummaryError::EmptyLabel);
        }
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if answered > total {
            return Err(SessionSummaryError::TooManyAnswers { answered, total });
        }
        let sum = correct.saturating_add(unknown);
        if sum > answered {
            return Err(SessionSummaryError::CountMismatch { answered, sum });
        }

        Ok(Self {
            label,
            started_at,
            completed_at,
            total,
            answered,
            correct,
            unknown,
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        self.answered
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn unknown(&self) -> u32 {
        self.unknown
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.answered - self.correct - self.unknown
    }

    #[must_use]
    pub fn accuracy(&self) -> Accuracy {
        Accuracy::new(self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn summary_derives_incorrect_and_accuracy() {
        let now = fixed_now();
        let summary = SessionSummary::from_persisted("edition 75 / kanka", now, now, 3, 3, 2, 0)
            .unwrap();
        assert_eq!(summary.incorrect(), 1);
        assert_eq!(summary.accuracy().to_string(), "66.7");
    }

    #[test]
    fn summary_rejects_inconsistent_counts() {
        let now = fixed_now();
        let err = SessionSummary::from_persisted("x", now, now, 2, 3, 0, 0).unwrap_err();
        assert_eq!(err, SessionSummaryError::TooManyAnswers { answered: 3, total: 2 });

        let err = SessionSummary::from_persisted("x", now, now, 5, 2, 2, 1).unwrap_err();
        assert_eq!(err, SessionSummaryError::CountMismatch { answered: 2, sum: 3 });
    }

    #[test]
    fn summary_rejects_reversed_time_range() {
        let now = fixed_now();
        let earlier = now - chrono::Duration::minutes(1);
        let err = SessionSummary::from_persisted("x", now, earlier, 1, 0, 0, 0).unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }
}

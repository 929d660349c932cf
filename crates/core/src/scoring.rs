use std::fmt;

/// Share of session questions answered correctly.
///
/// Questions without key data and unanswered questions still count towards
/// the denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accuracy {
    correct: u32,
    total: u32,
}

impl Accuracy {
    /// `correct` is clamped to `total`.
    #[must_use]
    pub fn new(correct: u32, total: u32) -> Self {
        Self {
            correct: correct.min(total),
            total,
        }
    }

    #[must_use]
    pub fn from_counts(correct: usize, total: usize) -> Self {
        let clamp = |value: usize| u32::try_from(value).unwrap_or(u32::MAX);
        Self::new(clamp(correct), clamp(total))
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Percentage in `[0, 100]`; an empty session scores 0.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) * 100.0 / f64::from(self.total)
    }
}

/// One decimal place, no percent sign.
impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.percent())
    }
}

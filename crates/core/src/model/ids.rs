use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Identifier of one exam sitting (e.g. the 75th edition).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EditionId(u32);

impl EditionId {
    /// Creates a new `EditionId`
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// 1-based logical question number within one document.
///
/// The physical page index is always one greater, because page 1 of every
/// exam document is a cover page.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct QuestionNumber(NonZeroU32);

impl QuestionNumber {
    /// Returns `None` for zero.
    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    #[must_use]
    pub fn first() -> Self {
        Self(NonZeroU32::MIN)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0.get()
    }

    /// Physical page holding this question.
    #[must_use]
    pub fn page_index(&self) -> PageIndex {
        PageIndex(self.0.saturating_add(1))
    }

    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    #[must_use]
    pub fn prev(&self) -> Option<Self> {
        Self::new(self.value() - 1)
    }
}

impl TryFrom<u32> for QuestionNumber {
    type Error = ParseIdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ParseIdError {
            kind: "QuestionNumber".to_string(),
        })
    }
}

impl From<QuestionNumber> for u32 {
    fn from(value: QuestionNumber) -> Self {
        value.value()
    }
}

/// 1-based physical page of a document, cover page included.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageIndex(NonZeroU32);

impl PageIndex {
    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0.get()
    }
}

/// Number of answerable questions in a document with `page_count` pages.
#[must_use]
pub fn question_count_for_pages(page_count: u32) -> u32 {
    page_count.saturating_sub(1)
}

/// A selectable answer, numbered from 1 like the printed choices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Choice(u8);

impl Choice {
    /// Returns `None` for zero.
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Choice {
    type Error = ParseIdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ParseIdError {
            kind: "Choice".to_string(),
        })
    }
}

impl From<Choice> for u8 {
    fn from(value: Choice) -> Self {
        value.0
    }
}

impl fmt::Debug for EditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EditionId({})", self.0)
    }
}

impl fmt::Debug for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionNumber({})", self.0)
    }
}

impl fmt::Debug for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageIndex({})", self.0)
    }
}

impl fmt::Debug for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Choice({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for EditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for EditionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(EditionId::new)
            .map_err(|_| ParseIdError {
                kind: "EditionId".to_string(),
            })
    }
}

impl FromStr for QuestionNumber {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(QuestionNumber::new)
            .ok_or_else(|| ParseIdError {
                kind: "QuestionNumber".to_string(),
            })
    }
}

impl FromStr for Choice {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Choice::new)
            .ok_or_else(|| ParseIdError {
                kind: "Choice".to_string(),
            })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

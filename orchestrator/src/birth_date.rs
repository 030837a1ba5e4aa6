// Birth date input: the only user-supplied value in a run

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Accepted input layout (DD/MM/AAAA).
pub const BIRTH_DATE_FORMAT: &str = "%d/%m/%Y";

// chrono's `%Y` takes any width and a sign, so the shape is checked first.
const BIRTH_DATE_SHAPE: &str = r"^[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}$";

static SHAPE_RE: OnceLock<Regex> = OnceLock::new();

fn shape() -> &'static Regex {
    SHAPE_RE.get_or_init(|| Regex::new(BIRTH_DATE_SHAPE).expect("birth date shape is valid"))
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BirthDateError {
    #[error("birth date is empty")]
    Empty,

    #[error("birth date '{0}' does not match DD/MM/AAAA")]
    Format(String),
}

/// A validated calendar date together with the exact text the user typed.
///
/// The original text is what gets substituted into prompts and file names,
/// so it is kept verbatim rather than re-rendered from the parsed date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthDate {
    raw: String,
    date: NaiveDate,
}

impl BirthDate {
    pub fn parse(input: &str) -> Result<Self, BirthDateError> {
        if input.trim().is_empty() {
            return Err(BirthDateError::Empty);
        }

        if !shape().is_match(input) {
            return Err(BirthDateError::Format(input.to_string()));
        }

        let date = NaiveDate::parse_from_str(input, BIRTH_DATE_FORMAT)
            .map_err(|_| BirthDateError::Format(input.to_string()))?;

        Ok(Self {
            raw: input.to_string(),
            date,
        })
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Date text with every separator replaced by a hyphen, safe for file names.
    pub fn file_stem(&self) -> String {
        self.raw.replace('/', "-")
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for BirthDate {
    type Err = BirthDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ABOUTME: Calendar-date parsing for article listings and inclusive date ranges.
// ABOUTME: Supports "Month DD, YYYY", "MM/DD/YYYY", and ISO "YYYY-MM-DD" date labels.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Date label formats seen on athletics sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// "March 5, 2024"
    Long,
    /// "03/05/2024"
    Slash,
    /// "2024-03-05"
    Iso,
}

impl DateFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::Long => "%B %d, %Y",
            DateFormat::Slash => "%m/%d/%Y",
            DateFormat::Iso => "%Y-%m-%d",
        }
    }

    /// Parses a trimmed label in this format.
    pub fn parse(self, s: &str) -> Result<NaiveDate, TableError> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, self.pattern())
            .map_err(|_| TableError::date_parse(s, self.pattern()))
    }
}

/// Parses "Month DD, YYYY".
pub fn parse_long_date(s: &str) -> Result<NaiveDate, TableError> {
    DateFormat::Long.parse(s)
}

/// Parses "MM/DD/YYYY".
pub fn parse_slash_date(s: &str) -> Result<NaiveDate, TableError> {
    DateFormat::Slash.parse(s)
}

/// Parses "YYYY-MM-DD", the format accepted on the command line.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, TableError> {
    DateFormat::Iso.parse(s)
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TableError> {
        if start > end {
            return Err(TableError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// True when `date` lies within `[start, end]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ABOUTME: Value types flowing through box-score resolution and artifact orchestration.
// ABOUTME: Includes the validated box-score count, resolution outcomes, and the per-run report.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use gameday_tables::DateRange;
use serde::Serialize;

use crate::error::EngineError;

/// A calendar row that matched the target team, before any further hops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub date: Option<String>,
    /// Next location in the chain: the PDF itself (single-hop) or a match-detail page.
    pub navigation_url: String,
}

impl MatchCandidate {
    /// Human-readable label used in failure reports.
    pub fn label(&self) -> String {
        match (&self.home_team, &self.away_team) {
            (Some(home), Some(away)) => match &self.date {
                Some(date) => format!("{} vs. {} on {}", home, away, date),
                None => format!("{} vs. {}", home, away),
            },
            _ => self.navigation_url.clone(),
        }
    }
}

/// Terminal artifact of a resolution chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBoxScore {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub date: Option<String>,
    pub pdf_url: String,
}

/// Number of most recent box scores to resolve. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxScoreCount(NonZeroUsize);

impl BoxScoreCount {
    pub fn new(count: i64) -> Result<Self, EngineError> {
        usize::try_from(count)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or_else(|| {
                EngineError::invalid_request(
                    "count",
                    format!("box score count must be positive, got {}", count),
                )
            })
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// One item that could not be resolved. Never aborts the batch.
#[derive(Debug)]
pub struct ItemFailure {
    pub item: String,
    pub error: EngineError,
}

/// Result of one resolver invocation: successes in calendar order plus item failures.
#[derive(Debug, Default)]
pub struct ResolveOutcome {
    pub resolved: Vec<ResolvedBoxScore>,
    pub failures: Vec<ItemFailure>,
}

impl ResolveOutcome {
    pub(crate) fn fail(&mut self, item: impl Into<String>, error: EngineError) {
        self.failures.push(ItemFailure {
            item: item.into(),
            error,
        });
    }
}

/// What the caller asked for in one run.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRequest {
    pub roster: bool,
    pub schedule: bool,
    pub stats_years: Vec<i32>,
    pub box_scores: Option<BoxScoreCount>,
    pub articles: Option<DateRange>,
}

impl ArtifactRequest {
    pub fn is_empty(&self) -> bool {
        !self.roster
            && !self.schedule
            && self.stats_years.is_empty()
            && self.box_scores.is_none()
            && self.articles.is_none()
    }

    /// Fails fast when nothing was requested.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.is_empty() {
            return Err(EngineError::invalid_request(
                "request",
                "no artifact selected",
            ));
        }
        Ok(())
    }
}

/// Artifact family an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Roster,
    Schedule,
    Stats,
    BoxScore,
    Article,
}

/// One discrete outcome per artifact attempt.
#[derive(Debug)]
pub struct ArtifactOutcome {
    pub kind: ArtifactKind,
    /// Output file name, or the item label when no name could be formed.
    pub name: String,
    pub result: Result<PathBuf, EngineError>,
}

impl ArtifactOutcome {
    pub fn saved(kind: ArtifactKind, name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            kind,
            name: name.into(),
            result: Ok(path),
        }
    }

    pub fn failed(kind: ArtifactKind, name: impl Into<String>, error: EngineError) -> Self {
        Self {
            kind,
            name: name.into(),
            result: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Serializable view of one outcome for JSON reports.
#[derive(Debug, Serialize)]
pub struct OutcomeSummary<'a> {
    pub kind: ArtifactKind,
    pub name: &'a str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Aggregated outcomes for a whole run, in artifact-type order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub team: String,
    pub outcomes: Vec<ArtifactOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ArtifactOutcome::is_success)
    }

    pub fn summaries(&self) -> Vec<OutcomeSummary<'_>> {
        self.outcomes
            .iter()
            .map(|o| OutcomeSummary {
                kind: o.kind,
                name: &o.name,
                ok: o.is_success(),
                path: o.result.as_ref().ok().map(|p| p.display().to_string()),
                reason: o.result.as_ref().err().map(EngineError::reason),
            })
            .collect()
    }
}

// ABOUTME: Box-score resolution interface shared by the conference calendar providers.
// ABOUTME: A resolver is chosen once per team from its provider tag and applies trailing-N selection.

//! Box-score resolvers.
//!
//! Both providers honour one contract: given the rendered calendar page, the
//! team and a positive count, return the terminal PDF locations of the most
//! recent `count` qualifying matches plus any per-match failures. Selection
//! of the trailing candidates happens before any further navigation.

pub mod boost;
pub mod sidearm;

use async_trait::async_trait;
use tracing::info;

use crate::config::{Provider, TeamIdentity};
use crate::error::EngineError;
use crate::models::{BoxScoreCount, ResolveOutcome};
use crate::navigate::Navigator;

pub use boost::BoostResolver;
pub use sidearm::SidearmResolver;

/// Label of the calendar anchor that leads toward a box score.
pub const BOX_SCORE_LABEL: &str = "Box Score";

#[async_trait]
pub trait BoxScoreResolver: Send + Sync {
    fn provider(&self) -> Provider;

    /// Conference calendar page listing the team's matches.
    fn calendar_url(&self, team: &TeamIdentity) -> String;

    /// Resolve from an already rendered calendar page.
    async fn resolve(
        &self,
        nav: &mut dyn Navigator,
        calendar_html: &str,
        team: &TeamIdentity,
        count: BoxScoreCount,
    ) -> ResolveOutcome;

    /// Load the calendar with `nav`, then resolve from it.
    ///
    /// Only a failure to load the calendar itself is returned as an error.
    async fn locate(
        &self,
        nav: &mut dyn Navigator,
        team: &TeamIdentity,
        count: BoxScoreCount,
    ) -> Result<ResolveOutcome, EngineError> {
        let url = self.calendar_url(team);
        let calendar_html = nav.goto(&url).await?;
        let outcome = self.resolve(nav, &calendar_html, team, count).await;
        info!(
            provider = ?self.provider(),
            resolved = outcome.resolved.len(),
            failed = outcome.failures.len(),
            "box scores resolved"
        );
        Ok(outcome)
    }
}

/// Resolver for a provider tag.
pub fn resolver_for(provider: Provider) -> &'static dyn BoxScoreResolver {
    match provider {
        Provider::Boost => &BoostResolver,
        Provider::Sidearm => &SidearmResolver,
    }
}

/// The last `count` items, or all of them when there are fewer.
pub fn trailing<T>(mut items: Vec<T>, count: BoxScoreCount) -> Vec<T> {
    let keep = count.get().min(items.len());
    items.split_off(items.len() - keep)
}

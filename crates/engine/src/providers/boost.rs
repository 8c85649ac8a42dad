// ABOUTME: Single-hop resolver for Boost conference schedules.
// ABOUTME: Rows naming the team's abbreviation carry a "Box Score" anchor pointing straight at the PDF.

use async_trait::async_trait;
use gameday_tables::table::body_rows;
use gameday_tables::{absolutize, element_text};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{trailing, BoxScoreResolver, BOX_SCORE_LABEL};
use crate::config::{Provider, TeamIdentity};
use crate::error::EngineError;
use crate::models::{BoxScoreCount, MatchCandidate, ResolveOutcome, ResolvedBoxScore};
use crate::navigate::Navigator;

/// Cell positions holding the two team abbreviations in a schedule row.
const TEAM_CELLS: [usize; 2] = [2, 4];

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct BoostResolver;

#[async_trait]
impl BoxScoreResolver for BoostResolver {
    fn provider(&self) -> Provider {
        Provider::Boost
    }

    fn calendar_url(&self, team: &TeamIdentity) -> String {
        format!(
            "{}/{}/schedule/?teamFilter={}",
            team.conference.base_url, team.sport_path, team.abbreviation
        )
    }

    async fn resolve(
        &self,
        _nav: &mut dyn Navigator,
        calendar_html: &str,
        team: &TeamIdentity,
        count: BoxScoreCount,
    ) -> ResolveOutcome {
        let mut outcome = ResolveOutcome::default();
        let candidates = match scan_schedule(calendar_html, team) {
            Ok(candidates) => candidates,
            Err(e) => {
                outcome.fail(self.calendar_url(team), e);
                return outcome;
            }
        };
        debug!(qualifying = candidates.len(), "boost schedule scanned");

        outcome.resolved = trailing(candidates, count)
            .into_iter()
            .map(|c| ResolvedBoxScore {
                home_team: c.home_team,
                away_team: c.away_team,
                date: c.date,
                pdf_url: c.navigation_url,
            })
            .collect();
        outcome
    }
}

/// Box-score links of every row in the first table that names the team.
fn scan_schedule(html: &str, team: &TeamIdentity) -> Result<Vec<MatchCandidate>, EngineError> {
    let doc = Html::parse_document(html);
    let table = doc.select(&TABLE).next().ok_or_else(|| {
        EngineError::missing_element(
            team.conference.base_url.as_str(),
            "Resolve",
            "no schedule table on calendar",
        )
    })?;

    let candidates = body_rows(table)
        .into_iter()
        .filter(|tr| row_names_team(*tr, &team.abbreviation))
        .filter_map(box_score_href)
        .map(|href| MatchCandidate {
            home_team: None,
            away_team: None,
            date: None,
            navigation_url: absolutize(&team.conference.base_url, &href),
        })
        .collect();
    Ok(candidates)
}

fn row_names_team(tr: ElementRef<'_>, abbreviation: &str) -> bool {
    let cells: Vec<String> = tr.select(&TD).map(|td| element_text(&td)).collect();
    TEAM_CELLS
        .iter()
        .any(|&i| cells.get(i).is_some_and(|text| text == abbreviation))
}

fn box_score_href(tr: ElementRef<'_>) -> Option<String> {
    tr.select(&ANCHOR)
        .find(|a| element_text(a) == BOX_SCORE_LABEL)
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedNavigator, ScriptedSite};
    use pretty_assertions::assert_eq;

    fn team() -> TeamIdentity {
        crate::testing::sample_team("Northwestern", "NU", Provider::Boost)
    }

    fn row(opponent_abbr: &str, ours_home: bool, href: Option<&str>) -> String {
        let (left, right) = if ours_home {
            ("NU", opponent_abbr)
        } else {
            (opponent_abbr, "NU")
        };
        let link = href
            .map(|h| format!(r#"<a href="{h}">Box Score</a>"#))
            .unwrap_or_default();
        format!(
            "<tr><td>Sep 1</td><td>7:00</td><td>{left}</td><td>vs</td><td>{right}</td><td>{link}</td></tr>"
        )
    }

    fn calendar(rows: &[String]) -> String {
        format!(
            "<html><body><table><thead><tr><th>Date</th></tr></thead><tbody>{}</tbody></table></body></html>",
            rows.concat()
        )
    }

    #[tokio::test]
    async fn keeps_trailing_rows_for_team() {
        let rows: Vec<String> = (0..10)
            .map(|i| row("IU", i % 2 == 0, Some(&format!("/documents/msoc/{i}.pdf"))))
            .collect();
        let html = calendar(&rows);
        let site = ScriptedSite::new();
        let mut nav = ScriptedNavigator::new(site.clone());

        let outcome = BoostResolver
            .resolve(&mut nav, &html, &team(), BoxScoreCount::new(3).unwrap())
            .await;

        let urls: Vec<&str> = outcome.resolved.iter().map(|r| r.pdf_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://bigten.org/documents/msoc/7.pdf",
                "https://bigten.org/documents/msoc/8.pdf",
                "https://bigten.org/documents/msoc/9.pdf",
            ]
        );
        assert!(site.visits().is_empty());
    }

    #[tokio::test]
    async fn skips_other_teams_and_rows_without_link() {
        let html = calendar(&[
            "<tr><td>Sep 1</td><td>7:00</td><td>OSU</td><td>vs</td><td>IU</td><td><a href=\"/x.pdf\">Box Score</a></td></tr>".to_string(),
            row("UIC", true, None),
            row("UIC", false, Some("https://cdn.bigten.org/final.pdf")),
        ]);
        let mut nav = ScriptedNavigator::new(ScriptedSite::new());
        let outcome = BoostResolver
            .resolve(&mut nav, &html, &team(), BoxScoreCount::new(5).unwrap())
            .await;
        assert_eq!(outcome.resolved.len(), 1);
        assert_eq!(outcome.resolved[0].pdf_url, "https://cdn.bigten.org/final.pdf");
        assert_eq!(outcome.resolved[0].home_team, None);
    }

    #[tokio::test]
    async fn calendar_without_table_is_one_failure() {
        let mut nav = ScriptedNavigator::new(ScriptedSite::new());
        let outcome = BoostResolver
            .resolve(&mut nav, "<p>maintenance</p>", &team(), BoxScoreCount::new(1).unwrap())
            .await;
        assert!(outcome.resolved.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].error.is_missing_element());
    }

    #[test]
    fn calendar_url_filters_by_abbreviation() {
        assert_eq!(
            BoostResolver.calendar_url(&team()),
            "https://bigten.org/msoc/schedule/?teamFilter=NU"
        );
    }
}

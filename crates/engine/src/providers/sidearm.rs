// ABOUTME: Three-hop resolver for Sidearm conference calendars.
// ABOUTME: Calendar row -> match detail page (print-bar link) -> print preview (embedded PDF).

//! Sidearm calendars group matches into one table per matchday, with the
//! date in the table caption. A box score is reached in three page loads:
//!
//! 1. the calendar, where a row's "Box Score" anchor gives the match page;
//! 2. the match page, whose `#print-bar` anchor gives the print preview;
//! 3. the print preview, whose `<object data>` (or "Open" anchor) is the PDF.
//!
//! A match missing any of these fails on its own; the rest continue.

use async_trait::async_trait;
use gameday_tables::table::body_rows;
use gameday_tables::{absolutize, element_text};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{trailing, BoxScoreResolver, BOX_SCORE_LABEL};
use crate::config::{Provider, TeamIdentity};
use crate::error::EngineError;
use crate::models::{BoxScoreCount, MatchCandidate, ResolveOutcome, ResolvedBoxScore};
use crate::navigate::Navigator;

/// Label of the preview anchor used when no embedded object is present.
const OPEN_LABEL: &str = "Open";

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static AWAY_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[class*="sidearm-team-away"]"#).unwrap());
static HOME_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"td[class*="sidearm-team-home"]"#).unwrap());
static TEAM_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.sidearm-calendar-list-group-list-game-team-title").unwrap());
static TEAM_LABEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a, span").unwrap());
static CAPTION_DATE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("caption span.hide-on-medium.sidearm-calendar-list-group-heading-date").unwrap()
});
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static PRINT_BAR_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div#print-bar a[href]").unwrap());
static PDF_OBJECT: Lazy<Selector> = Lazy::new(|| Selector::parse("object[data]").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct SidearmResolver;

#[async_trait]
impl BoxScoreResolver for SidearmResolver {
    fn provider(&self) -> Provider {
        Provider::Sidearm
    }

    fn calendar_url(&self, team: &TeamIdentity) -> String {
        format!(
            "{}/calendar.aspx?path={}",
            team.conference.base_url, team.sport_path
        )
    }

    async fn resolve(
        &self,
        nav: &mut dyn Navigator,
        calendar_html: &str,
        team: &TeamIdentity,
        count: BoxScoreCount,
    ) -> ResolveOutcome {
        let candidates = scan_calendar(calendar_html, team);
        debug!(qualifying = candidates.len(), "sidearm calendar scanned");

        let mut outcome = ResolveOutcome::default();
        for candidate in trailing(candidates, count) {
            match follow_match(nav, &candidate, &team.conference.base_url).await {
                Ok(pdf_url) => outcome.resolved.push(ResolvedBoxScore {
                    home_team: candidate.home_team,
                    away_team: candidate.away_team,
                    date: candidate.date,
                    pdf_url,
                }),
                Err(e) => {
                    warn!(item = %candidate.label(), error = %e, "box score unavailable");
                    outcome.fail(candidate.label(), e);
                }
            }
        }
        outcome
    }
}

/// Hops two and three for one match.
async fn follow_match(
    nav: &mut dyn Navigator,
    candidate: &MatchCandidate,
    conference_base: &str,
) -> Result<String, EngineError> {
    let match_page = nav.goto(&candidate.navigation_url).await?;
    let print_href = print_bar_href(&match_page).ok_or_else(|| {
        EngineError::missing_element(
            candidate.navigation_url.as_str(),
            "Resolve",
            format!("No box score PDF available for {}", candidate.label()),
        )
    })?;
    let preview_url = absolutize(conference_base, &print_href);

    let preview = nav.goto(&preview_url).await?;
    let pdf = preview_document(&preview).ok_or_else(|| {
        EngineError::missing_element(
            preview_url.as_str(),
            "Resolve",
            "print preview has no embedded document",
        )
    })?;
    Ok(absolutize(conference_base, &pdf))
}

/// Qualifying matches in calendar order.
fn scan_calendar(html: &str, team: &TeamIdentity) -> Vec<MatchCandidate> {
    let doc = Html::parse_document(html);
    let mut candidates = Vec::new();

    for table in doc.select(&TABLE) {
        let date = table
            .select(&CAPTION_DATE)
            .next()
            .map(|span| element_text(&span).replace('/', "_"));

        for tr in body_rows(table) {
            let away = team_name(tr, &AWAY_CELL);
            let home = team_name(tr, &HOME_CELL);
            let ours = |name: &Option<String>| name.as_deref() == Some(team.name.as_str());
            if !ours(&home) && !ours(&away) {
                continue;
            }

            let Some(href) = tr
                .select(&ANCHOR)
                .find(|a| element_text(a) == BOX_SCORE_LABEL)
                .and_then(|a| a.value().attr("href"))
            else {
                continue;
            };

            candidates.push(MatchCandidate {
                home_team: home,
                away_team: away,
                date: date.clone(),
                navigation_url: absolutize(&team.conference.base_url, href),
            });
        }
    }
    candidates
}

fn team_name(tr: ElementRef<'_>, cell: &Selector) -> Option<String> {
    let td = tr.select(cell).next()?;
    let title = td.select(&TEAM_TITLE).next()?;
    let label = title.select(&TEAM_LABEL).next()?;
    Some(element_text(&label))
}

fn print_bar_href(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let link = doc.select(&PRINT_BAR_LINK).next()?;
    link.value().attr("href").map(str::to_string)
}

fn preview_document(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    if let Some(data) = doc
        .select(&PDF_OBJECT)
        .next()
        .and_then(|o| o.value().attr("data"))
    {
        return Some(data.to_string());
    }
    let open = doc
        .select(&ANCHOR)
        .find(|a| element_text(a) == OPEN_LABEL)?;
    open.value().attr("href").map(str::to_string)
}

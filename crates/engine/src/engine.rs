// ABOUTME: The Engine orchestrates artifact requests: roster, schedule, stats, box scores, and articles.
// ABOUTME: Artifact types run concurrently in isolated sessions; items within one type run sequentially.

use std::path::PathBuf;
use std::sync::Arc;

use gameday_tables::{
    absolutize, collect_tables, element_text, normalize_list, scan_article_page, ArticleListing,
    DateRange,
};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{info, instrument, warn};

use crate::config::{ArticleDisplay, ArticleSource, TeamIdentity};
use crate::error::EngineError;
use crate::formats::build_table_document;
use crate::models::{ArtifactKind, ArtifactOutcome, ArtifactRequest, BoxScoreCount, RunReport};
use crate::naming::{
    article_filename, box_score_filename, roster_filename, schedule_filename, stats_filename,
};
use crate::navigate::{Navigator, NavigatorFactory, Session};
use crate::options::{EngineBuilder, EngineOptions};
use crate::providers::resolver_for;
use crate::render::Renderer;
use crate::resource::Fetcher;
use crate::sink::ArtifactSink;

/// Overlay elements removed from article pages before printing.
pub const ARTICLE_OVERLAY_IDS: &[&str] = &[
    "divSatisfiChat",
    "transcend-consent-manager",
    "termly-code-snippet-support",
];

static ARCHIVE_LIST: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.vue-archives-stories ul").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static EMBED: Lazy<Selector> = Lazy::new(|| Selector::parse("embed[src]").unwrap());
static OBJECT: Lazy<Selector> = Lazy::new(|| Selector::parse("object[data]").unwrap());

/// Team page rendered as a table document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TablePage {
    Roster,
    Schedule,
}

impl TablePage {
    fn kind(self) -> ArtifactKind {
        match self {
            TablePage::Roster => ArtifactKind::Roster,
            TablePage::Schedule => ArtifactKind::Schedule,
        }
    }

    fn label(self) -> &'static str {
        match self {
            TablePage::Roster => "Roster",
            TablePage::Schedule => "Schedule",
        }
    }
}

type Outcomes = Result<Vec<ArtifactOutcome>, EngineError>;

/// Extraction engine bound to one set of collaborators.
pub struct Engine {
    opts: EngineOptions,
    navigators: Arc<dyn NavigatorFactory>,
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
    sink: Arc<dyn ArtifactSink>,
}

impl Engine {
    /// Create a new EngineBuilder for configuring the engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn new(
        opts: EngineOptions,
        navigators: Arc<dyn NavigatorFactory>,
        fetcher: Arc<dyn Fetcher>,
        renderer: Arc<dyn Renderer>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            opts,
            navigators,
            fetcher,
            renderer,
            sink,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.opts
    }

    /// Produce every requested artifact for `team`.
    ///
    /// Item failures are reported in the returned [`RunReport`]. An `Err`
    /// means the run could not proceed at all: an invalid request, or a
    /// navigation session that could not be opened.
    pub async fn run(
        &self,
        team: &TeamIdentity,
        request: &ArtifactRequest,
    ) -> Result<RunReport, EngineError> {
        request.validate()?;
        if request.articles.is_some() && team.articles.is_none() {
            return Err(EngineError::invalid_request(
                "articles",
                format!("no articles page configured for {}", team.name),
            ));
        }

        let roster = async {
            if request.roster {
                self.table_page(team, TablePage::Roster).await
            } else {
                Ok(Vec::new())
            }
        };
        let schedule = async {
            if request.schedule {
                self.table_page(team, TablePage::Schedule).await
            } else {
                Ok(Vec::new())
            }
        };
        let stats = async {
            if request.stats_years.is_empty() {
                Ok(Vec::new())
            } else {
                self.stats(team, &request.stats_years).await
            }
        };
        let box_scores = async {
            match request.box_scores {
                Some(count) => self.box_scores(team, count).await,
                None => Ok(Vec::new()),
            }
        };
        let articles = async {
            match &request.articles {
                Some(range) => self.articles(team, range).await,
                None => Ok(Vec::new()),
            }
        };

        let (roster, schedule, stats, box_scores, articles) =
            tokio::join!(roster, schedule, stats, box_scores, articles);

        let mut report = RunReport {
            team: team.name.clone(),
            outcomes: Vec::new(),
        };
        for outcomes in [roster, schedule, stats, box_scores, articles] {
            report.outcomes.extend(outcomes?);
        }

        info!(
            team = %team.name,
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            "run finished"
        );
        Ok(report)
    }

    async fn open_session(&self, label: &str) -> Result<Session, EngineError> {
        Session::open(self.navigators.as_ref(), label).await
    }

    async fn release(session: Session) {
        if let Err(e) = session.close().await {
            warn!(error = %e, "failed to close navigation session");
        }
    }

    #[instrument(name = "artifact", skip_all, fields(kind = page.label(), team = %team.name))]
    async fn table_page(&self, team: &TeamIdentity, page: TablePage) -> Outcomes {
        let filename = match page {
            TablePage::Roster => roster_filename(team),
            TablePage::Schedule => schedule_filename(team),
        };
        let mut session = self.open_session(page.label()).await?;
        let result = self
            .render_table_page(session.navigator()?, team, page, &filename)
            .await;
        Self::release(session).await;
        Ok(vec![self.record(page.kind(), filename, result)])
    }

    async fn render_table_page(
        &self,
        nav: &mut dyn Navigator,
        team: &TeamIdentity,
        page: TablePage,
        filename: &str,
    ) -> Result<PathBuf, EngineError> {
        let (url, ignore) = match page {
            TablePage::Roster => (team.roster_url(), &team.ignore.roster),
            TablePage::Schedule => (team.schedule_url(), &team.ignore.schedule),
        };
        let html = nav.goto(&url).await?;

        let tables = collect_tables(&html, ignore);
        if tables.is_empty() {
            return Err(EngineError::missing_element(
                url.as_str(),
                "Extract",
                "no tables found on page",
            ));
        }
        for (i, table) in tables.iter().enumerate() {
            let misaligned = table.misaligned_rows();
            if !misaligned.is_empty() {
                warn!(table = i, rows = ?misaligned, "row length differs from column count");
            }
        }

        let title = format!("{} {} {}", team.name, team.sport_label, page.label());
        let document = build_table_document(&title, &tables);
        let pdf = self.renderer.render(&document).await?;
        self.sink.save(filename, &pdf).await
    }

    #[instrument(name = "artifact", skip_all, fields(kind = "stats", team = %team.name))]
    async fn stats(&self, team: &TeamIdentity, years: &[i32]) -> Outcomes {
        let mut session = self.open_session("stats").await?;
        let mut outcomes = Vec::with_capacity(years.len());
        for &year in years {
            let filename = stats_filename(team, year);
            let result = self
                .download_stats(session.navigator()?, team, year, &filename)
                .await;
            outcomes.push(self.record(ArtifactKind::Stats, filename, result));
        }
        Self::release(session).await;
        Ok(outcomes)
    }

    async fn download_stats(
        &self,
        nav: &mut dyn Navigator,
        team: &TeamIdentity,
        year: i32,
        filename: &str,
    ) -> Result<PathBuf, EngineError> {
        let url = team.stats_url(year);
        let html = nav.goto(&url).await?;
        let location = find_stats_pdf(&html, &self.opts.stats_prompts, &team.base_url)
            .ok_or_else(|| {
                EngineError::missing_element(url.as_str(), "Extract", "could not find the PDF url")
            })?;
        let fetched = self.fetcher.get(&location).await?;
        self.sink.save(filename, &fetched.body).await
    }

    #[instrument(name = "artifact", skip_all, fields(kind = "box_scores", team = %team.name))]
    async fn box_scores(&self, team: &TeamIdentity, count: BoxScoreCount) -> Outcomes {
        let resolver = resolver_for(team.conference.provider);
        let mut session = self.open_session("box scores").await?;
        let located = resolver.locate(session.navigator()?, team, count).await;
        Self::release(session).await;

        let outcome = match located {
            Ok(outcome) => outcome,
            Err(e) => {
                return Ok(vec![self.record(
                    ArtifactKind::BoxScore,
                    resolver.calendar_url(team),
                    Err(e),
                )]);
            }
        };

        let mut outcomes = Vec::new();
        for resolved in outcome.resolved {
            let filename = box_score_filename(&resolved);
            let result = match self.fetcher.get(&resolved.pdf_url).await {
                Ok(fetched) => self.sink.save(&filename, &fetched.body).await,
                Err(e) => Err(e),
            };
            outcomes.push(self.record(ArtifactKind::BoxScore, filename, result));
        }
        for failure in outcome.failures {
            outcomes.push(self.record(ArtifactKind::BoxScore, failure.item, Err(failure.error)));
        }
        Ok(outcomes)
    }

    #[instrument(name = "artifact", skip_all, fields(kind = "articles", team = %team.name))]
    async fn articles(&self, team: &TeamIdentity, range: &DateRange) -> Outcomes {
        let Some(source) = &team.articles else {
            return Ok(Vec::new());
        };
        let mut session = self.open_session("articles").await?;

        let listed = list_articles(session.navigator()?, team, source, range).await;
        let listing = match listed {
            Ok(listing) => listing,
            Err(e) => {
                Self::release(session).await;
                return Ok(vec![self.record(ArtifactKind::Article, source.url.clone(), Err(e))]);
            }
        };
        info!(
            entries = listing.entries.len(),
            rejected = listing.rejected.len(),
            "articles listed"
        );

        let mut outcomes = Vec::new();
        for rejected in listing.rejected {
            outcomes.push(self.record(
                ArtifactKind::Article,
                format!("article row {}", rejected.index),
                Err(EngineError::missing_element(
                    source.url.as_str(),
                    "Extract",
                    rejected.reason,
                )),
            ));
        }
        for entry in listing.entries {
            let filename = article_filename(&entry.headline);
            let result = self.print_article(session.navigator()?, &entry.url, &filename).await;
            outcomes.push(self.record(ArtifactKind::Article, filename, result));
        }
        Self::release(session).await;
        Ok(outcomes)
    }

    async fn print_article(
        &self,
        nav: &mut dyn Navigator,
        url: &str,
        filename: &str,
    ) -> Result<PathBuf, EngineError> {
        nav.goto(url).await?;
        nav.remove_elements_by_id(ARTICLE_OVERLAY_IDS).await?;
        let pdf = nav.print_page().await?;
        self.sink.save(filename, &pdf).await
    }

    fn record(
        &self,
        kind: ArtifactKind,
        name: impl Into<String>,
        result: Result<PathBuf, EngineError>,
    ) -> ArtifactOutcome {
        let name = name.into();
        match result {
            Ok(path) => {
                info!(artifact = %name, path = %path.display(), "saved");
                ArtifactOutcome::saved(kind, name, path)
            }
            Err(e) => {
                warn!(artifact = %name, error = %e, "failed");
                ArtifactOutcome::failed(kind, name, e)
            }
        }
    }
}

/// Locates the stats PDF on a team's stats page.
///
/// Checked in order: an anchor labelled with one of `prompts`, whose href
/// carries the document location in its first query parameter; an
/// `<embed src>`; an `<object data>`.
fn find_stats_pdf(html: &str, prompts: &[String], base_url: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    let prompted = doc
        .select(&ANCHOR)
        .find(|a| {
            let text = element_text(a);
            prompts.iter().any(|p| *p == text)
        })
        .and_then(|a| a.value().attr("href"))
        .map(|href| {
            let joined = absolutize(base_url, href);
            first_query_value(&joined).unwrap_or(joined)
        });
    if prompted.is_some() {
        return prompted.map(|loc| absolutize(base_url, &loc));
    }

    if let Some(src) = doc.select(&EMBED).next().and_then(|e| e.value().attr("src")) {
        return Some(absolutize(base_url, src));
    }
    let object = doc.select(&OBJECT).next()?;
    object
        .value()
        .attr("data")
        .map(|loc| absolutize(base_url, loc))
}

fn first_query_value(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let (_, value) = parsed.query_pairs().next()?;
    Some(value.into_owned())
}

async fn list_articles(
    nav: &mut dyn Navigator,
    team: &TeamIdentity,
    source: &ArticleSource,
    range: &DateRange,
) -> Result<ArticleListing, EngineError> {
    let html = nav.goto(&source.url).await?;
    extract_listing(&html, source.display, &team.base_url, range)
}

/// Reduces an articles page to dated entries according to its display style.
fn extract_listing(
    html: &str,
    display: ArticleDisplay,
    base_url: &str,
    range: &DateRange,
) -> Result<ArticleListing, EngineError> {
    match display {
        ArticleDisplay::Table => Ok(scan_article_page(html, base_url, range)?),
        ArticleDisplay::List => {
            let doc = Html::parse_document(html);
            let list = doc.select(&ARCHIVE_LIST).next().ok_or_else(|| {
                EngineError::missing_element(base_url, "Extract", "no article list on page")
            })?;
            Ok(normalize_list(list, base_url, range))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prompts() -> Vec<String> {
        vec!["Printable PDF".to_string()]
    }

    #[test]
    fn stats_prompt_anchor_yields_query_location() {
        let html = r#"<a href="/viewer.aspx?file=https%3A%2F%2Fcdn.nusports.com%2Fstats%2F2023.pdf&x=1">Printable PDF</a>"#;
        assert_eq!(
            find_stats_pdf(html, &prompts(), "https://nusports.com"),
            Some("https://cdn.nusports.com/stats/2023.pdf".to_string())
        );
    }

    #[test]
    fn stats_relative_query_location_is_joined_to_base() {
        let html = r#"<a href="/viewer.aspx?file=/documents/2023/stats.pdf">Printable PDF</a>"#;
        assert_eq!(
            find_stats_pdf(html, &prompts(), "https://nusports.com"),
            Some("https://nusports.com/documents/2023/stats.pdf".to_string())
        );
    }

    #[test]
    fn stats_falls_back_to_embed_then_object() {
        let embed = r#"<embed src="/docs/stats.pdf"><object data="/docs/other.pdf"></object>"#;
        assert_eq!(
            find_stats_pdf(embed, &prompts(), "https://x.edu"),
            Some("https://x.edu/docs/stats.pdf".to_string())
        );
        let object = r#"<object data="https://x.edu/o.pdf"></object>"#;
        assert_eq!(
            find_stats_pdf(object, &prompts(), "https://x.edu"),
            Some("https://x.edu/o.pdf".to_string())
        );
        assert_eq!(find_stats_pdf("<p>none</p>", &prompts(), "https://x.edu"), None);
    }

    #[test]
    fn list_display_requires_archive_container() {
        let range = DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
        )
        .unwrap();
        let err = extract_listing("<ul></ul>", ArticleDisplay::List, "https://x.edu", &range)
            .unwrap_err();
        assert!(err.is_missing_element());
    }
}

// ABOUTME: In-memory collaborators for exercising flows without a browser, network, or renderer.
// ABOUTME: ScriptedSite maps URLs to HTML and records visits, scripts, prints, and open sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{Conference, IgnoreColumns, Provider, SiteLayout, TeamIdentity};
use crate::error::{EngineError, ErrorCode};
use crate::navigate::{Navigator, NavigatorFactory};
use crate::render::Renderer;
use crate::resource::{FetchResult, Fetcher};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
enum PageScript {
    Html(String),
    Fail(ErrorCode),
}

#[derive(Debug, Default)]
struct SiteState {
    pages: HashMap<String, PageScript>,
    visits: Vec<String>,
    scripts: Vec<String>,
    removed_ids: Vec<String>,
    prints: Vec<String>,
    open: usize,
    opened_total: usize,
    refuse_sessions: bool,
}

/// A scripted website shared by every navigator opened from it.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSite {
    state: Arc<Mutex<SiteState>>,
}

impl ScriptedSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        lock(&self.state)
            .pages
            .insert(url.into(), PageScript::Html(html.into()));
        self
    }

    /// Fail navigation to `url` with `code`.
    pub fn with_failure(self, url: impl Into<String>, code: ErrorCode) -> Self {
        lock(&self.state)
            .pages
            .insert(url.into(), PageScript::Fail(code));
        self
    }

    /// Make the factory refuse to open sessions.
    pub fn refusing_sessions(self) -> Self {
        lock(&self.state).refuse_sessions = true;
        self
    }

    /// Every URL navigated to, across all sessions, in order.
    pub fn visits(&self) -> Vec<String> {
        lock(&self.state).visits.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        lock(&self.state).scripts.clone()
    }

    pub fn removed_ids(&self) -> Vec<String> {
        lock(&self.state).removed_ids.clone()
    }

    /// URLs that were printed.
    pub fn prints(&self) -> Vec<String> {
        lock(&self.state).prints.clone()
    }

    /// Sessions opened and not yet closed.
    pub fn open_sessions(&self) -> usize {
        lock(&self.state).open
    }

    pub fn sessions_opened(&self) -> usize {
        lock(&self.state).opened_total
    }
}

/// Factory handing out navigators bound to one [`ScriptedSite`].
#[derive(Debug, Clone)]
pub struct ScriptedNavigators {
    site: ScriptedSite,
}

impl ScriptedNavigators {
    pub fn new(site: ScriptedSite) -> Self {
        Self { site }
    }
}

#[async_trait]
impl NavigatorFactory for ScriptedNavigators {
    async fn open(&self) -> Result<Box<dyn Navigator>, EngineError> {
        let mut state = lock(&self.site.state);
        if state.refuse_sessions {
            return Err(EngineError::navigation(
                "",
                "Open",
                Some(anyhow::anyhow!("automation backend unavailable")),
            ));
        }
        state.open += 1;
        state.opened_total += 1;
        Ok(Box::new(ScriptedNavigator {
            site: self.site.clone(),
            current: None,
        }))
    }
}

pub struct ScriptedNavigator {
    site: ScriptedSite,
    current: Option<String>,
}

impl ScriptedNavigator {
    pub fn new(site: ScriptedSite) -> Self {
        Self {
            site,
            current: None,
        }
    }
}

#[async_trait]
impl Navigator for ScriptedNavigator {
    async fn goto(&mut self, url: &str) -> Result<String, EngineError> {
        let page = {
            let mut state = lock(&self.site.state);
            state.visits.push(url.to_string());
            state.pages.get(url).cloned()
        };
        match page {
            Some(PageScript::Html(html)) => {
                self.current = Some(url.to_string());
                Ok(html)
            }
            Some(PageScript::Fail(code)) => Err(EngineError::new(
                code,
                url,
                "Navigate",
                Some(anyhow::anyhow!("scripted failure")),
            )),
            None => Err(EngineError::navigation(
                url,
                "Navigate",
                Some(anyhow::anyhow!("no scripted page")),
            )),
        }
    }

    async fn run_script(&mut self, script: &str) -> Result<(), EngineError> {
        lock(&self.site.state).scripts.push(script.to_string());
        Ok(())
    }

    async fn remove_elements_by_id(&mut self, ids: &[&str]) -> Result<(), EngineError> {
        lock(&self.site.state)
            .removed_ids
            .extend(ids.iter().map(|s| s.to_string()));
        Ok(())
    }

    async fn print_page(&mut self) -> Result<Bytes, EngineError> {
        let url = self.current.clone().ok_or_else(|| {
            EngineError::navigation("", "Print", Some(anyhow::anyhow!("no page loaded")))
        })?;
        lock(&self.site.state).prints.push(url.clone());
        Ok(Bytes::from(format!("%PDF-1.4 printed {}", url)))
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_deref()
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        let mut state = lock(&self.site.state);
        state.open = state.open.saturating_sub(1);
        self.current = None;
        Ok(())
    }
}

/// Renderer that records each document and returns a tiny PDF stand-in.
#[derive(Debug, Default)]
pub struct StubRenderer {
    documents: Mutex<Vec<String>>,
}

impl StubRenderer {
    pub fn documents(&self) -> Vec<String> {
        lock(&self.documents).clone()
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn render(&self, html: &str) -> Result<Bytes, EngineError> {
        lock(&self.documents).push(html.to_string());
        Ok(Bytes::from_static(b"%PDF-1.4 rendered"))
    }
}

/// Fetcher serving fixed bodies; every other URL is a 404.
#[derive(Debug, Default)]
pub struct StubFetcher {
    bodies: HashMap<String, Bytes>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn get(&self, url: &str) -> Result<FetchResult, EngineError> {
        lock(&self.requests).push(url.to_string());
        match self.bodies.get(url) {
            Some(body) => Ok(FetchResult {
                status: 200,
                url: url.to_string(),
                final_url: url.to_string(),
                content_type: Some("application/pdf".to_string()),
                body: body.clone(),
            }),
            None => Err(EngineError::resource_absent(url, "Fetch")),
        }
    }
}

/// A team on `https://nusports.com` whose conference site depends on `provider`.
pub fn sample_team(name: &str, abbreviation: &str, provider: Provider) -> TeamIdentity {
    let conference = match provider {
        Provider::Boost => "https://bigten.org",
        Provider::Sidearm => "https://horizonleague.org",
    };
    TeamIdentity {
        name: name.to_string(),
        abbreviation: abbreviation.to_string(),
        base_url: "https://nusports.com".to_string(),
        site_layout: SiteLayout::PrintPath,
        sport_path: "msoc".to_string(),
        sport_label: "Mens Soccer".to_string(),
        conference: Conference {
            base_url: conference.to_string(),
            provider,
        },
        articles: None,
        stats_url: None,
        ignore: IgnoreColumns::default(),
    }
}

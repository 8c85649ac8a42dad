// ABOUTME: Runtime options for the extraction engine and the EngineBuilder that assembles an Engine.
// ABOUTME: EngineBuilder provides a fluent API for wiring timeouts, prompts, and collaborators.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::navigate::http::HttpNavigatorFactory;
use crate::navigate::NavigatorFactory;
use crate::render::{Renderer, WkhtmltopdfRenderer};
use crate::resource::{Fetcher, ReqwestFetcher};
use crate::sink::{ArtifactSink, DirectorySink};

/// Default anchor labels that lead to a stats PDF.
pub const DEFAULT_STATS_PROMPTS: &[&str] = &["Print", "Printable PDF", "PDF", "Download PDF"];

/// Navigation and extraction options shared by every artifact flow.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub page_load_timeout: Duration,
    pub script_timeout: Duration,
    /// Fixed wait after each navigation in lieu of a content-ready signal.
    pub settle: Duration,
    pub user_agent: String,
    pub stats_prompts: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            page_load_timeout: Duration::from_secs(30),
            script_timeout: Duration::from_secs(30),
            settle: Duration::from_millis(1000),
            user_agent: "Mozilla/5.0 (compatible; gameday/0.1)".to_string(),
            stats_prompts: DEFAULT_STATS_PROMPTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EngineOptions {
    /// Options derived from a loaded settings document.
    pub fn from_settings(settings: &Settings) -> Self {
        let nav = &settings.navigation;
        let mut opts = Self {
            page_load_timeout: Duration::from_secs(nav.page_load_timeout_secs),
            script_timeout: Duration::from_secs(nav.script_timeout_secs),
            settle: Duration::from_millis(nav.settle_millis),
            ..Self::default()
        };
        if let Some(ua) = &nav.user_agent {
            opts.user_agent = ua.clone();
        }
        if !settings.stats.prompts.is_empty() {
            opts.stats_prompts = settings.stats.prompts.clone();
        }
        opts
    }
}

/// Builder for constructing Engine instances with custom configuration.
///
/// Collaborators left unset get the HTTP-backed defaults: a reqwest fetcher,
/// a browserless navigator, the wkhtmltopdf renderer and a directory sink
/// writing to `./output`.
#[derive(Default)]
pub struct EngineBuilder {
    opts: EngineOptions,
    wkhtmltopdf: Option<String>,
    output_dir: Option<String>,
    fetcher: Option<Arc<dyn Fetcher>>,
    renderer: Option<Arc<dyn Renderer>>,
    navigators: Option<Arc<dyn NavigatorFactory>>,
    sink: Option<Arc<dyn ArtifactSink>>,
}

impl EngineBuilder {
    /// Create a new EngineBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the options and paths carried by a settings document.
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.opts = EngineOptions::from_settings(settings);
        self.wkhtmltopdf = settings.paths.wkhtmltopdf.clone();
        self.output_dir = Some(settings.paths.output.clone());
        self
    }

    pub fn options(mut self, opts: EngineOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Set the page-load timeout applied to every navigation.
    pub fn page_load_timeout(mut self, timeout: Duration) -> Self {
        self.opts.page_load_timeout = timeout;
        self
    }

    /// Set the bound on script execution and page printing.
    pub fn script_timeout(mut self, timeout: Duration) -> Self {
        self.opts.script_timeout = timeout;
        self
    }

    /// Set the settle interval waited after each navigation.
    pub fn settle(mut self, settle: Duration) -> Self {
        self.opts.settle = settle;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Replace the anchor labels used to locate stats PDFs.
    pub fn stats_prompts<I, S>(mut self, prompts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opts.stats_prompts = prompts.into_iter().map(Into::into).collect();
        self
    }

    /// Directory the default sink writes into.
    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Path to the wkhtmltopdf binary used by the default renderer.
    pub fn wkhtmltopdf(mut self, path: impl Into<String>) -> Self {
        self.wkhtmltopdf = Some(path.into());
        self
    }

    /// Use a custom HTTP fetch capability.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use a custom document renderer.
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Use a custom navigation backend.
    pub fn navigators(mut self, factory: Arc<dyn NavigatorFactory>) -> Self {
        self.navigators = Some(factory);
        self
    }

    /// Use a custom artifact sink.
    pub fn sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the Engine with the configured options.
    pub fn build(self) -> Result<Engine, EngineError> {
        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(f) => f,
            None => Arc::new(ReqwestFetcher::new(&self.opts)?),
        };
        let renderer: Arc<dyn Renderer> = match self.renderer {
            Some(r) => r,
            None => Arc::new(WkhtmltopdfRenderer::new(
                self.wkhtmltopdf.unwrap_or_else(|| "wkhtmltopdf".to_string()),
            )),
        };
        let navigators: Arc<dyn NavigatorFactory> = match self.navigators {
            Some(n) => n,
            None => Arc::new(HttpNavigatorFactory::new(
                fetcher.clone(),
                renderer.clone(),
                self.opts.clone(),
            )),
        };
        let sink: Arc<dyn ArtifactSink> = match self.sink {
            Some(s) => s,
            None => Arc::new(DirectorySink::new(
                self.output_dir.unwrap_or_else(|| "output".to_string()),
            )),
        };

        Ok(Engine::new(self.opts, navigators, fetcher, renderer, sink))
    }
}

// ABOUTME: Browserless navigator that loads pages over HTTP and keeps the decoded HTML as a snapshot.
// ABOUTME: Element removal edits the snapshot DOM; printing renders the snapshot through the Renderer.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use ego_tree::NodeId;
use scraper::Html;
use tracing::debug;

use crate::error::EngineError;
use crate::formats::with_base_href;
use crate::navigate::{Navigator, NavigatorFactory};
use crate::options::EngineOptions;
use crate::render::Renderer;
use crate::resource::Fetcher;

/// Opens [`HttpNavigator`]s that share one fetcher and renderer.
pub struct HttpNavigatorFactory {
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
    opts: EngineOptions,
}

impl HttpNavigatorFactory {
    pub fn new(fetcher: Arc<dyn Fetcher>, renderer: Arc<dyn Renderer>, opts: EngineOptions) -> Self {
        Self {
            fetcher,
            renderer,
            opts,
        }
    }
}

#[async_trait]
impl NavigatorFactory for HttpNavigatorFactory {
    async fn open(&self) -> Result<Box<dyn Navigator>, EngineError> {
        Ok(Box::new(HttpNavigator::new(
            self.fetcher.clone(),
            self.renderer.clone(),
            self.opts.clone(),
        )))
    }
}

struct Snapshot {
    url: String,
    html: String,
}

pub struct HttpNavigator {
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
    opts: EngineOptions,
    current: Option<Snapshot>,
    closed: bool,
}

impl HttpNavigator {
    pub fn new(fetcher: Arc<dyn Fetcher>, renderer: Arc<dyn Renderer>, opts: EngineOptions) -> Self {
        Self {
            fetcher,
            renderer,
            opts,
            current: None,
            closed: false,
        }
    }

    fn ensure_open(&self, url: &str) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::navigation(
                url,
                "Navigate",
                Some(anyhow::anyhow!("navigator is closed")),
            ));
        }
        Ok(())
    }

    fn snapshot(&self, op: &str) -> Result<&Snapshot, EngineError> {
        self.current.as_ref().ok_or_else(|| {
            EngineError::navigation("", op, Some(anyhow::anyhow!("no page loaded")))
        })
    }
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn goto(&mut self, url: &str) -> Result<String, EngineError> {
        self.ensure_open(url)?;
        debug!(url, "navigating");

        let fetched = tokio::time::timeout(self.opts.page_load_timeout, self.fetcher.get(url))
            .await
            .map_err(|_| {
                EngineError::timeout(
                    url,
                    "Navigate",
                    Some(anyhow::anyhow!(
                        "page load exceeded {}s",
                        self.opts.page_load_timeout.as_secs_f32()
                    )),
                )
            })??;

        if !self.opts.settle.is_zero() {
            tokio::time::sleep(self.opts.settle).await;
        }

        let html = fetched.text();
        self.current = Some(Snapshot {
            url: fetched.final_url,
            html: html.clone(),
        });
        Ok(html)
    }

    async fn run_script(&mut self, _script: &str) -> Result<(), EngineError> {
        let url = self.current_url().unwrap_or_default().to_string();
        Err(EngineError::navigation(
            url,
            "Script",
            Some(anyhow::anyhow!(
                "script execution requires a browser-backed navigator"
            )),
        ))
    }

    async fn remove_elements_by_id(&mut self, ids: &[&str]) -> Result<(), EngineError> {
        let snapshot = self.snapshot("Script")?;
        let html = strip_ids(&snapshot.html, ids);
        if let Some(current) = self.current.as_mut() {
            current.html = html;
        }
        Ok(())
    }

    async fn print_page(&mut self) -> Result<Bytes, EngineError> {
        let snapshot = self.snapshot("Print")?;
        let url = snapshot.url.clone();
        let document = with_base_href(&snapshot.html, &url);
        debug!(url = %url, "printing page");

        tokio::time::timeout(self.opts.script_timeout, self.renderer.render(&document))
            .await
            .map_err(|_| {
                EngineError::timeout(
                    url.as_str(),
                    "Print",
                    Some(anyhow::anyhow!(
                        "printing exceeded {}s",
                        self.opts.script_timeout.as_secs_f32()
                    )),
                )
            })?
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.url.as_str())
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        self.closed = true;
        self.current = None;
        Ok(())
    }
}

/// Detaches every element whose id is listed and reserializes the document.
fn strip_ids(html: &str, ids: &[&str]) -> String {
    let mut doc = Html::parse_document(html);
    let targets: Vec<NodeId> = doc
        .tree
        .nodes()
        .filter(|node| {
            node.value()
                .as_element()
                .and_then(|el| el.id())
                .is_some_and(|id| ids.contains(&id))
        })
        .map(|node| node.id())
        .collect();

    for id in targets {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
    doc.html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubRenderer;
    use crate::resource::ReqwestFetcher;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn opts() -> EngineOptions {
        EngineOptions {
            settle: Duration::ZERO,
            page_load_timeout: Duration::from_secs(5),
            ..EngineOptions::default()
        }
    }

    fn navigator(renderer: Arc<StubRenderer>) -> HttpNavigator {
        let opts = opts();
        let fetcher = Arc::new(ReqwestFetcher::new(&opts).unwrap());
        HttpNavigator::new(fetcher, renderer, opts)
    }

    #[test]
    fn strip_ids_removes_overlays_only() {
        let html = r#"<html><body><div id="divSatisfiChat">chat</div><p id="story">Text</p></body></html>"#;
        let out = strip_ids(html, &["divSatisfiChat", "transcend-consent-manager"]);
        assert!(!out.contains("chat"));
        assert!(out.contains("<p id=\"story\">Text</p>"));
    }

    #[tokio::test]
    async fn goto_returns_snapshot_and_tracks_url() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/schedule");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html><body><table></table></body></html>");
        });

        let mut nav = navigator(Arc::new(StubRenderer::default()));
        let html = nav.goto(&server.url("/schedule")).await.unwrap();
        assert!(html.contains("<table>"));
        assert_eq!(nav.current_url(), Some(server.url("/schedule").as_str()));
    }

    #[tokio::test]
    async fn missing_page_is_resource_absent() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(404);
        });

        let mut nav = navigator(Arc::new(StubRenderer::default()));
        let err = nav.goto(&server.url("/gone")).await.unwrap_err();
        assert!(err.is_resource_absent());
    }

    #[tokio::test]
    async fn print_renders_cleaned_snapshot_with_base() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/news/1");
            then.status(200).body(
                "<html><head></head><body><div id=\"termly-code-snippet-support\">x</div><h1>Recap</h1></body></html>",
            );
        });

        let renderer = Arc::new(StubRenderer::default());
        let mut nav = navigator(renderer.clone());
        nav.goto(&server.url("/news/1")).await.unwrap();
        nav.remove_elements_by_id(&["termly-code-snippet-support"])
            .await
            .unwrap();
        let pdf = nav.print_page().await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let rendered = renderer.documents();
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("<base href="));
        assert!(rendered[0].contains("Recap"));
        assert!(!rendered[0].contains("termly"));
    }

    #[tokio::test]
    async fn scripts_are_unsupported_and_closed_navigator_refuses() {
        let mut nav = navigator(Arc::new(StubRenderer::default()));
        assert!(nav.run_script("1 + 1").await.unwrap_err().is_navigation());
        nav.close().await.unwrap();
        assert!(nav.goto("https://nusports.com").await.unwrap_err().is_navigation());
    }
}

// ABOUTME: Navigation capability used by every artifact flow, plus the scoped Session guard.
// ABOUTME: A Session owns one navigator and releases it on every exit path, including drop.

//! Navigation sessions.
//!
//! A [`Navigator`] is one isolated browsing context. Artifact flows never
//! share one: each acquires its own [`Session`] from a [`NavigatorFactory`],
//! runs its hops sequentially, and closes it. If a flow returns early or is
//! cancelled, dropping the session schedules the close on the runtime.

pub mod http;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::EngineError;

#[async_trait]
pub trait Navigator: Send {
    /// Load `url` and return the rendered HTML once the page has settled.
    async fn goto(&mut self, url: &str) -> Result<String, EngineError>;

    /// Execute a script against the current page.
    async fn run_script(&mut self, script: &str) -> Result<(), EngineError>;

    /// Remove elements by id from the current page. Missing ids are ignored.
    async fn remove_elements_by_id(&mut self, ids: &[&str]) -> Result<(), EngineError> {
        self.run_script(&removal_script(ids)).await
    }

    /// Print the current page as a PDF document.
    async fn print_page(&mut self) -> Result<Bytes, EngineError>;

    fn current_url(&self) -> Option<&str>;

    /// Release the underlying browsing context.
    async fn close(&mut self) -> Result<(), EngineError>;
}

/// Creates isolated navigators.
#[async_trait]
pub trait NavigatorFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Navigator>, EngineError>;
}

/// Script removing each listed element id from the document.
pub fn removal_script(ids: &[&str]) -> String {
    let list = serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string());
    format!(
        "for (const id of {}) {{ const el = document.getElementById(id); if (el) el.remove(); }}",
        list
    )
}

/// Exclusive, scoped ownership of one navigator.
pub struct Session {
    label: String,
    nav: Option<Box<dyn Navigator>>,
}

impl Session {
    /// Acquire a fresh navigator for the flow named `label`.
    pub async fn open(
        factory: &dyn NavigatorFactory,
        label: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let label = label.into();
        let nav = factory.open().await?;
        debug!(session = %label, "navigation session opened");
        Ok(Self {
            label,
            nav: Some(nav),
        })
    }

    pub fn navigator(&mut self) -> Result<&mut (dyn Navigator + 'static), EngineError> {
        let label = &self.label;
        self.nav.as_deref_mut().ok_or_else(|| {
            EngineError::navigation(label.clone(), "Session", Some(anyhow::anyhow!("session closed")))
        })
    }

    /// Close the navigator now and surface any error.
    pub async fn close(mut self) -> Result<(), EngineError> {
        match self.nav.take() {
            Some(mut nav) => {
                debug!(session = %self.label, "navigation session closed");
                nav.close().await
            }
            None => Ok(()),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let Some(mut nav) = self.nav.take() else {
            return;
        };
        let label = std::mem::take(&mut self.label);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = nav.close().await {
                        warn!(session = %label, error = %e, "failed to close navigation session");
                    } else {
                        debug!(session = %label, "navigation session closed on drop");
                    }
                });
            }
            Err(_) => warn!(session = %label, "navigation session dropped outside a runtime"),
        }
    }
}

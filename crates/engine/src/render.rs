// ABOUTME: Document rendering backend that turns assembled HTML into PDF bytes.
// ABOUTME: The default implementation pipes HTML through the wkhtmltopdf binary.

use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::EngineError;

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render a complete HTML document to PDF bytes.
    async fn render(&self, html: &str) -> Result<Bytes, EngineError>;
}

/// Runs `wkhtmltopdf - -`, feeding HTML on stdin and reading the PDF from stdout.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    binary: String,
}

impl WkhtmltopdfRenderer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl Renderer for WkhtmltopdfRenderer {
    async fn render(&self, html: &str) -> Result<Bytes, EngineError> {
        debug!(binary = %self.binary, bytes = html.len(), "rendering document");
        let mut child = tokio::process::Command::new(&self.binary)
            .args(["--quiet", "--encoding", "utf-8", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::render(&self.binary, "Render", Some(e.into())))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(html.as_bytes())
                .await
                .map_err(|e| EngineError::render(&self.binary, "Render", Some(e.into())))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| EngineError::render(&self.binary, "Render", Some(e.into())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::render(
                &self.binary,
                "Render",
                Some(anyhow::anyhow!(
                    "exited with {}: {}",
                    output.status,
                    stderr.trim()
                )),
            ));
        }
        if output.stdout.is_empty() {
            return Err(EngineError::render(
                &self.binary,
                "Render",
                Some(anyhow::anyhow!("produced no output")),
            ));
        }
        Ok(Bytes::from(output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_render_error() {
        let renderer = WkhtmltopdfRenderer::new("/nonexistent/wkhtmltopdf-gameday");
        let err = renderer.render("<html></html>").await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Render);
        assert!(!err.is_fatal());
    }
}

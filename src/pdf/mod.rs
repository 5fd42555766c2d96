//! PDF rendering.
//!
//! HTML is printed by a headless browser when one is available. Any failure
//! of that path produces a plain single-page PDF instead, so callers always
//! get a document back.

pub mod chrome;
pub mod fallback;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub use fallback::{html_title, html_to_text, minimal_pdf};

pub const DEFAULT_BROWSER_BIN: &str = "chromium";
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the headless browser path.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write HTML source: {0}")]
    WriteHtml(#[source] std::io::Error),
    #[error("headless browser could not be started: {0}")]
    BrowserUnavailable(#[source] std::io::Error),
    #[error("headless browser exited with status {0}")]
    BrowserExit(i32),
    #[error("headless browser timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("headless browser produced no valid PDF")]
    InvalidOutput,
}

#[derive(Debug, Clone)]
pub struct PdfSettings {
    pub browser_bin: PathBuf,
    pub timeout: Duration,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            browser_bin: PathBuf::from(DEFAULT_BROWSER_BIN),
            timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }
}

/// Stateless HTML-to-PDF renderer. A fresh browser process is used per call.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    settings: PdfSettings,
}

impl PdfRenderer {
    pub fn new(settings: PdfSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PdfSettings {
        &self.settings
    }

    /// Print `html` through the headless browser only.
    pub async fn try_external(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        chrome::print_to_pdf(&self.settings, html).await
    }

    /// Render `html` to PDF bytes. Falls back to [`minimal_pdf`] on any
    /// browser failure; `log_label` names the document in the logs.
    pub async fn render(&self, html: &str, log_label: &str) -> Vec<u8> {
        match self.try_external(html).await {
            Ok(pdf) => {
                log::debug!("{}: rendered {} bytes with headless browser", log_label, pdf.len());
                pdf
            }
            Err(err) => {
                log::warn!("{}: {}; using plain fallback PDF", log_label, err);
                crate::metrics::PDF_FALLBACKS_TOTAL.inc();
                let title = html_title(html).unwrap_or_else(|| log_label.to_string());
                minimal_pdf(&title, &html_to_text(html))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_browser() -> PdfRenderer {
        PdfRenderer::new(PdfSettings {
            browser_bin: PathBuf::from("/nonexistent/paybench-browser"),
            timeout: Duration::from_secs(5),
        })
    }

    #[tokio::test]
    async fn test_missing_browser_is_an_error() {
        let result = missing_browser().try_external("<p>hi</p>").await;
        assert!(matches!(result, Err(RenderError::BrowserUnavailable(_))));
    }

    #[tokio::test]
    async fn test_render_falls_back_to_minimal_pdf() {
        let html = "<html><head><title>Offer Kit</title></head><body><p>Ask for more.</p></body></html>";
        let pdf = missing_browser().render(html, "offer kit").await;

        assert!(pdf.starts_with(b"%PDF-1.4"));
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("(Offer Kit)"));
        assert!(text.contains("Ask for more."));
    }
}

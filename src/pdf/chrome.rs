//! Headless browser PDF printing.
//!
//! Writes the HTML into a temporary directory, points the browser at it and
//! reads back the printed PDF. The browser process is spawned and reaped
//! inside a single call.

use std::path::Path;
use std::process::Stdio;
use tempfile::tempdir;
use tokio::process::Command;

use super::{PdfSettings, RenderError};

const SOURCE_FILE: &str = "document.html";
const OUTPUT_FILE: &str = "document.pdf";

/// Budget the browser gets to settle network requests before printing.
const VIRTUAL_TIME_BUDGET_MS: u32 = 10_000;

/// Print `html` to PDF bytes with the configured browser.
pub async fn print_to_pdf(settings: &PdfSettings, html: &str) -> Result<Vec<u8>, RenderError> {
    let temp_dir = tempdir().map_err(RenderError::TempDir)?;
    let html_path = temp_dir.path().join(SOURCE_FILE);
    let pdf_path = temp_dir.path().join(OUTPUT_FILE);

    tokio::fs::write(&html_path, html)
        .await
        .map_err(RenderError::WriteHtml)?;

    run_browser(settings, &html_path, &pdf_path).await?;

    let pdf = tokio::fs::read(&pdf_path)
        .await
        .map_err(RenderError::ReadPdf)?;

    if !pdf.starts_with(b"%PDF") {
        return Err(RenderError::InvalidOutput);
    }
    Ok(pdf)
}

async fn run_browser(
    settings: &PdfSettings,
    html_path: &Path,
    pdf_path: &Path,
) -> Result<(), RenderError> {
    let mut command = Command::new(&settings.browser_bin);
    command
        .arg("--headless")
        .arg("--disable-gpu")
        .arg("--no-pdf-header-footer")
        .arg("--run-all-compositor-stages-before-draw")
        .arg(format!("--virtual-time-budget={VIRTUAL_TIME_BUDGET_MS}"))
        .arg(format!("--print-to-pdf={}", pdf_path.display()))
        .arg(format!("file://{}", html_path.display()))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(RenderError::BrowserUnavailable)?;

    let waited = tokio::time::timeout(settings.timeout, child.wait()).await;
    let status = match waited {
        Ok(status) => status.map_err(RenderError::BrowserUnavailable)?,
        Err(_) => {
            if let Err(err) = child.kill().await {
                log::debug!("failed to kill timed out browser: {}", err);
            }
            return Err(RenderError::Timeout(settings.timeout));
        }
    };

    if !status.success() {
        return Err(RenderError::BrowserExit(status.code().unwrap_or(-1)));
    }
    Ok(())
}

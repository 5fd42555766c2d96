//! Common helpers for document rendering.
//!
//! HTML escaping, money and CSV formatting, the shared page shell, and the
//! artifact set that writes files and the ZIP bundle for a purchase.

use crate::archive::{create_zip_buffer, ZipEntry};
use crate::pipeline::PipelineError;
use crate::purchase::models::{FileKind, GeneratedFile};
use crate::storage::PurchaseStore;

pub const BUNDLE_FILE: &str = "bundle.zip";
const BUNDLE_LABEL: &str = "All files (ZIP)";

/// Escape text for HTML element content and attribute values.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Format whole dollars with thousands separators, e.g. `$152,000`.
pub fn format_usd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Wrap `body` in the printable page shell. `title` is escaped here.
pub fn html_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  @page {{ size: A4; margin: 18mm 16mm; }}
  * {{ -webkit-print-color-adjust: exact; print-color-adjust: exact; }}
  body {{ font-family: "Helvetica Neue", Arial, sans-serif; color: #1f2933; font-size: 11pt; line-height: 1.45; }}
  h1 {{ font-size: 22pt; margin: 0 0 4pt; color: #0b3d62; }}
  h2 {{ font-size: 14pt; margin: 18pt 0 6pt; color: #0b3d62; border-bottom: 1px solid #d9e2ec; padding-bottom: 3pt; }}
  .subtitle {{ color: #52606d; margin-bottom: 14pt; }}
  .callout {{ background: #f0f4f8; border-left: 4px solid #2680c2; padding: 8pt 12pt; margin: 10pt 0; }}
  .note {{ color: #8d2b0b; font-size: 9.5pt; }}
  table {{ width: 100%; border-collapse: collapse; margin: 6pt 0; }}
  th, td {{ text-align: left; padding: 5pt 6pt; border-bottom: 1px solid #e4e7eb; }}
  th {{ background: #0b3d62; color: #ffffff; }}
  .footer {{ margin-top: 24pt; color: #9aa5b1; font-size: 8.5pt; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

/// Disclosure paragraph for estimated stats, empty otherwise.
pub fn estimate_note_html(note: Option<&str>) -> String {
    match note {
        Some(note) => format!(r#"<p class="note">Estimated: {}</p>"#, escape_html(note)),
        None => String::new(),
    }
}

struct PendingFile {
    label: String,
    file_name: &'static str,
    kind: FileKind,
    content: Vec<u8>,
}

/// Rendered artifacts of one purchase, waiting to be written and bundled.
#[derive(Default)]
pub struct Artifacts {
    pending: Vec<PendingFile>,
}

impl Artifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        label: impl Into<String>,
        file_name: &'static str,
        kind: FileKind,
        content: impl Into<Vec<u8>>,
    ) {
        self.pending.push(PendingFile {
            label: label.into(),
            file_name,
            kind,
            content: content.into(),
        });
    }

    /// Write every artifact through the store, in push order.
    pub async fn write_all(
        &self,
        store: &dyn PurchaseStore,
        purchase_id: &str,
    ) -> Result<Vec<GeneratedFile>, PipelineError> {
        let mut files = Vec::with_capacity(self.pending.len() + 1);
        for file in &self.pending {
            let path = store
                .write_purchase_file(purchase_id, file.file_name, &file.content)
                .await?;
            files.push(GeneratedFile {
                label: file.label.clone(),
                path,
                kind: file.kind,
            });
        }
        Ok(files)
    }

    /// Pack every artifact into `bundle.zip` and write it. The bundle never
    /// contains itself.
    pub async fn write_bundle(
        self,
        store: &dyn PurchaseStore,
        purchase_id: &str,
    ) -> Result<GeneratedFile, PipelineError> {
        let entries: Vec<ZipEntry> = self
            .pending
            .into_iter()
            .filter(|file| file.kind != FileKind::Zip)
            .map(|file| ZipEntry::new(file.file_name, file.content))
            .collect();

        let zip = create_zip_buffer(&entries)?;
        let path = store
            .write_purchase_file(purchase_id, BUNDLE_FILE, &zip)
            .await?;

        Ok(GeneratedFile {
            label: BUNDLE_LABEL.to_string(),
            path,
            kind: FileKind::Zip,
        })
    }
}

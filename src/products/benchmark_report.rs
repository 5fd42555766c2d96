//! Compensation Benchmark Report: percentile PDF and a one-row CSV.

use super::common::{csv_row, escape_html, estimate_note_html, format_usd, html_page, Artifacts};
use super::{Progress, RenderContext, RenderEnv};
use crate::pipeline::PipelineError;
use crate::purchase::models::{FileKind, GeneratedFile};

pub const REPORT_PDF: &str = "benchmark_report.pdf";
pub const DATA_CSV: &str = "benchmark_data.csv";

const CSV_HEADER: &str = "job,city,sampleSize,p25,p50,p75,p90,estimated";

pub async fn render(
    purchase_id: &str,
    ctx: &RenderContext,
    env: &RenderEnv<'_>,
    progress: &Progress<'_>,
) -> Result<Vec<GeneratedFile>, PipelineError> {
    progress.report(45, "rendering");
    let report = env.pdf.render(&report_html(ctx), "benchmark report").await;

    let mut artifacts = Artifacts::new();
    artifacts.push("Benchmark report (PDF)", REPORT_PDF, FileKind::Pdf, report);
    artifacts.push("Benchmark data (CSV)", DATA_CSV, FileKind::Csv, data_csv(ctx));

    progress.report(72, "writing");
    let mut files = artifacts.write_all(env.store, purchase_id).await?;

    progress.report(84, "bundling");
    files.push(artifacts.write_bundle(env.store, purchase_id).await?);
    Ok(files)
}

/// Header plus exactly one data row, newline terminated.
pub fn data_csv(ctx: &RenderContext) -> String {
    let stats = &ctx.stats;
    let numbers = [
        stats.sample_size as i64,
        stats.p25,
        stats.p50,
        stats.p75,
        stats.p90,
    ]
    .map(|n| n.to_string());

    let mut fields: Vec<&str> = vec![ctx.job_label, ctx.city_label];
    fields.extend(numbers.iter().map(String::as_str));
    fields.push(if stats.estimated { "true" } else { "false" });

    format!("{CSV_HEADER}\n{}\n", csv_row(&fields))
}

fn report_html(ctx: &RenderContext) -> String {
    let stats = &ctx.stats;
    let rows: String = [
        ("25th percentile", format_usd(stats.p25)),
        ("Median", format_usd(stats.p50)),
        ("75th percentile", format_usd(stats.p75)),
        ("90th percentile", format_usd(stats.p90)),
        ("Mean", format_usd(stats.mean)),
        ("Range", format!("{} to {}", format_usd(stats.min), format_usd(stats.max))),
    ]
    .iter()
    .map(|(label, shown)| format!("  <tr><td>{label}</td><td>{shown}</td></tr>\n"))
    .collect();

    let body = format!(
        r#"<h1>Compensation Benchmark Report</h1>
<p class="subtitle">{job} &middot; {city} &middot; {date}</p>
{note}
<div class="callout">Based on <strong>{sample}</strong> compensation data points.</div>
<h2>Base salary percentiles</h2>
<table>
  <tr><th>Measure</th><th>Base salary</th></tr>
{rows}</table>
<h2>Your position</h2>
<p>Underpaid score <strong>{score}/100</strong>: {tier}.</p>
<p class="footer">Purchase {purchase_id}</p>"#,
        job = escape_html(ctx.job_label),
        city = escape_html(ctx.city_label),
        date = ctx.generated_at.format("%B %-d, %Y"),
        note = estimate_note_html(stats.estimate_note.as_deref()),
        sample = stats.sample_size,
        rows = rows,
        score = ctx.underpaid.score,
        tier = ctx.underpaid.tier.label(),
        purchase_id = escape_html(ctx.purchase_id()),
    );
    html_page("Compensation Benchmark Report", &body)
}

//! Salary Negotiation Kit: playbook PDF, checklist PDF, opener scripts.

use super::common::{escape_html, estimate_note_html, format_usd, html_page, Artifacts};
use super::{Progress, RenderContext, RenderEnv};
use crate::pipeline::PipelineError;
use crate::purchase::models::{FileKind, GeneratedFile};

pub const KIT_PDF: &str = "negotiation_kit.pdf";
pub const CHECKLIST_PDF: &str = "negotiation_checklist.pdf";
pub const TEMPLATES_TXT: &str = "negotiation_templates.txt";

pub async fn render(
    purchase_id: &str,
    ctx: &RenderContext,
    env: &RenderEnv<'_>,
    progress: &Progress<'_>,
) -> Result<Vec<GeneratedFile>, PipelineError> {
    progress.report(45, "rendering");
    let kit = env.pdf.render(&kit_html(ctx), "negotiation kit").await;
    let checklist = env.pdf.render(&checklist_html(ctx), "negotiation checklist").await;

    let mut artifacts = Artifacts::new();
    artifacts.push("Negotiation playbook (PDF)", KIT_PDF, FileKind::Pdf, kit);
    artifacts.push("Negotiation checklist (PDF)", CHECKLIST_PDF, FileKind::Pdf, checklist);
    artifacts.push(
        "Email and call scripts (TXT)",
        TEMPLATES_TXT,
        FileKind::Txt,
        templates_text(ctx),
    );

    progress.report(72, "writing");
    let mut files = artifacts.write_all(env.store, purchase_id).await?;

    progress.report(84, "bundling");
    files.push(artifacts.write_bundle(env.store, purchase_id).await?);
    Ok(files)
}

/// Three openers with the ask range as plain `$<integer>` amounts.
pub fn templates_text(ctx: &RenderContext) -> String {
    let low = ctx.ask.ask_low;
    let high = ctx.ask.ask_high;
    let role = ctx.target_role();
    let city = ctx.city_label;
    let timeline = ctx.input.options.timeline_or_default();

    let purchase_id = ctx.purchase_id();
    let anchor = ctx.ask.anchor;
    let walk_away = ctx.ask.walk_away;

    format!(
        r#"SALARY NEGOTIATION SCRIPTS
Role: {role} | Location: {city} | Purchase: {purchase_id}
Ask range: ${low} - ${high}

== 1. Friendly opener ==
Thank you again for the offer. I'm excited about the {role} role. Based on market data for {city}, I was hoping we could get the base closer to ${low} - ${high}. Is there flexibility there?

== 2. Firm opener ==
I've reviewed comparable {role} packages in {city}, and they cluster between ${low} and ${high}. Given my experience, I'd need a base of at least ${low} to move forward, and I believe ${high} reflects the scope of this position.

== 3. Direct opener ==
I'm ready to sign within {timeline} at a base of ${high}. If ${high} isn't possible, ${low} with a sign-on bonus would also work for me.

Opening anchor: ${anchor}
Walk-away floor: ${walk_away}
"#
    )
}

fn kit_html(ctx: &RenderContext) -> String {
    let stats = &ctx.stats;
    let ask = &ctx.ask;
    let body = format!(
        r#"<h1>Salary Negotiation Kit</h1>
<p class="subtitle">{role} &middot; {city} &middot; prepared {date}</p>
{note}
<div class="callout">
  <strong>Your ask range:</strong> {low} to {high}<br>
  <strong>Opening anchor:</strong> {anchor}<br>
  <strong>Walk-away floor:</strong> {walk_away}
</div>
<h2>Market snapshot</h2>
<table>
  <tr><th>Sample</th><th>P25</th><th>Median</th><th>P75</th><th>P90</th></tr>
  <tr><td>{sample}</td><td>{p25}</td><td>{p50}</td><td>{p75}</td><td>{p90}</td></tr>
</table>
<h2>Where you stand</h2>
<p>Underpaid score: <strong>{score}/100</strong> ({tier}).</p>
<h2>Strategy</h2>
<p>Open at the anchor, settle inside the ask range, and decline anything below the walk-away floor.
Aim to close within {timeline}.</p>
<p class="footer">Purchase {purchase_id}</p>"#,
        role = escape_html(ctx.target_role()),
        city = escape_html(ctx.city_label),
        date = ctx.generated_at.format("%B %-d, %Y"),
        note = estimate_note_html(stats.estimate_note.as_deref()),
        low = format_usd(ask.ask_low),
        high = format_usd(ask.ask_high),
        anchor = format_usd(ask.anchor),
        walk_away = format_usd(ask.walk_away),
        sample = stats.sample_size,
        p25 = format_usd(stats.p25),
        p50 = format_usd(stats.p50),
        p75 = format_usd(stats.p75),
        p90 = format_usd(stats.p90),
        score = ctx.underpaid.score,
        tier = ctx.underpaid.tier.label(),
        timeline = escape_html(ctx.input.options.timeline_or_default()),
        purchase_id = escape_html(ctx.purchase_id()),
    );
    html_page("Salary Negotiation Kit", &body)
}

fn checklist_html(ctx: &RenderContext) -> String {
    let steps = [
        format!("Confirm the full offer in writing for the {} role.", ctx.target_role()),
        format!("Restate your ask range: {} to {}.", format_usd(ctx.ask.ask_low), format_usd(ctx.ask.ask_high)),
        format!("Lead with the anchor of {}.", format_usd(ctx.ask.anchor)),
        "Ask about sign-on bonus, equity refresh and review timing.".to_string(),
        format!("Hold the line at {}; walk away below it.", format_usd(ctx.ask.walk_away)),
        "Get the final numbers confirmed by email before accepting.".to_string(),
    ];

    let items: String = steps
        .iter()
        .map(|step| format!("  <li>&#9744; {}</li>\n", escape_html(step)))
        .collect();

    let body = format!(
        "<h1>Negotiation Checklist</h1>\n<p class=\"subtitle\">{} &middot; {}</p>\n<ol>\n{}</ol>",
        escape_html(ctx.job_label),
        escape_html(ctx.city_label),
        items
    );
    html_page("Negotiation Checklist", &body)
}

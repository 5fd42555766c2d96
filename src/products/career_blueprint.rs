//! Career Pay Blueprint: roadmap PDF and a twelve-month milestone CSV.

use super::common::{csv_row, escape_html, format_usd, html_page, Artifacts};
use super::{Progress, RenderContext, RenderEnv};
use crate::market::lookups::SkillPremium;
use crate::pipeline::PipelineError;
use crate::purchase::models::{FileKind, GeneratedFile};

pub const BLUEPRINT_PDF: &str = "career_blueprint.pdf";
pub const ROADMAP_CSV: &str = "career_roadmap.csv";

const CSV_HEADER: &str = "month,focus,action,expected_impact";
const ILLUSTRATIVE: &str = "Sample/Illustrative";

/// Static milestones after the two skill-driven months.
const LATER_MILESTONES: [(&str, &str, &str); 3] = [
    (
        "Month 3",
        "Visibility",
        "Present a shipped result to your leadership chain",
    ),
    (
        "Month 6",
        "Scope",
        "Own a cross-team initiative end to end",
    ),
    (
        "Month 12",
        "Compensation review",
        "Negotiate a promotion or a market-rate offer",
    ),
];

pub async fn render(
    purchase_id: &str,
    ctx: &RenderContext,
    env: &RenderEnv<'_>,
    progress: &Progress<'_>,
) -> Result<Vec<GeneratedFile>, PipelineError> {
    progress.report(45, "rendering");
    let blueprint = env.pdf.render(&blueprint_html(ctx), "career blueprint").await;

    let mut artifacts = Artifacts::new();
    artifacts.push("Career blueprint (PDF)", BLUEPRINT_PDF, FileKind::Pdf, blueprint);
    artifacts.push("12-month roadmap (CSV)", ROADMAP_CSV, FileKind::Csv, roadmap_csv(ctx));

    progress.report(72, "writing");
    let mut files = artifacts.write_all(env.store, purchase_id).await?;

    progress.report(84, "bundling");
    files.push(artifacts.write_bundle(env.store, purchase_id).await?);
    Ok(files)
}

fn skill_row(month: &str, premium: Option<&SkillPremium>) -> String {
    match premium {
        Some(premium) => csv_row(&[
            month,
            &premium.skill,
            &format!("Ship one project that showcases {}", premium.skill),
            &format!("+{}% pay premium", premium.premium_pct),
        ]),
        None => csv_row(&[
            month,
            ILLUSTRATIVE,
            "Pick a high-premium skill for your role",
            ILLUSTRATIVE,
        ]),
    }
}

/// Header plus Month 1/2/3/6/12. The first two months use the top two
/// skill premiums.
pub fn roadmap_csv(ctx: &RenderContext) -> String {
    let mut lines = vec![
        CSV_HEADER.to_string(),
        skill_row("Month 1", ctx.skill_premiums.first()),
        skill_row("Month 2", ctx.skill_premiums.get(1)),
    ];
    for (month, focus, action) in LATER_MILESTONES {
        let focus = format!("{focus} ({ILLUSTRATIVE})");
        lines.push(csv_row(&[month, &focus, action, ILLUSTRATIVE]));
    }

    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

fn blueprint_html(ctx: &RenderContext) -> String {
    let roles: String = ctx
        .adjacent_roles
        .iter()
        .map(|role| {
            format!(
                "  <tr><td>{}</td><td>{:+}%</td></tr>\n",
                escape_html(&role.role),
                role.pay_delta_pct
            )
        })
        .collect();

    let skills: String = ctx
        .skill_premiums
        .iter()
        .map(|skill| {
            format!(
                "  <tr><td>{}</td><td>+{}%</td></tr>\n",
                escape_html(&skill.skill),
                skill.premium_pct
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Career Pay Blueprint</h1>
<p class="subtitle">{job} toward {target} &middot; {city}</p>
<div class="callout">Market median today: <strong>{p50}</strong>. Top decile: <strong>{p90}</strong>.</div>
<h2>Adjacent roles</h2>
<table>
  <tr><th>Role</th><th>Typical pay difference</th></tr>
{roles}</table>
<h2>Skill premiums</h2>
<table>
  <tr><th>Skill</th><th>Premium</th></tr>
{skills}</table>
<h2>Twelve-month plan</h2>
<p>Months 1 and 2 build the two highest-premium skills. Later milestones are illustrative and
should be tailored to your team.</p>
<p class="footer">Purchase {purchase_id}</p>"#,
        job = escape_html(ctx.job_label),
        target = escape_html(ctx.target_role()),
        city = escape_html(ctx.city_label),
        p50 = format_usd(ctx.stats.p50),
        p90 = format_usd(ctx.stats.p90),
        roles = roles,
        skills = skills,
        purchase_id = escape_html(ctx.purchase_id()),
    );
    html_page("Career Pay Blueprint", &body)
}

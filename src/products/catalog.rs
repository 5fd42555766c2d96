//! Product catalog.

use serde::Serialize;

pub const NEGOTIATION_KIT: &str = "salary-negotiation-kit";
pub const BENCHMARK_REPORT: &str = "compensation-benchmark-report";
pub const CAREER_BLUEPRINT: &str = "career-pay-blueprint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub slug: &'static str,
    pub name: &'static str,
    pub price_cents: u32,
    pub description: &'static str,
    pub deliverables: &'static [&'static str],
}

pub const CATALOG: &[Product] = &[
    Product {
        slug: NEGOTIATION_KIT,
        name: "Salary Negotiation Kit",
        price_cents: 2900,
        description: "Personal ask range, anchor and walk-away numbers with ready-to-send scripts.",
        deliverables: &[
            "negotiation_kit.pdf",
            "negotiation_checklist.pdf",
            "negotiation_templates.txt",
            "bundle.zip",
        ],
    },
    Product {
        slug: BENCHMARK_REPORT,
        name: "Compensation Benchmark Report",
        price_cents: 1900,
        description: "Percentile snapshot for your role and city, as a PDF and a CSV.",
        deliverables: &["benchmark_report.pdf", "benchmark_data.csv", "bundle.zip"],
    },
    Product {
        slug: CAREER_BLUEPRINT,
        name: "Career Pay Blueprint",
        price_cents: 3900,
        description: "Twelve-month roadmap toward higher-paying adjacent roles and skills.",
        deliverables: &["career_blueprint.pdf", "career_roadmap.csv", "bundle.zip"],
    },
];

pub fn find_product(slug: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|product| product.slug == slug)
}

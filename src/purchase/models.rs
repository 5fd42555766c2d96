use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::market::{AskRange, PurchaseOptions, SalaryStats, UnderpaidAssessment};

/// Placeholder delivery token. Real access control belongs to the web layer
/// in front of this service.
pub const DEMO_DELIVERY_TOKEN: &str = "demo";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Csv,
    Txt,
    Zip,
}

/// Descriptor of one generated artifact. `path` is web-servable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct GeneratedFile {
    pub label: String,
    pub path: String,
    pub kind: FileKind,
}

/// One generation request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInput {
    pub purchase_id: String,
    pub product_slug: String,
    pub job_id: String,
    pub city_id: String,
    #[serde(default)]
    pub options: PurchaseOptions,
}

/// Write-once manifest stored as `meta.json` beside the generated files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseMeta {
    pub input: PurchaseInput,
    pub product_name: String,
    pub job_label: String,
    pub city_label: String,
    pub stats: SalaryStats,
    pub ask_range: AskRange,
    pub underpaid: UnderpaidAssessment,
    pub files: Vec<GeneratedFile>,
    pub created_at: DateTime<Utc>,
}

/// Returned by the pipeline once every file and the manifest are written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDescriptor {
    pub purchase_id: String,
    pub files: Vec<GeneratedFile>,
    pub delivery_url: String,
    pub meta_path: String,
}

pub fn delivery_url(purchase_id: &str) -> String {
    format!("/delivery/{purchase_id}?token={DEMO_DELIVERY_TOKEN}")
}

/// Body of `POST /api/purchases`.
#[derive(Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    /// Optional caller-chosen id; generated when absent.
    #[serde(default)]
    pub purchase_id: Option<String>,
    pub product_slug: String,
    pub job_id: String,
    pub city_id: String,
    #[serde(default)]
    pub options: PurchaseOptions,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseResponse {
    pub purchase_id: String,
    pub status: super::jobs::JobState,
    pub status_url: String,
}

/// Query string of the delivery page.
#[derive(Deserialize, Debug, ToSchema)]
pub struct DeliveryQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// A downloadable file on the delivery page.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub label: String,
    pub url: String,
    pub kind: FileKind,
    pub mime_type: String,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub purchase: PurchaseMeta,
    pub downloads: Vec<DownloadLink>,
}

impl DownloadLink {
    pub fn from_file(file: &GeneratedFile) -> Self {
        Self {
            label: file.label.clone(),
            url: file.path.clone(),
            kind: file.kind,
            mime_type: mime_guess::from_path(&file.path)
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

//! Shared application state handed to every handler.

use anyhow::Context;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::market::MarketData;
use crate::pdf::PdfRenderer;
use crate::pipeline::ReportPipeline;
use crate::purchase::jobs::JobBoard;
use crate::purchase::models::PurchaseMeta;
use crate::storage::{LocalPurchaseStore, PurchaseStore};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReportPipeline>,
    pub jobs: Arc<JobBoard>,
    /// `meta.json` is write-once, so cached entries never go stale.
    pub meta_cache: Cache<String, PurchaseMeta>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let market = MarketData::load(config.market_data_path.as_deref())
            .context("failed to load market data")?;
        log::info!("Loaded market data for {} companies", market.company_count());

        tokio::fs::create_dir_all(config.generated_dir())
            .await
            .with_context(|| {
                format!(
                    "failed to create generated directory {}",
                    config.generated_dir().display()
                )
            })?;

        let store: Arc<dyn PurchaseStore> =
            Arc::new(LocalPurchaseStore::new(config.public_dir.clone()));
        let pdf = PdfRenderer::new(config.pdf_settings());
        let pipeline = ReportPipeline::new(Arc::new(market), store, pdf);

        Ok(Self::with_pipeline(pipeline, config))
    }

    /// Assemble state around an already-built pipeline.
    pub fn with_pipeline(pipeline: ReportPipeline, config: AppConfig) -> Self {
        let meta_cache = Cache::builder()
            .time_to_live(Duration::from_secs(30 * 60))
            .max_capacity(1_000)
            .build();

        Self {
            pipeline: Arc::new(pipeline),
            jobs: Arc::new(JobBoard::new(config.job_retention)),
            meta_cache,
            config: Arc::new(config),
        }
    }
}

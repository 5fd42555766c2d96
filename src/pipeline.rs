//! Report generation pipeline.
//!
//! `ReportPipeline::generate_product` runs one purchase start to finish:
//! catalog lookup, market stats, one renderer, then the `meta.json`
//! manifest. It is sequential and has no retries; callers own status
//! tracking and retry policy.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::market::MarketData;
use crate::metrics;
use crate::pdf::PdfRenderer;
use crate::products::catalog::{BENCHMARK_REPORT, NEGOTIATION_KIT};
use crate::products::{
    benchmark_report, career_blueprint, find_product, negotiation_kit, Product, Progress,
    ProgressFn, RenderContext, RenderEnv,
};
use crate::purchase::models::{delivery_url, DeliveryDescriptor, PurchaseInput, PurchaseMeta};
use crate::storage::{PurchaseStore, StorageError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Explicitly constructed pipeline; the process bootstrap owns its
/// collaborators.
pub struct ReportPipeline {
    market: Arc<MarketData>,
    store: Arc<dyn PurchaseStore>,
    pdf: PdfRenderer,
}

impl ReportPipeline {
    pub fn new(market: Arc<MarketData>, store: Arc<dyn PurchaseStore>, pdf: PdfRenderer) -> Self {
        Self { market, store, pdf }
    }

    pub fn market(&self) -> &MarketData {
        &self.market
    }

    pub fn store(&self) -> &dyn PurchaseStore {
        self.store.as_ref()
    }

    pub async fn generate_product(
        &self,
        input: &PurchaseInput,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Result<DeliveryDescriptor, PipelineError> {
        let product = find_product(&input.product_slug)
            .ok_or_else(|| PipelineError::UnknownProduct(input.product_slug.clone()))?;

        let started = Instant::now();
        log::info!(
            "Generating {} for purchase {}",
            product.slug,
            input.purchase_id
        );

        let result = self.run(product, input, on_progress).await;

        let outcome = if result.is_ok() { "completed" } else { "failed" };
        metrics::record_generation(product.slug, outcome, started.elapsed().as_secs_f64());
        match &result {
            Ok(delivery) => log::info!(
                "Purchase {} generated {} files in {:.2?}",
                input.purchase_id,
                delivery.files.len(),
                started.elapsed()
            ),
            Err(e) => log::error!("Purchase {} failed: {}", input.purchase_id, e),
        }
        result
    }

    async fn run(
        &self,
        product: &'static Product,
        input: &PurchaseInput,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Result<DeliveryDescriptor, PipelineError> {
        let purchase_id = input.purchase_id.as_str();
        let progress = Progress::new(purchase_id, on_progress);

        progress.report(10, "market");
        let ctx = RenderContext::build(&self.market, product, input);
        progress.report(20, "pricing");
        log::debug!(
            "[{}] {} in {}: sample {}{}, ask {}-{}",
            purchase_id,
            ctx.job_label,
            ctx.city_label,
            ctx.stats.sample_size,
            if ctx.stats.estimated { " (estimated)" } else { "" },
            ctx.ask.ask_low,
            ctx.ask.ask_high
        );
        progress.report(30, "preparing");

        let env = RenderEnv {
            store: self.store.as_ref(),
            pdf: &self.pdf,
        };
        let files = match product.slug {
            NEGOTIATION_KIT => negotiation_kit::render(purchase_id, &ctx, &env, &progress).await?,
            BENCHMARK_REPORT => benchmark_report::render(purchase_id, &ctx, &env, &progress).await?,
            _ => career_blueprint::render(purchase_id, &ctx, &env, &progress).await?,
        };

        progress.report(95, "manifest");
        let meta = PurchaseMeta {
            input: input.clone(),
            product_name: product.name.to_string(),
            job_label: ctx.job_label.to_string(),
            city_label: ctx.city_label.to_string(),
            stats: ctx.stats.clone(),
            ask_range: ctx.ask,
            underpaid: ctx.underpaid,
            files: files.clone(),
            created_at: Utc::now(),
        };
        let meta_path = self.store.write_purchase_meta(&meta).await?;

        progress.report(100, "completed");
        Ok(DeliveryDescriptor {
            purchase_id: purchase_id.to_string(),
            files,
            delivery_url: delivery_url(purchase_id),
            meta_path,
        })
    }
}

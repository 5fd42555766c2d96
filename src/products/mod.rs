//! Products module - catalog and document renderers.
//!
//! - `catalog` - purchasable products and their deliverables
//! - `context` - the shared, read-only render context
//! - `common` - HTML/CSV helpers and the artifact writer
//! - `negotiation_kit`, `benchmark_report`, `career_blueprint` - renderers

pub mod benchmark_report;
pub mod career_blueprint;
pub mod catalog;
pub mod common;
pub mod context;
pub mod negotiation_kit;

pub use catalog::{find_product, Product, CATALOG};
pub use context::RenderContext;

use crate::pdf::PdfRenderer;
use crate::storage::PurchaseStore;

/// Progress callback: `(percent, stage)`.
pub type ProgressFn<'f> = dyn Fn(u8, &str) + Send + Sync + 'f;

/// Progress reporter handed to renderers. Checkpoints are coarse hints.
#[derive(Clone, Copy)]
pub struct Progress<'a> {
    callback: Option<&'a ProgressFn<'a>>,
    purchase_id: &'a str,
}

impl<'a> Progress<'a> {
    pub fn new(purchase_id: &'a str, callback: Option<&'a ProgressFn<'a>>) -> Self {
        Self {
            callback,
            purchase_id,
        }
    }

    pub fn report(&self, percent: u8, stage: &str) {
        log::debug!("[{}] {}% {}", self.purchase_id, percent, stage);
        if let Some(callback) = self.callback {
            callback(percent.min(100), stage);
        }
    }
}

/// Collaborators the renderers write through.
#[derive(Clone, Copy)]
pub struct RenderEnv<'a> {
    pub store: &'a dyn PurchaseStore,
    pub pdf: &'a PdfRenderer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_forwards_to_callback() {
        let seen = Mutex::new(Vec::new());
        let callback = |percent: u8, stage: &str| {
            seen.lock().unwrap().push((percent, stage.to_string()));
        };
        let progress = Progress::new("p1", Some(&callback));

        progress.report(45, "rendering");
        progress.report(120, "done");

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, vec![(45, "rendering".to_string()), (100, "done".to_string())]);
    }

    #[test]
    fn test_progress_without_callback_is_silent() {
        Progress::new("p1", None).report(10, "market");
    }
}

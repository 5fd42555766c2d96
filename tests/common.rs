#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use paybench_server::market::{MarketData, PurchaseOptions};
use paybench_server::pdf::{PdfRenderer, PdfSettings};
use paybench_server::pipeline::ReportPipeline;
use paybench_server::purchase::models::{PurchaseInput, PurchaseMeta};
use paybench_server::storage::{
    served_path, validate_file_name, validate_purchase_id, LocalPurchaseStore, PurchaseStore,
    StorageError, META_FILE,
};

/// In-memory PurchaseStore for pipeline tests.
#[derive(Default)]
pub struct MemoryPurchaseStore {
    files: tokio::sync::Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn file(&self, purchase_id: &str, file_name: &str) -> Option<Vec<u8>> {
        let files = self.files.lock().await;
        files.get(&served_path(purchase_id, file_name)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }
}

#[async_trait::async_trait]
impl PurchaseStore for MemoryPurchaseStore {
    async fn write_purchase_file(
        &self,
        purchase_id: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<String, StorageError> {
        validate_purchase_id(purchase_id)?;
        validate_file_name(file_name)?;
        let path = served_path(purchase_id, file_name);
        let mut files = self.files.lock().await;
        files.insert(path.clone(), content.to_vec());
        Ok(path)
    }

    async fn read_purchase_meta(&self, purchase_id: &str) -> Result<PurchaseMeta, StorageError> {
        match self.file(purchase_id, META_FILE).await {
            Some(raw) => Ok(serde_json::from_slice(&raw)?),
            None => Err(StorageError::NotFound(purchase_id.to_string())),
        }
    }
}

/// PDF renderer pointed at a browser that does not exist, so every PDF
/// goes through the fallback writer.
pub fn offline_pdf() -> PdfRenderer {
    PdfRenderer::new(PdfSettings {
        browser_bin: PathBuf::from("/nonexistent/paybench-test-browser"),
        timeout: Duration::from_secs(5),
    })
}

pub fn memory_pipeline() -> (ReportPipeline, Arc<MemoryPurchaseStore>) {
    let store = Arc::new(MemoryPurchaseStore::new());
    let market = Arc::new(MarketData::builtin().expect("built-in market data parses"));
    let pipeline = ReportPipeline::new(market, store.clone(), offline_pdf());
    (pipeline, store)
}

pub fn local_pipeline(public_dir: &Path) -> ReportPipeline {
    let market = Arc::new(MarketData::builtin().expect("built-in market data parses"));
    ReportPipeline::new(
        market,
        Arc::new(LocalPurchaseStore::new(public_dir)),
        offline_pdf(),
    )
}

pub fn input(purchase_id: &str, product_slug: &str) -> PurchaseInput {
    PurchaseInput {
        purchase_id: purchase_id.to_string(),
        product_slug: product_slug.to_string(),
        job_id: "software-engineer".to_string(),
        city_id: "san-francisco-ca".to_string(),
        options: PurchaseOptions::default(),
    }
}

/// Minimal reader for STORED archives: walks the central directory and
/// returns `(name, data)` pairs in directory order.
pub fn read_stored_zip(buf: &[u8]) -> Vec<(String, Vec<u8>)> {
    let u16_at = |at: usize| u16::from_le_bytes([buf[at], buf[at + 1]]) as usize;
    let u32_at =
        |at: usize| u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]) as usize;

    let eocd = buf.len() - 22;
    assert_eq!(u32_at(eocd), 0x0605_4b50, "end of central directory signature");
    let count = u16_at(eocd + 10);
    let mut at = u32_at(eocd + 16);

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        assert_eq!(u32_at(at), 0x0201_4b50, "central directory signature");
        assert_eq!(u16_at(at + 10), 0, "stored method");
        let size = u32_at(at + 20);
        let name_len = u16_at(at + 28);
        let local = u32_at(at + 42);
        let name = String::from_utf8(buf[at + 46..at + 46 + name_len].to_vec()).unwrap();

        assert_eq!(u32_at(local), 0x0403_4b50, "local header signature");
        let local_name_len = u16_at(local + 26);
        let extra_len = u16_at(local + 28);
        let data_start = local + 30 + local_name_len + extra_len;
        entries.push((name, buf[data_start..data_start + size].to_vec()));

        at += 46 + name_len + u16_at(at + 30) + u16_at(at + 32);
    }
    entries
}

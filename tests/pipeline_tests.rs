mod common;

use std::sync::Mutex;

use paybench_server::market::{get_salary_stats, MarketData};
use paybench_server::pipeline::PipelineError;
use paybench_server::products::catalog::{BENCHMARK_REPORT, CAREER_BLUEPRINT, NEGOTIATION_KIT};
use paybench_server::purchase::models::FileKind;
use paybench_server::storage::PurchaseStore;

use common::{input, memory_pipeline, read_stored_zip};

fn kinds(files: &[paybench_server::purchase::models::GeneratedFile]) -> Vec<FileKind> {
    files.iter().map(|f| f.kind).collect()
}

#[test]
fn test_sparse_city_uses_national_sample() {
    let market = MarketData::builtin().unwrap();
    let stats = get_salary_stats(&market, "Software Engineer", "San Francisco, CA");

    assert!(stats.estimated);
    assert_eq!(stats.sample_size, market.medians_for_job("Software Engineer").len());
    assert!(stats.sample_size > 0);
    assert!(stats.estimate_note.unwrap().contains("nationwide"));
}

#[tokio::test]
async fn test_benchmark_report_files() {
    let (pipeline, store) = memory_pipeline();

    let delivery = pipeline
        .generate_product(&input("pur_bench", BENCHMARK_REPORT), None)
        .await
        .unwrap();

    assert_eq!(kinds(&delivery.files), [FileKind::Pdf, FileKind::Csv, FileKind::Zip]);
    let csv = store.file("pur_bench", "benchmark_data.csv").await.unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert_eq!(
        csv.lines().next().unwrap(),
        "job,city,sampleSize,p25,p50,p75,p90,estimated"
    );
}

#[tokio::test]
async fn test_negotiation_kit_files_and_scripts() {
    let (pipeline, store) = memory_pipeline();

    let delivery = pipeline
        .generate_product(&input("pur_kit", NEGOTIATION_KIT), None)
        .await
        .unwrap();

    assert_eq!(
        kinds(&delivery.files),
        [FileKind::Pdf, FileKind::Pdf, FileKind::Txt, FileKind::Zip]
    );

    let meta = store.read_purchase_meta("pur_kit").await.unwrap();
    let txt = store.file("pur_kit", "negotiation_templates.txt").await.unwrap();
    let txt = String::from_utf8(txt).unwrap();
    assert!(txt.contains(&format!("${}", meta.ask_range.ask_low)));
    assert!(txt.contains(&format!("${}", meta.ask_range.ask_high)));
}

#[tokio::test]
async fn test_career_blueprint_is_the_default_branch() {
    let (pipeline, store) = memory_pipeline();

    let delivery = pipeline
        .generate_product(&input("pur_blueprint", CAREER_BLUEPRINT), None)
        .await
        .unwrap();

    assert_eq!(kinds(&delivery.files), [FileKind::Pdf, FileKind::Csv, FileKind::Zip]);
    let csv = store.file("pur_blueprint", "career_roadmap.csv").await.unwrap();
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 6);
}

#[tokio::test]
async fn test_unknown_product_writes_nothing() {
    let (pipeline, store) = memory_pipeline();

    let err = pipeline
        .generate_product(&input("pur_unknown", "mystery-box"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::UnknownProduct(_)));
    assert!(err.to_string().contains("Unknown product"));
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_bundle_holds_every_other_file() {
    let (pipeline, store) = memory_pipeline();

    pipeline
        .generate_product(&input("pur_zip", NEGOTIATION_KIT), None)
        .await
        .unwrap();

    let bundle = store.file("pur_zip", "bundle.zip").await.unwrap();
    let entries = read_stored_zip(&bundle);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        [
            "negotiation_kit.pdf",
            "negotiation_checklist.pdf",
            "negotiation_templates.txt"
        ]
    );
    for (name, data) in &entries {
        assert_eq!(&store.file("pur_zip", name).await.unwrap(), data);
    }

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bundle)).unwrap();
    for (i, (name, data)) in entries.iter().enumerate() {
        let mut file = archive.by_index(i).unwrap();
        assert_eq!(file.name(), name.as_str());
        let mut read = Vec::new();
        std::io::Read::read_to_end(&mut file, &mut read).unwrap();
        assert_eq!(&read, data);
    }
}

#[tokio::test]
async fn test_delivery_descriptor_and_manifest() {
    let (pipeline, store) = memory_pipeline();

    let delivery = pipeline
        .generate_product(&input("pur_meta", BENCHMARK_REPORT), None)
        .await
        .unwrap();

    assert_eq!(delivery.purchase_id, "pur_meta");
    assert_eq!(delivery.delivery_url, "/delivery/pur_meta?token=demo");
    assert_eq!(delivery.meta_path, "/generated/purchases/pur_meta/meta.json");
    for file in &delivery.files {
        assert!(file.path.starts_with("/generated/purchases/pur_meta/"));
    }

    let meta = store.read_purchase_meta("pur_meta").await.unwrap();
    assert_eq!(meta.product_name, "Compensation Benchmark Report");
    assert_eq!(meta.job_label, "Software Engineer");
    assert_eq!(meta.city_label, "San Francisco, CA");
    assert_eq!(meta.files, delivery.files);
    assert!(meta.stats.estimated);
}

#[tokio::test]
async fn test_progress_checkpoints_are_ordered() {
    let (pipeline, _store) = memory_pipeline();
    let seen = Mutex::new(Vec::new());
    let on_progress = |percent: u8, stage: &str| {
        seen.lock().unwrap().push((percent, stage.to_string()));
    };

    pipeline
        .generate_product(&input("pur_progress", CAREER_BLUEPRINT), Some(&on_progress))
        .await
        .unwrap();

    let seen = seen.into_inner().unwrap();
    let percents: Vec<u8> = seen.iter().map(|(p, _)| *p).collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last().unwrap(), &(100, "completed".to_string()));
    for stage in ["rendering", "writing", "bundling"] {
        assert!(seen.iter().any(|(_, s)| s == stage), "{stage}");
    }
}

#[tokio::test]
async fn test_invalid_purchase_id_is_a_storage_error() {
    let (pipeline, store) = memory_pipeline();

    let err = pipeline
        .generate_product(&input("../escape", BENCHMARK_REPORT), None)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Storage(_)));
    assert_eq!(store.len().await, 0);
}

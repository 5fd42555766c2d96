//! Pipeline metrics on the default prometheus registry.
//!
//! HTTP request metrics come from the actix-web-prometheus middleware at
//! `/metrics`; the counters here are served separately at
//! `/metrics/pipeline`.

use actix_web::{HttpResponse, Responder};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    pub static ref GENERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "paybench_generations_total",
        "Report generations by product and outcome",
        &["product", "outcome"]
    )
    .expect("metric can be registered");
    pub static ref PDF_FALLBACKS_TOTAL: IntCounter = register_int_counter!(
        "paybench_pdf_fallbacks_total",
        "PDFs produced by the plain fallback writer"
    )
    .expect("metric can be registered");
    pub static ref GENERATION_SECONDS: HistogramVec = register_histogram_vec!(
        "paybench_generation_seconds",
        "Wall time of one report generation",
        &["product"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("metric can be registered");
}

pub fn record_generation(product: &str, outcome: &str, seconds: f64) {
    GENERATIONS_TOTAL
        .with_label_values(&[product, outcome])
        .inc();
    GENERATION_SECONDS
        .with_label_values(&[product])
        .observe(seconds);
}

fn encode() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[utoipa::path(
    get,
    path = "/metrics/pipeline",
    tag = "Metrics",
    responses(
        (status = 200, description = "Pipeline metrics in the prometheus text format", body = String)
    )
)]
pub async fn pipeline_metrics() -> impl Responder {
    match encode() {
        Ok(body) => HttpResponse::Ok()
            .content_type(TextEncoder::new().format_type())
            .body(body),
        Err(e) => {
            log::error!("Failed to encode pipeline metrics: {}", e);
            HttpResponse::InternalServerError().json(crate::ErrorResponse::internal_error(
                "Failed to encode metrics",
            ))
        }
    }
}

use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod archive;
pub mod config;
pub mod market;
pub mod metrics;
pub mod pdf;
pub mod pipeline;
pub mod products;
pub mod purchase;
pub mod state;
pub mod storage;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::market::handlers::list_products,
        crate::market::handlers::list_options,
        crate::market::handlers::get_stats,
        crate::market::handlers::negotiation_calculator,
        crate::market::handlers::equity_calculator,
        crate::market::handlers::inflation_calculator,
        crate::market::handlers::percentile_calculator,
        crate::purchase::handlers::create_purchase,
        crate::purchase::handlers::get_purchase_status,
        crate::purchase::handlers::get_delivery,
        crate::metrics::pipeline_metrics
    ),
    components(
        schemas(
            market::handlers::ProductSummary,
            market::handlers::MarketOptions,
            market::handlers::StatsResponse,
            market::handlers::NegotiationRequest,
            market::handlers::NegotiationResponse,
            market::handlers::PercentileRequest,
            market::handlers::PercentileResponse,
            market::calculators::EquityInput,
            market::calculators::EquityValue,
            market::calculators::VestingYear,
            market::calculators::InflationInput,
            market::calculators::InflationAdjusted,
            market::calculators::SalaryPercentile,
            market::options::OptionEntry,
            market::SalaryStats,
            market::AskRange,
            market::PurchaseOptions,
            market::UnderpaidAssessment,
            market::UnderpaidTier,
            purchase::models::CreatePurchaseRequest,
            purchase::models::CreatePurchaseResponse,
            purchase::models::PurchaseInput,
            purchase::models::PurchaseMeta,
            purchase::models::GeneratedFile,
            purchase::models::FileKind,
            purchase::models::DeliveryDescriptor,
            purchase::models::DownloadLink,
            purchase::models::DeliveryResponse,
            purchase::jobs::JobStatus,
            purchase::jobs::JobState,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Catalog", description = "Report products."),
        (name = "Market", description = "Salary stats and calculators."),
        (name = "Purchases", description = "Report generation jobs and delivery."),
        (name = "Metrics", description = "Pipeline metrics.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Localhost")
    )
)]
pub struct ApiDoc;

/// API, delivery and pipeline metric routes. Static files and middleware are
/// added by [`run`].
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(market::handlers::config)
            .configure(purchase::handlers::config),
    )
    .service(
        web::resource("/delivery/{id}")
            .route(web::get().to(purchase::handlers::get_delivery)),
    )
    .service(web::resource("/metrics/pipeline").route(web::get().to(metrics::pipeline_metrics)));
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let bind = (config.host.clone(), config.port);
    let generated_dir = config.generated_dir();
    let origins = config.cors_allowed_origins.clone();

    let app_state = web::Data::new(
        AppState::from_config(config)
            .await
            .context("failed to initialise application state")?,
    );

    let prometheus = PrometheusMetricsBuilder::new("paybench_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {e}"))?;

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    log::info!("Serving generated files from {}", generated_dir.display());

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(configure_routes)
            .service(Files::new("/generated", &generated_dir))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::calculators::{
    EquityInput, EquityValue, InflationAdjusted, InflationInput, SalaryPercentile,
};
use super::options::{OptionEntry, CITY_OPTIONS, JOB_OPTIONS};
use super::{
    compute_ask_range, compute_equity_value, compute_inflation_adjusted,
    compute_salary_percentile, CalculatorError, compute_underpaid_score, get_salary_stats, resolve_city_label,
    resolve_job_label, AskRange, PurchaseOptions, SalaryStats, UnderpaidAssessment,
};
use crate::products::catalog::{Product, CATALOG};
use crate::{AppState, ErrorResponse};

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub slug: String,
    pub name: String,
    pub price_cents: u32,
    pub description: String,
    pub deliverables: Vec<String>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            slug: product.slug.to_string(),
            name: product.name.to_string(),
            price_cents: product.price_cents,
            description: product.description.to_string(),
            deliverables: product.deliverables.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct MarketOptions {
    pub jobs: Vec<OptionEntry>,
    pub cities: Vec<OptionEntry>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Job id or label; unknown values fall back to Software Engineer.
    #[serde(default)]
    pub job_id: String,
    /// City id or label; unknown values fall back to San Francisco, CA.
    #[serde(default)]
    pub city_id: String,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub job_label: String,
    pub city_label: String,
    pub stats: SalaryStats,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationRequest {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub city_id: String,
    #[serde(default)]
    pub options: PurchaseOptions,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationResponse {
    pub job_label: String,
    pub city_label: String,
    pub stats: SalaryStats,
    pub ask_range: AskRange,
    pub underpaid: UnderpaidAssessment,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PercentileRequest {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub city_id: String,
    pub salary: i64,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PercentileResponse {
    pub job_label: String,
    pub city_label: String,
    pub stats: SalaryStats,
    pub result: SalaryPercentile,
}

fn calculator_error(e: CalculatorError) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    responses(
        (status = 200, description = "Purchasable report products", body = [ProductSummary])
    )
)]
pub async fn list_products() -> impl Responder {
    let products: Vec<ProductSummary> = CATALOG.iter().map(ProductSummary::from).collect();
    HttpResponse::Ok().json(products)
}

#[utoipa::path(
    get,
    path = "/api/market/options",
    tag = "Market",
    responses(
        (status = 200, description = "Supported job and city options", body = MarketOptions)
    )
)]
pub async fn list_options() -> impl Responder {
    HttpResponse::Ok().json(MarketOptions {
        jobs: JOB_OPTIONS.to_vec(),
        cities: CITY_OPTIONS.to_vec(),
    })
}

#[utoipa::path(
    get,
    path = "/api/market/stats",
    tag = "Market",
    params(StatsQuery),
    responses(
        (status = 200, description = "Salary percentiles for the job and city", body = StatsResponse)
    )
)]
pub async fn get_stats(
    state: web::Data<AppState>,
    query: web::Query<StatsQuery>,
) -> impl Responder {
    let stats = get_salary_stats(state.pipeline.market(), &query.job_id, &query.city_id);
    HttpResponse::Ok().json(StatsResponse {
        job_label: resolve_job_label(&query.job_id).to_string(),
        city_label: resolve_city_label(&query.city_id).to_string(),
        stats,
    })
}

#[utoipa::path(
    post,
    path = "/api/calculators/negotiation",
    tag = "Market",
    request_body = NegotiationRequest,
    responses(
        (status = 200, description = "Ask range and underpaid assessment", body = NegotiationResponse),
        (status = 400, description = "Malformed request body")
    )
)]
pub async fn negotiation_calculator(
    state: web::Data<AppState>,
    req: web::Json<NegotiationRequest>,
) -> impl Responder {
    let stats = get_salary_stats(state.pipeline.market(), &req.job_id, &req.city_id);
    let ask_range = compute_ask_range(&stats, &req.options);
    let underpaid = compute_underpaid_score(&stats, &req.options);

    HttpResponse::Ok().json(NegotiationResponse {
        job_label: resolve_job_label(&req.job_id).to_string(),
        city_label: resolve_city_label(&req.city_id).to_string(),
        stats,
        ask_range,
        underpaid,
    })
}

#[utoipa::path(
    post,
    path = "/api/calculators/equity",
    tag = "Market",
    request_body = EquityInput,
    responses(
        (status = 200, description = "Vesting schedule and total equity value", body = EquityValue),
        (status = 400, description = "Invalid grant or vesting period", body = ErrorResponse)
    )
)]
pub async fn equity_calculator(req: web::Json<EquityInput>) -> impl Responder {
    match compute_equity_value(&req) {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => calculator_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/calculators/inflation",
    tag = "Market",
    request_body = InflationInput,
    responses(
        (status = 200, description = "Inflation-adjusted salary", body = InflationAdjusted),
        (status = 400, description = "Invalid salary, rate or period", body = ErrorResponse)
    )
)]
pub async fn inflation_calculator(req: web::Json<InflationInput>) -> impl Responder {
    match compute_inflation_adjusted(&req) {
        Ok(adjusted) => HttpResponse::Ok().json(adjusted),
        Err(e) => calculator_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/calculators/percentile",
    tag = "Market",
    request_body = PercentileRequest,
    responses(
        (status = 200, description = "Market percentile of the salary", body = PercentileResponse),
        (status = 400, description = "Invalid salary", body = ErrorResponse)
    )
)]
pub async fn percentile_calculator(
    state: web::Data<AppState>,
    req: web::Json<PercentileRequest>,
) -> impl Responder {
    let stats = get_salary_stats(state.pipeline.market(), &req.job_id, &req.city_id);
    match compute_salary_percentile(&stats, req.salary) {
        Ok(result) => HttpResponse::Ok().json(PercentileResponse {
            job_label: resolve_job_label(&req.job_id).to_string(),
            city_label: resolve_city_label(&req.city_id).to_string(),
            stats,
            result,
        }),
        Err(e) => calculator_error(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/products").route(web::get().to(list_products)))
        .service(web::resource("/market/options").route(web::get().to(list_options)))
        .service(web::resource("/market/stats").route(web::get().to(get_stats)))
        .service(
            web::resource("/calculators/negotiation")
                .route(web::post().to(negotiation_calculator)),
        )
        .service(web::resource("/calculators/equity").route(web::post().to(equity_calculator)))
        .service(
            web::resource("/calculators/inflation").route(web::post().to(inflation_calculator)),
        )
        .service(
            web::resource("/calculators/percentile")
                .route(web::post().to(percentile_calculator)),
        );
}

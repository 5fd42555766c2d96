use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;

use super::jobs::{JobBoardError, JobGuard, JobStatus};
use super::models::{
    CreatePurchaseRequest, CreatePurchaseResponse, DeliveryQuery, DeliveryResponse, DownloadLink,
    PurchaseInput, PurchaseMeta, DEMO_DELIVERY_TOKEN,
};
use crate::products::find_product;
use crate::storage::{validate_purchase_id, StorageError};
use crate::{AppState, ErrorResponse};

/// `pur_<unix millis>_<8 hex>`; unique per request.
pub fn new_purchase_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("pur_{}_{}", Utc::now().timestamp_millis(), &suffix[..8])
}

pub fn status_url(purchase_id: &str) -> String {
    format!("/api/purchases/{purchase_id}/status")
}

async fn run_job(state: web::Data<AppState>, input: PurchaseInput) {
    let purchase_id = input.purchase_id.clone();
    let guard = JobGuard::new(state.jobs.clone(), &purchase_id);
    state.jobs.mark_running(&purchase_id);

    let jobs = state.jobs.clone();
    let progress_id = purchase_id.clone();
    let on_progress = move |progress: u8, stage: &str| {
        jobs.record_progress(&progress_id, progress, stage);
    };

    match state
        .pipeline
        .generate_product(&input, Some(&on_progress))
        .await
    {
        Ok(delivery) => state.jobs.complete(&purchase_id, delivery),
        Err(e) => {
            log::error!("Generation job {} failed: {}", purchase_id, e);
            state.jobs.fail(&purchase_id, e.to_string());
        }
    }
    guard.disarm();
}

#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 202, description = "Generation queued", body = CreatePurchaseResponse),
        (status = 400, description = "Unknown product or invalid purchase id", body = ErrorResponse),
        (status = 409, description = "Purchase is already generated or being generated", body = ErrorResponse)
    )
)]
pub async fn create_purchase(
    state: web::Data<AppState>,
    req: web::Json<CreatePurchaseRequest>,
) -> impl Responder {
    let req = req.into_inner();

    let Some(product) = find_product(&req.product_slug) else {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
            "Unknown product: {}",
            req.product_slug
        )));
    };

    let purchase_id = match req.purchase_id {
        Some(id) => {
            if let Err(e) = validate_purchase_id(&id) {
                return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()));
            }
            id
        }
        None => new_purchase_id(),
    };

    match state.pipeline.store().read_purchase_meta(&purchase_id).await {
        Ok(_) => {
            return HttpResponse::Conflict().json(ErrorResponse::new(
                "Conflict",
                &format!("purchase '{purchase_id}' has already been generated"),
            ));
        }
        Err(StorageError::NotFound(_)) => {}
        Err(e) => {
            log::error!("Failed to check manifest for {}: {}", purchase_id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to check purchase"));
        }
    }

    let status = match state.jobs.enqueue(&purchase_id, product.slug) {
        Ok(status) => status,
        Err(e @ (JobBoardError::AlreadyInFlight(_) | JobBoardError::AlreadyGenerated(_))) => {
            return HttpResponse::Conflict().json(ErrorResponse::new("Conflict", &e.to_string()));
        }
    };
    log::info!("Queued {} as purchase {}", product.slug, purchase_id);

    let input = PurchaseInput {
        purchase_id: purchase_id.clone(),
        product_slug: req.product_slug,
        job_id: req.job_id,
        city_id: req.city_id,
        options: req.options,
    };
    actix_web::rt::spawn(run_job(state.clone(), input));

    HttpResponse::Accepted().json(CreatePurchaseResponse {
        status_url: status_url(&purchase_id),
        purchase_id,
        status: status.state,
    })
}

#[utoipa::path(
    get,
    path = "/api/purchases/{id}/status",
    tag = "Purchases",
    params(
        ("id" = String, Path, description = "Purchase id")
    ),
    responses(
        (status = 200, description = "Current job status", body = JobStatus),
        (status = 404, description = "No job with this id", body = ErrorResponse)
    )
)]
pub async fn get_purchase_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let purchase_id = path.into_inner();
    match state.jobs.get(&purchase_id) {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
            "No generation job for purchase {purchase_id}"
        ))),
    }
}

async fn load_meta(state: &AppState, purchase_id: &str) -> Result<PurchaseMeta, StorageError> {
    if let Some(meta) = state.meta_cache.get(purchase_id).await {
        return Ok(meta);
    }
    let meta = state.pipeline.store().read_purchase_meta(purchase_id).await?;
    state
        .meta_cache
        .insert(purchase_id.to_string(), meta.clone())
        .await;
    Ok(meta)
}

#[utoipa::path(
    get,
    path = "/delivery/{id}",
    tag = "Purchases",
    params(
        ("id" = String, Path, description = "Purchase id"),
        ("token" = Option<String>, Query, description = "Delivery token")
    ),
    responses(
        (status = 200, description = "Purchase manifest and download links", body = DeliveryResponse),
        (status = 400, description = "Invalid purchase id", body = ErrorResponse),
        (status = 403, description = "Missing or wrong delivery token", body = ErrorResponse),
        (status = 404, description = "Purchase not found", body = ErrorResponse)
    )
)]
pub async fn get_delivery(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DeliveryQuery>,
) -> impl Responder {
    if query.token.as_deref() != Some(DEMO_DELIVERY_TOKEN) {
        return HttpResponse::Forbidden()
            .json(ErrorResponse::new("Forbidden", "Invalid delivery token"));
    }

    let purchase_id = path.into_inner();
    match load_meta(&state, &purchase_id).await {
        Ok(meta) => {
            let downloads = meta.files.iter().map(DownloadLink::from_file).collect();
            HttpResponse::Ok().json(DeliveryResponse {
                purchase: meta,
                downloads,
            })
        }
        Err(StorageError::NotFound(_)) => HttpResponse::NotFound().json(ErrorResponse::not_found(
            &format!("Purchase {purchase_id} not found"),
        )),
        Err(e @ StorageError::InvalidPurchaseId(_)) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()))
        }
        Err(e) => {
            log::error!("Failed to read manifest for {}: {}", purchase_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to read purchase"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/purchases").route(web::post().to(create_purchase)))
        .service(
            web::resource("/purchases/{id}/status").route(web::get().to(get_purchase_status)),
        );
}

use actix_web::{web, HttpResponse};

use crate::application::IngestService;
use crate::db::DbPool;
use crate::domain::records::{OrderItemRecord, OrderRecord, OrderWithItemsRecord};
use crate::errors::AppError;
use crate::infrastructure::DieselIngestGateway;

fn service(pool: &web::Data<DbPool>) -> IngestService<DieselIngestGateway> {
    IngestService::new(DieselIngestGateway::new(pool.get_ref().clone()))
}

/// POST /bulk_load/orders
///
/// Idempotently loads a batch of orders: records whose `external_id` is
/// already persisted are skipped, new ones are created, and validation
/// failures are reported per record without aborting the batch.
#[utoipa::path(
    post,
    path = "/bulk_load/orders",
    request_body = Vec<OrderRecord>,
    responses(
        (status = 200, description = "Batch processed", body = crate::domain::report::OrderBatchReport),
        (status = 422, description = "Empty batch"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "bulk_load"
)]
pub async fn load_orders(
    pool: web::Data<DbPool>,
    body: web::Json<Vec<OrderRecord>>,
) -> Result<HttpResponse, AppError> {
    let records = body.into_inner();

    let report = web::block(move || service(&pool).load_orders(records))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(report))
}

/// POST /bulk_load/order_items
///
/// Idempotently loads standalone order items, keyed on
/// `(order_id, product_id, store_id)`.
#[utoipa::path(
    post,
    path = "/bulk_load/order_items",
    request_body = Vec<OrderItemRecord>,
    responses(
        (status = 200, description = "Batch processed", body = crate::domain::report::OrderItemBatchReport),
        (status = 422, description = "Empty batch"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "bulk_load"
)]
pub async fn load_order_items(
    pool: web::Data<DbPool>,
    body: web::Json<Vec<OrderItemRecord>>,
) -> Result<HttpResponse, AppError> {
    let records = body.into_inner();

    let report = web::block(move || service(&pool).load_order_items(records))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(report))
}

/// POST /bulk_load/orders_with_items
///
/// Loads each order together with its nested items as one atomic unit; a
/// failure anywhere in a record rolls back that record's order and items.
#[utoipa::path(
    post,
    path = "/bulk_load/orders_with_items",
    request_body = Vec<OrderWithItemsRecord>,
    responses(
        (status = 200, description = "Batch processed", body = crate::domain::report::OrderBatchReport),
        (status = 422, description = "Empty batch"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "bulk_load"
)]
pub async fn load_orders_with_items(
    pool: web::Data<DbPool>,
    body: web::Json<Vec<OrderWithItemsRecord>>,
) -> Result<HttpResponse, AppError> {
    let records = body.into_inner();

    let report = web::block(move || service(&pool).load_orders_with_items(records))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(report))
}

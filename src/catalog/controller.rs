use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;

use crate::catalog::model::{ListQuery, MarkRequest, PopularQuery};
use crate::catalog::service::CatalogService;
use crate::comment::model::EntityType;
use crate::middleware::auth::{OptionalViewer, Viewer};
use crate::utils::error::CustomError;

/// GET /catalog/{kind}?q=
pub async fn list_entries(
    catalog_service: web::Data<CatalogService>,
    kind: web::Path<String>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, CustomError> {
    let kind: EntityType = kind.parse()?;
    let entries = catalog_service.list(kind, query.q.as_deref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("{} catalog retrieved successfully", kind),
        "httpStatusCode": 200,
        "count": entries.len(),
        "data": entries
    })))
}

/// GET /catalog/{kind}/{slug}
pub async fn get_entry(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(String, String)>,
    viewer: OptionalViewer,
) -> Result<HttpResponse, CustomError> {
    let (kind, slug) = path.into_inner();
    let kind: EntityType = kind.parse()?;
    let detail = catalog_service.detail(kind, &slug, viewer.0.as_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Entry retrieved successfully",
        "httpStatusCode": 200,
        "data": detail
    })))
}

/// PUT /catalog/{kind}/{id}/pick
pub async fn mark_entry(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(String, i64)>,
    viewer: Viewer,
    body: web::Json<MarkRequest>,
) -> Result<HttpResponse, CustomError> {
    let (kind, id) = path.into_inner();
    let kind: EntityType = kind.parse()?;
    let status = body.into_inner().status;
    catalog_service.mark(kind, id, status, &viewer).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Pick saved",
        "httpStatusCode": 200,
        "data": { "id": id, "status": status }
    })))
}

/// DELETE /catalog/{kind}/{id}/pick
pub async fn clear_mark(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(String, i64)>,
    viewer: Viewer,
) -> Result<HttpResponse, CustomError> {
    let (kind, id) = path.into_inner();
    let kind: EntityType = kind.parse()?;
    catalog_service.clear_mark(kind, id, &viewer).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Pick removed",
        "httpStatusCode": 200
    })))
}

/// GET /catalog/picks/{kind}
pub async fn my_picks(
    catalog_service: web::Data<CatalogService>,
    kind: web::Path<String>,
    viewer: Viewer,
) -> Result<HttpResponse, CustomError> {
    let kind: EntityType = kind.parse()?;
    let picks = catalog_service.my_picks(kind, &viewer).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Picks retrieved successfully",
        "httpStatusCode": 200,
        "data": picks
    })))
}

/// GET /catalog/popular/{kind}?limit=
pub async fn popular(
    catalog_service: web::Data<CatalogService>,
    kind: web::Path<String>,
    query: web::Query<PopularQuery>,
    viewer: Viewer,
) -> Result<HttpResponse, CustomError> {
    let kind: EntityType = kind.parse()?;
    let ranked = catalog_service.popular(kind, query.limit, &viewer).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Leaderboard retrieved successfully",
        "httpStatusCode": 200,
        "count": ranked.len(),
        "data": ranked
    })))
}

/// GET /events
pub async fn upcoming_events(
    catalog_service: web::Data<CatalogService>,
) -> Result<HttpResponse, CustomError> {
    let events = catalog_service.upcoming_events(Utc::now()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Upcoming events retrieved successfully",
        "httpStatusCode": 200,
        "count": events.len(),
        "data": events
    })))
}

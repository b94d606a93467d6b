use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::comment::model::{CreateCommentRequest, EntityRef, LikeState};
use crate::comment::service::CommentService;
use crate::middleware::auth::{OptionalViewer, Viewer};
use crate::utils::error::CustomError;

/// Thread of a track or race, newest first
/// GET /comments/{entity_type}/{entity_id}
pub async fn get_thread(
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, i64)>,
    viewer: OptionalViewer,
) -> Result<HttpResponse, CustomError> {
    let (entity_type, entity_id) = path.into_inner();
    let entity = EntityRef::parse(&entity_type, entity_id)?;

    let thread = comment_service.load_thread(entity, viewer.0.as_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments retrieved successfully",
        "httpStatusCode": 200,
        "count": thread.len(),
        "data": thread.comments
    })))
}

/// Post a comment or a reply
/// POST /comments/{entity_type}/{entity_id}
pub async fn create_comment(
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, i64)>,
    viewer: Viewer,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let (entity_type, entity_id) = path.into_inner();
    let entity = EntityRef::parse(&entity_type, entity_id)?;
    let request = body.into_inner();

    let posted = comment_service
        .post_comment(entity, &viewer, &request.body, request.reply_to)
        .await?;

    let (status, message) = if posted {
        (StatusCode::CREATED, "Comment posted successfully")
    } else {
        (StatusCode::OK, "Empty comment ignored")
    };

    Ok(HttpResponse::build(status).json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": status.as_u16(),
        "posted": posted
    })))
}

/// Like or unlike a comment; the body is the like state the client holds
/// POST /comments/{entity_type}/{entity_id}/{comment_id}/like
pub async fn toggle_like(
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, i64, i64)>,
    viewer: Viewer,
    body: web::Json<LikeState>,
) -> Result<HttpResponse, CustomError> {
    let (entity_type, entity_id, comment_id) = path.into_inner();
    let entity = EntityRef::parse(&entity_type, entity_id)?;

    let state = comment_service
        .toggle_like(entity, comment_id, &viewer, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": if state.liked { "Comment liked" } else { "Comment unliked" },
        "httpStatusCode": 200,
        "data": state
    })))
}

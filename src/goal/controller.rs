use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;

use crate::goal::model::{CreateGoalRequest, UpdateGoalRequest};
use crate::goal::service::GoalService;
use crate::middleware::auth::Viewer;
use crate::utils::error::CustomError;

async fn board_response(
    goal_service: &GoalService,
    viewer: &Viewer,
    status: StatusCode,
    message: &str,
) -> Result<HttpResponse, CustomError> {
    let board = goal_service.list(viewer).await?;
    Ok(HttpResponse::build(status).json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": status.as_u16(),
        "data": board
    })))
}

pub async fn list_goals(
    goal_service: web::Data<GoalService>,
    viewer: Viewer,
) -> Result<HttpResponse, CustomError> {
    board_response(&goal_service, &viewer, StatusCode::OK, "Goals retrieved successfully").await
}

pub async fn create_goal(
    goal_service: web::Data<GoalService>,
    viewer: Viewer,
    body: web::Json<CreateGoalRequest>,
) -> Result<HttpResponse, CustomError> {
    if goal_service.add(&viewer, &body.title).await? {
        board_response(&goal_service, &viewer, StatusCode::CREATED, "Goal added").await
    } else {
        board_response(&goal_service, &viewer, StatusCode::OK, "Empty goal ignored").await
    }
}

pub async fn update_goal(
    goal_service: web::Data<GoalService>,
    viewer: Viewer,
    goal_id: web::Path<i64>,
    body: web::Json<UpdateGoalRequest>,
) -> Result<HttpResponse, CustomError> {
    goal_service
        .set_status(&viewer, goal_id.into_inner(), body.status, Utc::now())
        .await?;
    board_response(&goal_service, &viewer, StatusCode::OK, "Goal updated").await
}

pub async fn delete_goal(
    goal_service: web::Data<GoalService>,
    viewer: Viewer,
    goal_id: web::Path<i64>,
) -> Result<HttpResponse, CustomError> {
    goal_service.delete(&viewer, goal_id.into_inner()).await?;
    board_response(&goal_service, &viewer, StatusCode::OK, "Goal deleted").await
}

use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::middleware::auth::Viewer;
use crate::user::model::{CreateUserRequest, LoginRequests};
use crate::user::service::UserService;
use crate::utils::error::CustomError;

pub async fn register_user(
    user_service: web::Data<UserService>,
    user_info: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, CustomError> {
    let outcome = user_service.create_user(user_info.into_inner()).await?;

    let message = if outcome.confirmation_pending {
        "Check your email to confirm your account, then log in"
    } else {
        "User created successfully"
    };
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": message,
        "httpStatusCode": 201,
        "data": outcome
    })))
}

pub async fn login_user(
    user_service: web::Data<UserService>,
    login_info: web::Json<LoginRequests>,
) -> Result<HttpResponse, CustomError> {
    let session = user_service.login_fn(login_info.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful",
        "httpStatusCode": 200,
        "data": session
    })))
}

pub async fn logout_user(
    user_service: web::Data<UserService>,
    viewer: Viewer,
) -> Result<HttpResponse, CustomError> {
    user_service.logout(&viewer).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged out successfully",
        "httpStatusCode": 200
    })))
}

pub async fn current_user(
    user_service: web::Data<UserService>,
    viewer: Viewer,
) -> Result<HttpResponse, CustomError> {
    let user = user_service.current_user(&viewer).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User retrieved successfully",
        "httpStatusCode": 200,
        "data": user
    })))
}

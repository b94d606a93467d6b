use super::controller::{create_goal, delete_goal, list_goals, update_goal};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn goal_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/goals")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::get().to(list_goals))
            .route("", web::post().to(create_goal))
            .route("/{id}", web::patch().to(update_goal))
            .route("/{id}", web::delete().to(delete_goal)),
    );
}

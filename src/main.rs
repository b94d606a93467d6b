use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use serde_json::json;

mod catalog;
mod comment;
mod database;
mod goal;
mod journal;
mod middleware;
mod router;
mod user;
mod utils;

use catalog::service::CatalogService;
use comment::service::CommentService;
use comment::store::SupabaseCommentStore;
use database::{StorageBucket, SupabaseClient};
use goal::service::GoalService;
use journal::service::JournalService;
use middleware::auth::JwtVerifier;
use middleware::error_handler::{handle_error, not_found};
use router::index::routes;
use user::service::UserService;
use utils::config::{AppConfig, service_name};

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Welcome to the paddock journal API",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": service_name(),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(message) => {
            error!("Invalid configuration: {}", message);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, message));
        }
    };

    let client = SupabaseClient::from_config(&config);
    let verifier = web::Data::new(JwtVerifier::new(&config.jwt_secret));
    let comment_service = web::Data::new(CommentService::new(Arc::new(
        SupabaseCommentStore::new(client.clone()),
    )));
    let catalog_service = web::Data::new(CatalogService::new(client.clone()));
    let goal_service = web::Data::new(GoalService::new(client.clone()));
    let journal_service = web::Data::new(JournalService::new(
        client.clone(),
        StorageBucket::new(client.clone(), &config.photo_bucket),
    ));
    let user_service = web::Data::new(UserService::new(client));

    info!(
        "Starting server on http://{}:{} (backend {})",
        config.host, config.port, config.supabase_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Logger::new("%a %{User-Agent}i"))
            .app_data(verifier.clone())
            .app_data(comment_service.clone())
            .app_data(catalog_service.clone())
            .app_data(goal_service.clone())
            .app_data(journal_service.clone())
            .app_data(user_service.clone())
            .configure(routes)
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .service(default)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}

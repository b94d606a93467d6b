use super::controller::{
    create_folder, create_moment, delete_folder, delete_moment, list_folders, list_moments,
    update_moment, upload_photos,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn journal_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/folders")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::get().to(list_folders))
            .route("", web::post().to(create_folder))
            .route("/{id}", web::delete().to(delete_folder)),
    );
    cfg.service(
        web::scope("/moments")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::get().to(list_moments))
            .route("", web::post().to(create_moment))
            .route("/{id}", web::patch().to(update_moment))
            .route("/{id}", web::delete().to(delete_moment))
            .route("/{id}/photos", web::post().to(upload_photos)),
    );
}

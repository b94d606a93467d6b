use super::controller::{create_comment, get_thread, toggle_like};
use actix_web::web;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .route("/{entity_type}/{entity_id}", web::get().to(get_thread))
            .route("/{entity_type}/{entity_id}", web::post().to(create_comment))
            .route(
                "/{entity_type}/{entity_id}/{comment_id}/like",
                web::post().to(toggle_like),
            ),
    );
}

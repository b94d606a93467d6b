use super::controller::{current_user, login_user, logout_user, register_user};
use actix_web::web;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth/user")
            .route("/register", web::post().to(register_user))
            .route("/login", web::post().to(login_user))
            .route("/logout", web::post().to(logout_user))
            .route("/me", web::get().to(current_user)),
    );
}

use crate::catalog::index::{catalog_routes, event_routes};
use crate::comment::index::comment_routes;
use crate::goal::index::goal_routes;
use crate::journal::index::journal_routes;
use crate::user::index::user_routes;
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(user_routes);
    cfg.configure(comment_routes);
    cfg.configure(catalog_routes);
    cfg.configure(event_routes);
    cfg.configure(goal_routes);
    cfg.configure(journal_routes);
}

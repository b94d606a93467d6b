use super::controller::{
    clear_mark, get_entry, list_entries, mark_entry, my_picks, popular, upcoming_events,
};
use actix_web::web;

pub fn catalog_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalog")
            // kinds are a closed set, so these never shadow a slug
            .route("/popular/{kind}", web::get().to(popular))
            .route("/picks/{kind}", web::get().to(my_picks))
            .route("/{kind}", web::get().to(list_entries))
            .route("/{kind}/{slug}", web::get().to(get_entry))
            .route("/{kind}/{id}/pick", web::put().to(mark_entry))
            .route("/{kind}/{id}/pick", web::delete().to(clear_mark)),
    );
}

pub fn event_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::get().to(upcoming_events));
}

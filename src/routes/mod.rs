// Route exports
pub mod matches;

pub use matches::AppState;

use actix_web::web;

/// Mount every endpoint under the versioned API prefix
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure),
    );
}

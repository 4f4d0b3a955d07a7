// board-collab-service/src/routes/mod.rs
use actix_web::web;

pub mod board_routes;
pub mod collaboration_routes;
pub mod project_routes;

// Every HTTP route of the service
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    project_routes::init_routes(cfg);
    board_routes::init_routes(cfg);
    collaboration_routes::init_routes(cfg);
}

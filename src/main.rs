//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use log::info;

use board_collab_service::config::AppConfig;
use board_collab_service::routes;
use board_collab_service::services::AppState;
use board_collab_service::utils::{Identity, USER_ID_HEADER};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let config = AppConfig::from_env();

    let state = AppState::from_config(&config)?;
    let address = config.bind_address.clone();
    let allowed_origin = config.allowed_origin.clone();

    info!("🚀 Server started at {}", address);
    info!(
        "Storage: {} (snapshot {})",
        config.storage_dir.display(),
        if config.persist_state { "enabled" } else { "disabled" }
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .allowed_header(USER_ID_HEADER)
            .max_age(3600);

        App::new()
            .wrap(Identity)
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::init_routes)
    })
    .bind(address)?
    .run()
    .await
}

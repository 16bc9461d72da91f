use actix_cors::Cors;
use actix_web::{App, HttpServer};
use backend::build_state;
use backend::config::AppConfig;

fn startup_failure(err: impl std::fmt::Display) -> std::io::Error {
    log::error!("Startup failed: {}", err);
    std::io::Error::other(err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = std::env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let config = AppConfig::load().map_err(startup_failure)?;
    let state = build_state(&config).map_err(startup_failure)?;

    log::info!(
        "Reports in {}, charts in {}, organization {}",
        config.reports_dir.display(),
        config.charts_dir.display(),
        config.portal.organization.name
    );

    let bind_address = config.bind_addr();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(state.auth_middleware())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .configure(|cfg| state.configure(cfg))
    })
    .bind(&bind_address)?
    .run()
    .await
}

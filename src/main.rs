use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;

use orgchart_backend::config::Config;
use orgchart_backend::{configure, db, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|err| {
        error!("Invalid configuration: {}", err);
        io::Error::new(io::ErrorKind::InvalidInput, err)
    })?;

    let store = db::create_store(&config).await.map_err(|err| {
        error!("Failed to initialise the store: {}", err);
        io::Error::new(io::ErrorKind::Other, err)
    })?;

    let state = web::Data::new(AppState {
        store,
        jwt_secret: config.jwt_secret.clone(),
    });

    info!("Starting server at {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::NormalizePath::trim())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use actix_web::web;
use std::sync::Arc;

use crate::db::TreeStore;
use crate::errors::AppError;

/// Shared state handed to every handler.
pub struct AppState {
    pub store: Arc<dyn TreeStore>,
    pub jwt_secret: String,
}

/// Registers the `/api` routes and the extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .service(
                web::resource("/departments")
                    .route(web::get().to(handlers::department::get_departments))
                    .route(web::post().to(handlers::department::create_department)),
            )
            .service(
                web::resource("/departments/{department_id}")
                    .route(web::get().to(handlers::department::get_department))
                    .route(web::patch().to(handlers::department::update_department))
                    .route(web::delete().to(handlers::department::delete_department)),
            )
            .service(
                web::resource("/departments/{department_id}/employees")
                    .route(web::get().to(handlers::employee::get_department_employees))
                    .route(web::post().to(handlers::employee::create_employee)),
            )
            .service(
                web::resource("/employees/{employee_id}")
                    .route(web::get().to(handlers::employee::get_employee))
                    .route(web::patch().to(handlers::employee::update_employee))
                    .route(web::delete().to(handlers::employee::delete_employee)),
            ),
    );
}

mod config;
mod db;
mod domain;
mod errors;
mod handlers;
mod models;
mod routes;
mod store;
mod utils;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use std::collections::HashMap;

use crate::config::Config;
use crate::store::{SessionStore, TemplateDraftStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().unwrap_or_else(|err| panic!("Invalid configuration: {}", err));

    // Initialize the database pool
    let pool = db::init_pool(&config)
        .await
        .expect("Failed to connect to the database");

    // Live sessions and template drafts stay in memory until finished, saved or idle
    let sessions = web::Data::new(SessionStore::new(
        "Session",
        config.draft_capacity,
        config.draft_idle,
    ));
    let drafts = web::Data::new(TemplateDraftStore::new(
        "Draft",
        config.draft_capacity,
        config.draft_idle,
    ));
    let pool = web::Data::new(pool);
    let jwt = web::Data::new(config.jwt.clone());

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), config.metrics_app_label.clone());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .expect("Failed to create Prometheus metrics");

    info!(
        "Starting server at {} with {} workers",
        config.bind_address, config.workers
    );

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // Logging middleware
            .wrap(prometheus.clone()) // Prometheus metrics middleware
            .app_data(pool.clone())
            .app_data(sessions.clone())
            .app_data(drafts.clone())
            .app_data(jwt.clone())
            .configure(routes::configure)
    })
    .workers(config.workers)
    .bind(&config.bind_address)?
    .run()
    .await
}

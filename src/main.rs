#[macro_use]
extern crate failure;

mod config;
mod db;
mod http;
mod service;
mod types;

use config::Config;
use env_logger::Env;
use failure::Error;
use log::{error, info};
use service::VehicleService;
use std::sync::Arc;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting vehicle-registry");

    if let Err(e) = run().await {
        error!("Vehicle registry failed: {}", e);
        std::process::exit(1);
    }
    info!("Exiting main");
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;
    let store = db::open(&config.db_path)?;
    let service = Arc::new(Mutex::new(VehicleService::new(store)));

    let (addr, server) = warp::serve(http::routes(service))
        .try_bind_with_graceful_shutdown(config.listen_addr, async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => {
                    error!("Unable to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })?;
    info!("Listening on {}", addr);
    server.await;
    Ok(())
}

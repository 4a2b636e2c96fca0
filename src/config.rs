use failure::{Error, ResultExt};
use std::env;
use std::net::SocketAddr;

const DEFAULT_DB_PATH: &str = "/data/vehicles.db";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Reads `VEHICLES_DB` and `VEHICLES_ADDR`, falling back to defaults when unset.
    pub fn from_env() -> Result<Config, Error> {
        Config::from_vars(env::var("VEHICLES_DB").ok(), env::var("VEHICLES_ADDR").ok())
    }

    fn from_vars(db_path: Option<String>, addr: Option<String>) -> Result<Config, Error> {
        let addr = addr.unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let listen_addr = addr
            .parse::<SocketAddr>()
            .with_context(|_| format!("Invalid VEHICLES_ADDR '{}'", addr))?;
        Ok(Config {
            db_path: db_path.unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            listen_addr,
        })
    }
}

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub seed_url: String,
}

impl Config {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self {
            host: try_load("HOST", "0.0.0.0"),
            port: try_load("PORT", "3000"),
            database_url: try_load("DATABASE_URL", "sqlite://database.sqlite?mode=rwc"),
            seed_url: try_load("SEED_URL", "https://fakestoreapi.com/products"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

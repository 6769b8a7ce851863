//! Configuration management for the Slidetimer server

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub providers: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// OAuth client credentials for the supported identity providers
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub google_client_id: String,
    pub google_client_secret: String,
    pub discord_client_id: String,
    pub discord_client_secret: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./slidetimer.db".to_string(),
            },
            providers: ProviderConfig {
                google_client_id: String::new(),
                google_client_secret: String::new(),
                discord_client_id: String::new(),
                discord_client_secret: String::new(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:./slidetimer.db".to_string()),
            },
            providers: ProviderConfig {
                google_client_id: env::var("GOOGLE_CLIENT_ID")?,
                google_client_secret: env::var("GOOGLE_CLIENT_SECRET")?,
                discord_client_id: env::var("DISCORD_CLIENT_ID")?,
                discord_client_secret: env::var("DISCORD_CLIENT_SECRET")?,
            },
        })
    }
}

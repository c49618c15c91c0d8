use eyre::{eyre, Report};
use secrecy::{ExposeSecret, SecretString};
use std::env;

#[derive(Debug, Clone)]
pub struct DatabaseInfo {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub name: String,
}

impl DatabaseInfo {
    pub fn new() -> Result<Self, Report> {
        Ok(Self {
            host: env::var("DB_HOST").map_err(|_| eyre!("DB_HOST must be set"))?,
            port: env::var("DB_PORT")
                .unwrap_or_else(|_| "5432".into())
                .parse()
                .map_err(|e| eyre!("Invalid DB_PORT: {}", e))?,
            user: env::var("DB_USER").map_err(|_| eyre!("DB_USER must be set"))?,
            password: SecretString::from(
                env::var("DB_PASSWORD").map_err(|_| eyre!("DB_PASSWORD must be set"))?,
            ),
            name: env::var("DB_NAME").map_err(|_| eyre!("DB_NAME must be set"))?,
        })
    }

    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.name
        )
    }
}

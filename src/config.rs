//! Server configuration from flags and environment

use chrono::Duration;
use clap::Parser;

use crate::auth::{AuthSettings, MIN_BCRYPT_COST};

#[derive(Debug, Clone, Parser)]
#[command(name = "delivery-tracker")]
#[command(about = "Delivery tracking server")]
#[command(version)]
pub struct Config {
    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:delivery.db?mode=rwc")]
    pub database_url: String,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Secret used to sign bearer tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Token lifetime in hours, at most one year
    #[arg(
        long,
        env = "TOKEN_TTL_HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(i64).range(1..=8760)
    )]
    pub token_ttl_hours: i64,

    /// bcrypt cost for stored passwords (minimum 10)
    #[arg(long, env = "BCRYPT_COST", default_value_t = MIN_BCRYPT_COST)]
    pub bcrypt_cost: u32,

    /// Username of the bootstrap admin account
    #[arg(long, env = "ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,

    /// Password of the bootstrap admin account; seeding is skipped when unset
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    #[arg(long, env = "ADMIN_NAME", default_value = "System Administrator")]
    pub admin_name: String,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            jwt_secret: self.jwt_secret.clone(),
            token_ttl: Duration::hours(self.token_ttl_hours),
            bcrypt_cost: self.bcrypt_cost.max(MIN_BCRYPT_COST),
        }
    }
}

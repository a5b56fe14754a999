use std::env;

use anyhow::Context;
use chrono::Duration;

use crate::auth::LockoutPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub session_expires_in: i64,
    pub port: u16,
    pub db_max_connections: u32,
    pub max_failed_logins: i32,
    pub lockout_minutes: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            session_expires_in: var_or("SESSION_EXPIRES_IN", "28800")? // 8 hours
                .parse()
                .context("SESSION_EXPIRES_IN")?,
            port: var_or("PORT", "3000")?.parse().context("PORT")?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", "10")?
                .parse()
                .context("DB_MAX_CONNECTIONS")?,
            max_failed_logins: var_or("MAX_FAILED_LOGINS", "5")?
                .parse()
                .context("MAX_FAILED_LOGINS")?,
            lockout_minutes: var_or("LOCKOUT_MINUTES", "15")?
                .parse()
                .context("LOCKOUT_MINUTES")?,
        })
    }

    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy::new(self.max_failed_logins, Duration::minutes(self.lockout_minutes))
    }
}

fn var_or(key: &str, default: &str) -> anyhow::Result<String> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.to_string()),
        Err(e) => Err(e).with_context(|| format!("{key} is not valid unicode")),
    }
}

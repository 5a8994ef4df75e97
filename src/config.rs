use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;

use crate::auth::token::MAX_LIFETIME_HOURS;
use crate::error::AppError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TOKEN_HOURS: i64 = 24;
const TOKEN_HOURS: RangeInclusive<i64> = 1..=MAX_LIFETIME_HOURS;
const BCRYPT_COSTS: RangeInclusive<u32> = 4..=31;

pub struct Config {
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| config_error("JWT_SECRET must be set"))?;

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_PORT)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            jwt_secret,
            jwt_expiration_hours: within(
                "JWT_EXPIRATION_HOURS",
                parse_or(&lookup, "JWT_EXPIRATION_HOURS", DEFAULT_TOKEN_HOURS)?,
                TOKEN_HOURS,
            )?,
            bcrypt_cost: within(
                "BCRYPT_COST",
                parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
                BCRYPT_COSTS,
            )?,
            cors_origin: lookup("CORS_ORIGIN").filter(|origin| !origin.is_empty()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| config_error(&format!("{} must be a number, got {:?}", key, raw))),
        None => Ok(default),
    }
}

fn within<T>(key: &str, value: T, range: RangeInclusive<T>) -> Result<T, AppError>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(config_error(&format!(
            "{} must be between {} and {}, got {}",
            key,
            range.start(),
            range.end(),
            value
        )))
    }
}

fn config_error(msg: &str) -> AppError {
    AppError::InternalServerError(format!("Configuration error: {}", msg))
}

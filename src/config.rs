use std::env;

use crate::errors::AppError;

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Runtime configuration, gathered once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Internal("DATABASE_URL must be set".to_string()))?;
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| AppError::Internal(format!("Invalid PORT: {}", e)))?;
        let pool_size = env::var("POOL_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .map_err(|e| AppError::Internal(format!("Invalid POOL_SIZE: {}", e)))?;
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                log::warn!("JWT_SECRET not set, using development default");
                "super_secret_key_change_me".to_string()
            }
        };
        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_SECS.to_string())
            .parse::<i64>()
            .map_err(|e| AppError::Internal(format!("Invalid TOKEN_TTL_SECS: {}", e)))?;

        Ok(Self {
            database_url,
            host,
            port,
            pool_size,
            jwt_secret,
            token_ttl_secs,
        })
    }
}

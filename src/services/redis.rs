//! Redis integration
//!
//! Holds the refresh-token revocation list. Keys are namespaced with the
//! configured prefix and expire together with the token they revoke.

use redis::{AsyncCommands, Client, RedisResult};
use tracing::{debug, warn};

use crate::config::RedisConfig;
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct RedisService {
    client: Client,
    prefix: String,
}

impl RedisService {
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        Ok(Self {
            client,
            prefix: config.prefix.clone(),
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::Connection> {
        Ok(self.client.get_async_connection().await?)
    }

    fn revoked_key(&self, jti: &str) -> String {
        format!("{}revoked:{}", self.prefix, jti)
    }

    /// Mark a token id as revoked for `ttl_seconds`
    pub async fn revoke_token(&self, jti: &str, ttl_seconds: u64) -> Result<()> {
        // An already-expired token needs no entry
        if ttl_seconds == 0 {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        let key = self.revoked_key(jti);
        let _: () = conn.set_ex(&key, 1u8, ttl_seconds).await?;

        debug!(key = %key, ttl = ttl_seconds, "Token revoked");
        Ok(())
    }

    pub async fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let key = self.revoked_key(jti);
        let exists: bool = conn.exists(&key).await?;

        debug!(key = %key, revoked = exists, "Revocation check");
        Ok(exists)
    }

    /// Health check for Redis connection
    pub async fn health_check(&self) -> Result<bool> {
        match self.get_connection().await {
            Ok(mut conn) => {
                let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
                match result {
                    Ok(response) => Ok(response == "PONG"),
                    Err(e) => {
                        warn!(error = %e, "Redis health check failed");
                        Ok(false)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Redis connection failed");
                Ok(false)
            }
        }
    }
}

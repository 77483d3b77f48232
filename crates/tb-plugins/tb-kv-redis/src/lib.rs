//! # tb-kv-redis
//!
//! Redis implementation of `KvStore` over a `deadpool-redis` pool.
//!
//! Every primitive maps onto a single Redis command, so atomicity comes
//! from the server: INCR for counters, SET NX for records, ZADD NX / XX GT
//! for ordered sets. ZREVRANGE returns equal scores in reverse member
//! order, which together with fixed-width members gives newest-thread-first
//! tie-breaking. Requires Redis 6.2 or later (ZADD GT).

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::{cmd, Cmd, FromRedisValue};
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use tb_core::error::{AppError, Result};
use tb_core::traits::{KvStore, Order};

pub struct RedisKvStore {
    pool: Pool,
    op_timeout: Duration,
}

fn unavailable(e: impl std::fmt::Display) -> AppError {
    AppError::StoreUnavailable(e.to_string())
}

impl RedisKvStore {
    /// Builds the pool. No connection is made until the first command;
    /// call [`KvStore::ping`] to fail fast at startup.
    pub fn connect(url: &str, pool_size: usize, op_timeout: Duration) -> Result<Self> {
        let mut cfg = Config::from_url(url);
        cfg.pool = Some(PoolConfig::new(pool_size));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| unavailable(format!("cannot build redis pool: {e}")))?;
        Ok(Self { pool, op_timeout })
    }

    /// Runs one command on a pooled connection, bounded by the operation timeout.
    async fn run<T: FromRedisValue + Send>(&self, command: &Cmd) -> Result<T> {
        let attempt = async {
            let mut conn = self.pool.get().await.map_err(unavailable)?;
            command.query_async(&mut conn).await.map_err(unavailable)
        };
        match tokio::time::timeout(self.op_timeout, attempt).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.op_timeout, "redis command timed out");
                Err(AppError::StoreUnavailable(format!(
                    "redis did not answer within {:?}",
                    self.op_timeout
                )))
            }
        }
    }
}

#[async_trait]
impl KvStore for RedisKvStore {
    async fn incr(&self, key: &str) -> Result<u64> {
        self.run(cmd("INCR").arg(key)).await
    }

    async fn set_nx(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        let reply: Option<String> = self.run(cmd("SET").arg(key).arg(value).arg("NX")).await?;
        Ok(reply.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.run(cmd("GET").arg(key)).await
    }

    async fn zadd_nx(&self, key: &str, member: &str, score: u64) -> Result<bool> {
        let added: i64 = self
            .run(cmd("ZADD").arg(key).arg("NX").arg(score).arg(member))
            .await?;
        Ok(added == 1)
    }

    async fn zadd_gt(&self, key: &str, member: &str, score: u64) -> Result<bool> {
        let changed: i64 = self
            .run(cmd("ZADD").arg(key).arg("XX").arg("GT").arg("CH").arg(score).arg(member))
            .await?;
        if changed == 1 {
            return Ok(true);
        }
        // Nothing changed: either the member is absent or a newer bump got there first.
        Ok(self.zscore(key, member).await?.is_some())
    }

    async fn zscore(&self, key: &str, member: &str) -> Result<Option<u64>> {
        let score: Option<f64> = self.run(cmd("ZSCORE").arg(key).arg(member)).await?;
        Ok(score.map(|s| s as u64))
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        self.run(cmd("ZCARD").arg(key)).await
    }

    async fn zrange(&self, key: &str, start: i64, stop: i64, order: Order) -> Result<Vec<String>> {
        let name = match order {
            Order::Ascending => "ZRANGE",
            Order::Descending => "ZREVRANGE",
        };
        self.run(cmd(name).arg(key).arg(start).arg(stop)).await
    }

    async fn ping(&self) -> Result<()> {
        let pong: String = self.run(&cmd("PING")).await?;
        if pong != "PONG" {
            return Err(AppError::StoreUnavailable(format!("unexpected PING reply {pong:?}")));
        }
        Ok(())
    }

    async fn close(&self) {
        self.pool.close();
        tracing::info!("redis pool closed");
    }
}

// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Testcontainers setup for Redis.
//!
//! Provides helpers to spin up Redis containers for integration tests.

#![allow(dead_code)] // Not every integration test uses every helper

use testcontainers::{clients::Cli, core::WaitFor, Container, GenericImage};

/// Create a vanilla Redis container.
///
/// Uses official redis:7 image. Waits for "Ready to accept connections".
pub fn redis_container(docker: &Cli) -> Container<'_, GenericImage> {
    let image = GenericImage::new("redis", "7-alpine")
        .with_exposed_port(6379)
        .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"));
    docker.run(image)
}

/// Get the Redis URL for a container (logical database 0).
pub fn redis_url(container: &Container<'_, GenericImage>) -> String {
    let port = container.get_host_port_ipv4(6379);
    format!("redis://127.0.0.1:{}/0", port)
}

/// A Redis instance playing one end of a migration.
pub struct TestInstance<'a> {
    #[allow(dead_code)] // Kept alive for container lifetime
    container: Container<'a, GenericImage>,
    pub url: String,
}

impl<'a> TestInstance<'a> {
    pub fn new(docker: &'a Cli) -> Self {
        let container = redis_container(docker);
        let url = redis_url(&container);
        Self { container, url }
    }

    async fn connection(&self) -> redis::aio::MultiplexedConnection {
        let client = redis::Client::open(self.url.as_str()).unwrap();
        client.get_multiplexed_async_connection().await.unwrap()
    }

    /// SET a string key, optionally with a TTL in milliseconds.
    pub async fn set(&self, key: &str, value: &str, ttl_ms: Option<u64>) {
        use redis::AsyncCommands;
        let mut conn = self.connection().await;
        let _: () = conn.set(key, value).await.unwrap();
        if let Some(ms) = ttl_ms {
            let _: bool = conn.pexpire(key, ms as i64).await.unwrap();
        }
    }

    /// GET a string key.
    pub async fn get(&self, key: &str) -> Option<String> {
        use redis::AsyncCommands;
        let mut conn = self.connection().await;
        conn.get(key).await.unwrap()
    }

    /// Raw PTTL reply for a key (-2 missing, -1 no expiry, n millis).
    pub async fn pttl(&self, key: &str) -> i64 {
        let mut conn = self.connection().await;
        redis::cmd("PTTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .unwrap()
    }

    /// Number of keys in the database.
    pub async fn dbsize(&self) -> u64 {
        let mut conn = self.connection().await;
        redis::cmd("DBSIZE").query_async(&mut conn).await.unwrap()
    }

    /// RPUSH list elements (for non-string type coverage).
    pub async fn rpush(&self, key: &str, values: &[&str]) {
        use redis::AsyncCommands;
        let mut conn = self.connection().await;
        let _: i64 = conn.rpush(key, values).await.unwrap();
    }

    /// LRANGE the whole list.
    pub async fn lrange(&self, key: &str) -> Vec<String> {
        use redis::AsyncCommands;
        let mut conn = self.connection().await;
        conn.lrange(key, 0, -1).await.unwrap()
    }
}

use std::time::Duration;

/// Runtime configuration, built from CLI arguments with env-var supplements.
#[derive(Clone, Debug)]
pub struct PizzeriaConfig {
    /// Durable datastore URL. `None` disables the durable tier and serves
    /// everything from the in-process map.
    pub redis_url: Option<String>,
    /// Key prefix for player records in the durable datastore.
    pub redis_prefix: String,
    /// Bound on each durable round trip before falling back.
    pub durable_timeout: Duration,
    /// Max request body size in bytes (None disables the limit).
    pub http_body_limit_bytes: Option<usize>,
}

impl Default for PizzeriaConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            redis_prefix: "player:".to_string(),
            durable_timeout: Duration::from_millis(3_000),
            http_body_limit_bytes: Some(16 * 1024),
        }
    }
}

use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_address: String,
    /// Countdown tick granularity in milliseconds. The tick step in seconds
    /// is derived from this, so decrements stay consistent with wall time.
    pub tick_interval_ms: u64,
    pub batch_size: usize,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", app_env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let bind_address = settings
            .get_string("server.bind_address")
            .or_else(|_| env::var("BIND_ADDRESS"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let tick_interval_ms = settings
            .get_int("engine.tick_interval_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .or_else(|| {
                env::var("TICK_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
            })
            .filter(|v| *v > 0)
            .unwrap_or(500);

        let batch_size = settings
            .get_int("engine.batch_size")
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .or_else(|| {
                env::var("BATCH_SIZE")
                    .ok()
                    .and_then(|v| v.parse::<usize>().ok())
            })
            .filter(|v| *v > 0)
            .unwrap_or(3);

        Ok(Config {
            bind_address,
            tick_interval_ms,
            batch_size,
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Seconds subtracted from `remaining` per tick.
    pub fn tick_step(&self) -> f32 {
        self.tick_interval_ms as f32 / 1000.0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
            tick_interval_ms: 500,
            batch_size: 3,
        }
    }
}

/// Session configuration
///
/// All tunables are carried in a value passed to `FeedSession::new`, so tests
/// can point a session at a loopback endpoint with short timeouts.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::info;

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub host: String,
    pub port: u16,
    /// Socket read chunk size in bytes.
    pub buffer_size: usize,
    /// Bounded wait for data on a connected socket. Must be non-zero.
    pub read_timeout: Duration,
    /// Total stream-all attempts before the session fails.
    pub max_stream_retries: u32,
    /// Total attempts per missing sequence before it is given up on.
    pub max_resend_retries: u32,
    /// Pause between attempts, both phases.
    pub retry_delay: Duration,
    /// Destination for the exported packet document.
    pub output_path: PathBuf,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            buffer_size: 1024,
            read_timeout: Duration::from_secs(5),
            max_stream_retries: 5,
            max_resend_retries: 5,
            retry_delay: Duration::from_secs(3),
            output_path: PathBuf::from("output_packets.json"),
        }
    }
}

impl FeedConfig {
    /// Load the configuration from `FEED_*` environment variables, falling
    /// back to the defaults for anything absent or unparsable.
    pub fn from_env() -> Self {
        let defaults = FeedConfig::default();

        let config = FeedConfig {
            host: env::var("FEED_HOST").unwrap_or(defaults.host),
            port: parse_var("FEED_PORT").unwrap_or(defaults.port),
            buffer_size: parse_var("FEED_BUFFER_SIZE").unwrap_or(defaults.buffer_size),
            read_timeout: parse_var("FEED_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.read_timeout),
            max_stream_retries: parse_var("FEED_MAX_RETRIES")
                .unwrap_or(defaults.max_stream_retries),
            max_resend_retries: parse_var("FEED_RESEND_RETRIES")
                .unwrap_or(defaults.max_resend_retries),
            retry_delay: parse_var("FEED_RETRY_DELAY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.retry_delay),
            output_path: env::var("FEED_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
        };

        info!(
            "config: server {}:{}, timeout {:?}, {} stream attempts, {} resend attempts",
            config.host,
            config.port,
            config.read_timeout,
            config.max_stream_retries,
            config.max_resend_retries
        );
        config
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

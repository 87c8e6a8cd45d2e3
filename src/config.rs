//! Runtime configuration.
//!
//! Values come from `Config::default()` and can be overridden through the
//! environment (a `.env` file is loaded first when present):
//!
//! | Variable                       | Default                 |
//! |--------------------------------|-------------------------|
//! | `ASYNC_RACE_BASE_URL`          | `http://127.0.0.1:3000` |
//! | `ASYNC_RACE_DRIVE_TIMEOUT_MS`  | `5000`                  |
//! | `ASYNC_RACE_GARAGE_PAGE_SIZE`  | `7`                     |
//! | `ASYNC_RACE_WINNERS_PAGE_SIZE` | `10`                    |
//! | `ASYNC_RACE_FRAME_MS`          | `16`                    |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_DRIVE_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_GARAGE_PAGE_SIZE: usize = 7;
pub const DEFAULT_WINNERS_PAGE_SIZE: usize = 10;
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root of the REST backend, without trailing slash.
    pub base_url: String,
    /// Client-side ceiling for a single `drive` call.
    pub drive_timeout: Duration,
    pub garage_page_size: usize,
    pub winners_page_size: usize,
    /// Tick of the frame-driven animator.
    pub frame_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            drive_timeout: DEFAULT_DRIVE_TIMEOUT,
            garage_page_size: DEFAULT_GARAGE_PAGE_SIZE,
            winners_page_size: DEFAULT_WINNERS_PAGE_SIZE,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl Config {
    /// Defaults overridden by `ASYNC_RACE_*` variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparsable values keep
    /// their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = lookup("ASYNC_RACE_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        Self {
            base_url,
            drive_timeout: Duration::from_millis(parse_or(
                &lookup,
                "ASYNC_RACE_DRIVE_TIMEOUT_MS",
                defaults.drive_timeout.as_millis() as u64,
            )),
            garage_page_size: parse_or(
                &lookup,
                "ASYNC_RACE_GARAGE_PAGE_SIZE",
                defaults.garage_page_size,
            ),
            winners_page_size: parse_or(
                &lookup,
                "ASYNC_RACE_WINNERS_PAGE_SIZE",
                defaults.winners_page_size,
            ),
            frame_interval: Duration::from_millis(parse_or(
                &lookup,
                "ASYNC_RACE_FRAME_MS",
                defaults.frame_interval.as_millis() as u64,
            )),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_drive_timeout(mut self, timeout: Duration) -> Self {
        self.drive_timeout = timeout;
        self
    }
}

fn parse_or<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring {}={:?}: not a valid value", key, raw);
                default
            }
        },
        None => default,
    }
}

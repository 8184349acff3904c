//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default interval between sampling ticks
pub const DEFAULT_PING_INTERVAL_MS: u64 = 15_000;

/// Small resource used by the latency probe
pub const DEFAULT_PROBE_URL: &str = "https://www.gstatic.com/generate_204";

/// Upper bound on a single latency probe
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 10_000;

/// Events kept by the log panel
pub const DEFAULT_LOG_CAPACITY: usize = 200;

/// Key under which the language preference is stored
pub const LANG_STORAGE_KEY: &str = "app_lang";

/// Directory (under the home directory) holding settings and preferences
pub const CONFIG_DIR_NAME: &str = ".educhat";

/// Log file written by the tracing appender
pub const LOG_FILE_NAME: &str = "educhat.log";

/// Application name
pub const APP_NAME: &str = "EduChat";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

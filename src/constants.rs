//! Constants used throughout the crate
//!
//! Defaults for paging, configuration lookup and logging live here so the
//! library and the binary agree on them.

// Paging
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 50;

// Sorting
pub const DEFAULT_EMPLOYEE_ORDER_BY: &str = "name";

// Configuration lookup
pub const CONFIG_FILE_NAME: &str = "company_employees.toml";
pub const CONFIG_DIR_NAME: &str = "company-employees";
pub const CONFIG_DIR_FILE_NAME: &str = "config.toml";

// Database
pub const DEFAULT_DATABASE_URL: &str = "sqlite://company_employees.db?mode=rwc";
pub const IN_MEMORY_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 8;

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

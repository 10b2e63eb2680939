//! Company Employees - data-access layer for a company/employee catalogue
//!
//! This library provides generic SeaORM-backed repositories coordinated by a
//! unit of work, plus the query shaping used by the employee listing:
//! age-range filtering, name search, and sorting by a client supplied field
//! list.
//!
//! # Modules
//!
//! * [`config`] - Application configuration management
//! * [`entities`] - SeaORM entity models
//! * [`repositories`] - Repository base, entity repositories and unit of work
//! * [`query`] - Sort-expression builder, employee pipeline and paging
//! * [`storage`] - Database connection and schema setup

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Error types for reads and commits
pub mod error;

/// Logging setup on top of the `log` facade
pub mod logger;

/// Query shaping: sorting, filtering and paging
pub mod query;

/// Repository layer for database operations
pub mod repositories;

/// Database connection and schema management
pub mod storage;

// Re-export entity models for convenient access
pub use entities::{company, employee};
pub use error::{Error, PersistenceError, Result};
pub use repositories::RepositoryManager;

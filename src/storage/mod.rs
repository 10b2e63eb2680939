//! Database connection and schema management
//!
//! This module provides:
//! - Connection setup from configuration (file-backed or in-memory SQLite)
//! - Schema creation from the entity definitions
//! - Sample data for a fresh database

pub mod db;
pub mod seed;

pub use db::Storage;

//! Repository layer for database operations.
//!
//! [`RepositoryBase`] gives every entity the same deferred, optionally
//! change-tracked queries and staged writes. The entity repositories build on
//! it, and [`RepositoryManager`] ties them to one shared
//! [`RepositoryContext`] that commits as a unit.

pub mod base;
pub mod company;
pub mod context;
pub mod employee;
pub mod manager;

pub use base::{Query, RepositoryBase};
pub use company::CompanyRepository;
pub use context::RepositoryContext;
pub use employee::EmployeeRepository;
pub use manager::RepositoryManager;

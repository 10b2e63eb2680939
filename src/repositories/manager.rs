//! Unit of work over the entity repositories.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use sea_orm::DatabaseConnection;

use super::context::RepositoryContext;
use super::{CompanyRepository, EmployeeRepository};
use crate::error::PersistenceError;

/// Owns one [`RepositoryContext`] for a single logical operation (one
/// request, one CLI command) and hands out its repositories.
///
/// Repositories are created on first access and reused afterwards; all of
/// them stage into the same context, and [`save`](Self::save) commits
/// everything staged so far as one transaction. A manager must not be shared
/// between concurrent operations.
pub struct RepositoryManager {
    context: Arc<RepositoryContext>,
    company: OnceCell<CompanyRepository>,
    employee: OnceCell<EmployeeRepository>,
}

impl RepositoryManager {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            context: Arc::new(RepositoryContext::new(conn)),
            company: OnceCell::new(),
            employee: OnceCell::new(),
        }
    }

    pub fn company(&self) -> &CompanyRepository {
        self.company.get_or_init(|| {
            log::trace!("creating company repository");
            CompanyRepository::new(Arc::clone(&self.context))
        })
    }

    pub fn employee(&self) -> &EmployeeRepository {
        self.employee.get_or_init(|| {
            log::trace!("creating employee repository");
            EmployeeRepository::new(Arc::clone(&self.context))
        })
    }

    pub fn context(&self) -> &RepositoryContext {
        &self.context
    }

    /// Commit every staged change of this unit of work atomically.
    pub async fn save(&self) -> Result<usize, PersistenceError> {
        self.context.commit().await
    }
}

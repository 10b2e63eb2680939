//! Employee repository.

use std::sync::Arc;

use sea_orm::ColumnTrait;
use uuid::Uuid;

use super::base::{Query, RepositoryBase};
use super::context::RepositoryContext;
use crate::entities::employee;
use crate::error::Result;
use crate::query::{EmployeeParameters, EmployeeQueryExt, PagedList, SortDirection};

/// Repository for employee reads and staged writes.
///
/// Every read is scoped to one company.
pub struct EmployeeRepository {
    base: RepositoryBase<employee::Entity>,
}

impl EmployeeRepository {
    pub(crate) fn new(context: Arc<RepositoryContext>) -> Self {
        Self {
            base: RepositoryBase::new(context),
        }
    }

    fn for_company(&self, company_id: Uuid, track_changes: bool) -> Query<'_, employee::Entity> {
        self.base
            .find_by_condition(employee::Column::CompanyId.eq(company_id), track_changes)
    }

    /// Get all employees of a company ordered by name.
    pub async fn get_all_for_company(&self, company_id: Uuid, track_changes: bool) -> Result<Vec<employee::Model>> {
        self.for_company(company_id, track_changes)
            .order_by(employee::Column::Name, SortDirection::Asc)
            .all()
            .await
    }

    /// Get one page of a company's employees, filtered, searched and sorted
    /// according to `parameters`.
    pub async fn get_employees(
        &self,
        company_id: Uuid,
        parameters: &EmployeeParameters,
        track_changes: bool,
    ) -> Result<PagedList<employee::Model>> {
        self.for_company(company_id, track_changes)
            .shape(parameters)
            .to_paged_list(parameters.page_number, parameters.effective_page_size())
            .await
    }

    /// Get an employee by id, only if it belongs to `company_id`.
    pub async fn get_one(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        track_changes: bool,
    ) -> Result<Option<employee::Model>> {
        self.for_company(company_id, track_changes)
            .filter(employee::Column::Id.eq(employee_id))
            .one()
            .await
    }

    /// Attach `employee` to `company_id` and stage the insert.
    pub fn add(&self, company_id: Uuid, employee: &mut employee::Model) {
        employee.company_id = company_id;
        self.base.create(employee);
    }

    pub fn update(&self, employee: &employee::Model) {
        self.base.update(employee);
    }

    pub fn remove(&self, employee: &employee::Model) {
        self.base.delete(employee);
    }
}

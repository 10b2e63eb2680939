//! Company repository.

use std::sync::Arc;

use sea_orm::ColumnTrait;
use uuid::Uuid;

use super::base::RepositoryBase;
use super::context::RepositoryContext;
use crate::entities::company;
use crate::error::Result;
use crate::query::SortDirection;

/// Repository for company reads and staged writes.
pub struct CompanyRepository {
    base: RepositoryBase<company::Entity>,
}

impl CompanyRepository {
    pub(crate) fn new(context: Arc<RepositoryContext>) -> Self {
        Self {
            base: RepositoryBase::new(context),
        }
    }

    /// Get all companies ordered by name.
    pub async fn get_all(&self, track_changes: bool) -> Result<Vec<company::Model>> {
        self.base
            .find_all(track_changes)
            .order_by(company::Column::Name, SortDirection::Asc)
            .all()
            .await
    }

    /// Get a single company by id.
    pub async fn get_by_id(&self, id: Uuid, track_changes: bool) -> Result<Option<company::Model>> {
        self.base
            .find_by_condition(company::Column::Id.eq(id), track_changes)
            .one()
            .await
    }

    /// Get the companies whose id is in `ids`, in no particular order.
    ///
    /// Unknown ids are simply absent from the result; compare lengths to find
    /// out whether every id was valid.
    pub async fn get_by_ids<I>(&self, ids: I, track_changes: bool) -> Result<Vec<company::Model>>
    where
        I: IntoIterator<Item = Uuid>,
    {
        let ids: Vec<Uuid> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_by_condition(company::Column::Id.is_in(ids), track_changes)
            .all()
            .await
    }

    pub fn add(&self, company: &company::Model) {
        self.base.create(company);
    }

    pub fn update(&self, company: &company::Model) {
        self.base.update(company);
    }

    /// Stage deletion. The store cascades to the company's employees.
    pub fn remove(&self, company: &company::Model) {
        self.base.delete(company);
    }
}

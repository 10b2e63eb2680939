//! Change-tracking query base shared by the entity repositories.

use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::sea_query::IntoCondition;
use sea_orm::{
    DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Statement,
};

use super::context::RepositoryContext;
use crate::error::Result;
use crate::query::paging::PagedList;
use crate::query::sort::SortDirection;
use crate::query::ShapeSelect;

/// Largest OFFSET/LIMIT SQLite accepts; both are bound as signed 64-bit.
const MAX_BOUND: u64 = i64::MAX as u64;

/// A deferred query over `E`.
///
/// Filters and orderings only extend the underlying `SELECT`; the database is
/// not touched until one of the terminal methods (`all`, `one`, `count`,
/// `to_paged_list`) runs. Rows materialized by a tracking query are recorded
/// in the context's identity map.
#[derive(Clone)]
pub struct Query<'a, E: EntityTrait> {
    context: &'a RepositoryContext,
    select: Select<E>,
    track_changes: bool,
}

impl<'a, E: EntityTrait> Query<'a, E> {
    fn new(context: &'a RepositoryContext, track_changes: bool) -> Self {
        Self {
            context,
            select: E::find(),
            track_changes,
        }
    }

    pub fn filter<F: IntoCondition>(self, condition: F) -> Self {
        self.map_select(|select| select.filter(condition))
    }

    pub fn order_by(self, column: E::Column, direction: SortDirection) -> Self {
        self.map_select(|select| select.order_by(column, direction.into()))
    }

    pub fn tracks_changes(&self) -> bool {
        self.track_changes
    }

    /// SQL the query would run.
    pub fn build(&self, backend: DbBackend) -> Statement {
        self.select.build(backend)
    }

    pub fn into_select(self) -> Select<E> {
        self.select
    }

    pub async fn all(self) -> Result<Vec<E::Model>> {
        let models = self.select.all(self.context.connection()).await?;
        if self.track_changes {
            self.context.track::<E>(&models);
        }
        Ok(models)
    }

    /// The first matching row, if any.
    pub async fn one(self) -> Result<Option<E::Model>> {
        let model = self.select.one(self.context.connection()).await?;
        if let (true, Some(model)) = (self.track_changes, &model) {
            self.context.track::<E>(std::slice::from_ref(model));
        }
        Ok(model)
    }

    pub async fn count(self) -> Result<u64>
    where
        E::Model: Sync,
    {
        Ok(self.select.count(self.context.connection()).await?)
    }

    /// Materialize one page (1-based) together with its paging metadata.
    pub async fn to_paged_list(self, page_number: u64, page_size: u64) -> Result<PagedList<E::Model>>
    where
        E::Model: Sync,
    {
        let page_number = page_number.max(1);
        let page_size = page_size.max(1);
        let conn = self.context.connection();

        let total_count = self.select.clone().count(conn).await?;
        let items = self
            .select
            .offset(page_offset(page_number, page_size))
            .limit(page_size.min(MAX_BOUND))
            .all(conn)
            .await?;
        if self.track_changes {
            self.context.track::<E>(&items);
        }

        Ok(PagedList::new(items, total_count, page_number, page_size))
    }
}

impl<E: EntityTrait> ShapeSelect<E> for Query<'_, E> {
    fn map_select<F>(self, f: F) -> Self
    where
        F: FnOnce(Select<E>) -> Select<E>,
    {
        Self {
            select: f(self.select),
            ..self
        }
    }
}

/// Generic read/stage operations for one entity type.
///
/// Writes only stage changes on the shared [`RepositoryContext`]; nothing is
/// durable until the owning unit of work commits.
pub struct RepositoryBase<E: EntityTrait> {
    context: Arc<RepositoryContext>,
    _entity: PhantomData<E>,
}

impl<E: EntityTrait> RepositoryBase<E> {
    pub(crate) fn new(context: Arc<RepositoryContext>) -> Self {
        Self {
            context,
            _entity: PhantomData,
        }
    }

    pub fn context(&self) -> &RepositoryContext {
        &self.context
    }

    /// Every row of `E`.
    ///
    /// With `track_changes` the loaded rows are snapshotted in the context.
    /// Models are plain values, so mutating one does not stage anything by
    /// itself: pass it to [`update`](Self::update) before the unit of work
    /// commits, and only the columns that differ from the snapshot are written.
    pub fn find_all(&self, track_changes: bool) -> Query<'_, E> {
        Query::new(&self.context, track_changes)
    }

    /// Rows of `E` matching `condition`.
    pub fn find_by_condition<F: IntoCondition>(&self, condition: F, track_changes: bool) -> Query<'_, E> {
        self.find_all(track_changes).filter(condition)
    }

    pub fn create(&self, model: &E::Model) {
        self.context.stage_insert::<E>(model);
    }

    pub fn update(&self, model: &E::Model) {
        self.context.stage_update::<E>(model);
    }

    pub fn delete(&self, model: &E::Model) {
        self.context.stage_delete::<E>(model);
    }
}

/// Rows skipped before 1-based page `page_number`, capped at [`MAX_BOUND`].
fn page_offset(page_number: u64, page_size: u64) -> u64 {
    page_number.saturating_sub(1).saturating_mul(page_size).min(MAX_BOUND)
}

//! Query shaping: dynamic sorting, the employee listing pipeline and paging.

pub mod employee;
pub mod paging;
pub mod sort;

use sea_orm::{EntityTrait, Select};

pub use employee::{EmployeeParameters, EmployeeQueryExt};
pub use paging::{MetaData, PagedList};
pub use sort::{SortClause, SortDirection, SortKey, SortableFields};

/// Anything that can be re-shaped by a function over its `SELECT`.
///
/// Implemented for sea-orm's own [`Select`] and for the repositories'
/// [`Query`](crate::repositories::Query), so the shaping stages compose over
/// either one.
pub trait ShapeSelect<E: EntityTrait>: Sized {
    fn map_select<F>(self, f: F) -> Self
    where
        F: FnOnce(Select<E>) -> Select<E>;
}

impl<E: EntityTrait> ShapeSelect<E> for Select<E> {
    fn map_select<F>(self, f: F) -> Self
    where
        F: FnOnce(Select<E>) -> Select<E>,
    {
        f(self)
    }
}

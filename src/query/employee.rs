//! Employee listing pipeline: age range, name search, then sort.

use once_cell::sync::Lazy;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ColumnTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use super::sort::SortableFields;
use super::ShapeSelect;
use crate::constants::{DEFAULT_EMPLOYEE_ORDER_BY, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::entities::employee;

static EMPLOYEE_FIELDS: Lazy<SortableFields<employee::Entity>> = Lazy::new(SortableFields::new);

const GLOB_SPECIAL: [char; 3] = ['*', '?', '['];

/// Query-string parameters of the employee list endpoint
/// (`?pageNumber=2&pageSize=20&minAge=26&maxAge=40&searchTerm=ja&orderBy=name desc,age`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmployeeParameters {
    pub page_number: u64,
    pub page_size: u64,
    pub min_age: u32,
    pub max_age: u32,
    pub search_term: Option<String>,
    pub order_by: Option<String>,
}

impl Default for EmployeeParameters {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            min_age: 0,
            max_age: u32::MAX,
            search_term: None,
            order_by: Some(DEFAULT_EMPLOYEE_ORDER_BY.to_string()),
        }
    }
}

impl EmployeeParameters {
    /// Requested page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_page_size(&self) -> u64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// `false` when `min_age > max_age`. The pipeline does not reject such a
    /// range, it simply matches nobody.
    pub fn valid_age_range(&self) -> bool {
        self.max_age >= self.min_age
    }
}

/// Shaping stages for employee queries.
///
/// Each stage only extends the query; applying them one by one is the same as
/// [`shape`](EmployeeQueryExt::shape).
pub trait EmployeeQueryExt: ShapeSelect<employee::Entity> {
    /// Keep employees with `min_age <= age <= max_age`.
    fn filter_by_age(self, min_age: u32, max_age: u32) -> Self {
        self.map_select(|select| {
            select.filter(employee::Column::Age.between(i64::from(min_age), i64::from(max_age)))
        })
    }

    /// Keep employees whose name contains `search_term`, ignoring case
    /// (including non-ASCII letters). A blank or missing term leaves the
    /// query untouched.
    fn search_by_name(self, search_term: Option<&str>) -> Self {
        let pattern = match search_term.map(str::trim) {
            Some(term) if !term.is_empty() => contains_pattern(term),
            _ => return self,
        };

        self.map_select(move |select| {
            select.filter(Expr::cust_with_exprs(
                "$1 GLOB $2",
                [
                    SimpleExpr::from(Expr::col((employee::Entity, employee::Column::Name))),
                    SimpleExpr::from(Expr::val(pattern)),
                ],
            ))
        })
    }

    /// Order by a client field list; falls back to name ascending when the
    /// list is missing or names no known field.
    fn sort(self, order_by: Option<&str>) -> Self {
        let clause = order_by.map(|order_by| EMPLOYEE_FIELDS.parse(order_by)).unwrap_or_default();
        if !clause.discarded().is_empty() {
            log::warn!("ignoring unknown employee sort field(s): {}", clause.discarded().join(", "));
        }

        if clause.is_empty() {
            return self.map_select(|select| select.order_by_asc(employee::Column::Name));
        }
        EMPLOYEE_FIELDS.apply(self, &clause)
    }

    /// Range filter, search, then sort.
    fn shape(self, parameters: &EmployeeParameters) -> Self {
        self.filter_by_age(parameters.min_age, parameters.max_age)
            .search_by_name(parameters.search_term.as_deref())
            .sort(parameters.order_by.as_deref())
    }
}

impl<T: ShapeSelect<employee::Entity>> EmployeeQueryExt for T {}

/// SQLite `GLOB` pattern matching names that contain `term` in any case.
///
/// `GLOB` compares code points exactly, so every cased character becomes a set
/// of its single-character case variants (`é` -> `[éÉ]`) and glob
/// metacharacters are wrapped in a set to match literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() * 4 + 2);
    pattern.push('*');
    for c in term.chars() {
        let mut variants = vec![c];
        for folded in [single_char(c.to_lowercase()), single_char(c.to_uppercase())]
            .into_iter()
            .flatten()
        {
            if !variants.contains(&folded) {
                variants.push(folded);
            }
        }

        if variants.len() > 1 || GLOB_SPECIAL.contains(&c) {
            pattern.push('[');
            pattern.extend(variants);
            pattern.push(']');
        } else {
            pattern.push(c);
        }
    }
    pattern.push('*');
    pattern
}

fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("Ab1"), "*[Aa][bB]1*");
        assert_eq!(contains_pattern("émile"), "*[éÉ][mM][iI][lL][eE]*");
        assert_eq!(contains_pattern("50%_off?*["), "*50%_[oO][fF][fF][?][*][[]*");
        // Multi-character foldings are not expanded.
        assert_eq!(contains_pattern("ß"), "*ß*");
    }

    #[test]
    fn test_default_parameters() {
        let parameters = EmployeeParameters::default();
        assert_eq!(parameters.page_number, 1);
        assert_eq!(parameters.effective_page_size(), DEFAULT_PAGE_SIZE);
        assert!(parameters.valid_age_range());
        assert_eq!(parameters.order_by.as_deref(), Some("name"));
    }

    #[test]
    fn test_page_size_is_clamped() {
        let parameters = EmployeeParameters {
            page_size: 500,
            ..Default::default()
        };
        assert_eq!(parameters.effective_page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_parameters_from_query_string_names() {
        let parameters: EmployeeParameters =
            serde_json::from_str(r#"{"minAge": 50, "maxAge": 20, "orderBy": "age desc"}"#).unwrap();
        assert!(!parameters.valid_age_range());
        assert_eq!(parameters.page_number, 1);
        assert_eq!(parameters.order_by.as_deref(), Some("age desc"));
    }
}

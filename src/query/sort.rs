//! Dynamic sort-expression builder.
//!
//! Turns a client supplied field list such as `"name desc, age"` into an
//! ordering over an entity's columns. Field names are resolved at runtime
//! against the entity's column table, never against compile-time names.

use std::fmt;

use sea_orm::{EntityTrait, IdenStatic, Iterable, Order, QueryOrder};
use serde::{Deserialize, Serialize};

use super::ShapeSelect;

const DESCENDING_KEYWORD: &str = "desc";

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// One resolved ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Canonical column name.
    pub field: String,
    pub direction: SortDirection,
}

/// Result of parsing a sort string: keys in the order supplied, plus the
/// tokens that named no known field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortClause {
    keys: Vec<SortKey>,
    discarded: Vec<String>,
}

impl SortClause {
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Tokens dropped because they matched no field.
    pub fn discarded(&self) -> &[String] {
        &self.discarded
    }

    /// No usable ordering survived; callers apply their default.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for SortClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, key) in self.keys.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&key.field)?;
            if key.direction == SortDirection::Desc {
                write!(f, " {}", DESCENDING_KEYWORD)?;
            }
        }
        Ok(())
    }
}

/// The sortable fields of `E`, taken from its column enumeration.
pub struct SortableFields<E: EntityTrait> {
    columns: Vec<E::Column>,
}

impl<E: EntityTrait> SortableFields<E> {
    pub fn new() -> Self {
        Self {
            columns: E::Column::iter().collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|column| column.as_str())
    }

    /// Column named `name`, ignoring case and underscores.
    pub fn resolve(&self, name: &str) -> Option<E::Column> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        self.columns
            .iter()
            .copied()
            .find(|column| normalize(column.as_str()) == wanted)
    }

    /// Parse a comma separated field list. Each token is a field name,
    /// optionally followed by `desc` (any case) for descending order.
    pub fn parse(&self, order_by: &str) -> SortClause {
        let mut clause = SortClause::default();

        for token in order_by.split(',').map(str::trim).filter(|token| !token.is_empty()) {
            let mut words = token.split_whitespace();
            let Some(name) = words.next() else {
                continue;
            };
            let direction = if words
                .last()
                .is_some_and(|word| word.eq_ignore_ascii_case(DESCENDING_KEYWORD))
            {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };

            match self.resolve(name) {
                Some(column) => clause.keys.push(SortKey {
                    field: column.as_str().to_owned(),
                    direction,
                }),
                None => clause.discarded.push(token.to_owned()),
            }
        }

        clause
    }

    /// Append the clause's keys to `query`, first key primary.
    pub fn apply<Q: ShapeSelect<E>>(&self, query: Q, clause: &SortClause) -> Q {
        clause.keys().iter().fold(query, |query, key| match self.resolve(&key.field) {
            Some(column) => query.map_select(|select| select.order_by(column, key.direction.into())),
            None => query,
        })
    }
}

impl<E: EntityTrait> Default for SortableFields<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

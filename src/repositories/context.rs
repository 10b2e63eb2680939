//! Persistence context shared by every repository of one unit of work.
//!
//! Writes are staged as built SQL statements and only reach the database when
//! [`RepositoryContext::commit`] runs them inside a single transaction. Reads
//! issued with change tracking enabled record a snapshot of the loaded row so a
//! later update only writes the columns that actually changed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, IdenStatic,
    Iterable, ModelTrait, PrimaryKeyToColumn, QueryTrait, Statement, TransactionTrait, Value,
};

use crate::error::{ChangeKind, PersistenceError};

/// Identity of a tracked row: table plus rendered primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TrackingKey {
    table: String,
    key: String,
}

impl TrackingKey {
    fn of<E: EntityTrait>(model: &E::Model) -> Self {
        let key = E::PrimaryKey::iter()
            .map(|pk| format!("{:?}", model.get(pk.into_column())))
            .collect::<Vec<_>>()
            .join("/");
        Self {
            table: table_name::<E>(),
            key,
        }
    }
}

/// Column values of a row in `E::Column::iter()` order.
type Snapshot = Vec<Value>;

struct PendingChange {
    kind: ChangeKind,
    table: String,
    statement: Statement,
    key: TrackingKey,
    /// Row state once committed; `None` when the row is gone.
    after: Option<Snapshot>,
}

/// Rows every staged statement targets.
const EXPECTED_ROWS: u64 = 1;

impl PendingChange {
    fn accepts(&self, affected: u64) -> bool {
        match self.kind {
            ChangeKind::Insert => affected >= EXPECTED_ROWS,
            ChangeKind::Update | ChangeKind::Delete => affected == EXPECTED_ROWS,
        }
    }
}

#[derive(Default)]
struct ChangeSet {
    pending: Vec<PendingChange>,
    tracked: HashMap<TrackingKey, Snapshot>,
}

/// Connection handle plus the staged, not yet committed, changes.
///
/// A context belongs to exactly one unit of work and must not be shared
/// between concurrent callers.
pub struct RepositoryContext {
    conn: DatabaseConnection,
    changes: Mutex<ChangeSet>,
}

impl RepositoryContext {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            changes: Mutex::new(ChangeSet::default()),
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    fn changes(&self) -> MutexGuard<'_, ChangeSet> {
        self.changes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the original values of rows loaded with tracking enabled.
    ///
    /// A row that is already tracked keeps its first snapshot.
    pub(crate) fn track<E: EntityTrait>(&self, models: &[E::Model]) {
        let mut changes = self.changes();
        for model in models {
            changes
                .tracked
                .entry(TrackingKey::of::<E>(model))
                .or_insert_with(|| snapshot::<E>(model));
        }
    }

    /// Whether `model`'s row is in the identity map.
    pub fn is_tracked<E: EntityTrait>(&self, model: &E::Model) -> bool {
        self.changes().tracked.contains_key(&TrackingKey::of::<E>(model))
    }

    /// Number of staged changes waiting for [`commit`](Self::commit).
    pub fn pending_changes(&self) -> usize {
        self.changes().pending.len()
    }

    pub fn has_changes(&self) -> bool {
        self.pending_changes() > 0
    }

    pub(crate) fn stage_insert<E: EntityTrait>(&self, model: &E::Model) {
        let columns: Vec<E::Column> = E::Column::iter().collect();
        let statement = E::insert(active_model::<E>(model, &columns)).build(self.conn.get_database_backend());
        self.push::<E>(ChangeKind::Insert, statement, model, Some(snapshot::<E>(model)));
    }

    /// Stage an update of `model`.
    ///
    /// Tracked rows only write the columns that differ from their snapshot and
    /// stage nothing when unchanged. Untracked rows write every non-key column.
    pub(crate) fn stage_update<E: EntityTrait>(&self, model: &E::Model) {
        let key = TrackingKey::of::<E>(model);
        let changed: Vec<E::Column> = {
            let changes = self.changes();
            let original = changes.tracked.get(&key);
            let changed = E::Column::iter()
                .enumerate()
                .filter(|(_, column)| !is_primary_key::<E>(column))
                .filter(|(index, column)| {
                    original
                        .and_then(|values| values.get(*index))
                        .map_or(true, |old| *old != model.get(*column))
                })
                .map(|(_, column)| column)
                .collect();
            changed
        };

        if changed.is_empty() {
            log::debug!("update of {} {} skipped, nothing changed", key.table, key.key);
            return;
        }

        let mut columns: Vec<E::Column> = E::PrimaryKey::iter().map(|pk| pk.into_column()).collect();
        columns.extend(changed);
        let statement = E::update(active_model::<E>(model, &columns)).build(self.conn.get_database_backend());
        self.push::<E>(ChangeKind::Update, statement, model, Some(snapshot::<E>(model)));
    }

    pub(crate) fn stage_delete<E: EntityTrait>(&self, model: &E::Model) {
        let columns: Vec<E::Column> = E::PrimaryKey::iter().map(|pk| pk.into_column()).collect();
        let statement = E::delete(active_model::<E>(model, &columns)).build(self.conn.get_database_backend());
        self.push::<E>(ChangeKind::Delete, statement, model, None);
    }

    fn push<E: EntityTrait>(&self, kind: ChangeKind, statement: Statement, model: &E::Model, after: Option<Snapshot>) {
        let key = TrackingKey::of::<E>(model);
        log::debug!("staged {} on {} {}", kind, key.table, key.key);
        self.changes().pending.push(PendingChange {
            kind,
            table: key.table.clone(),
            statement,
            key,
            after,
        });
    }

    /// Apply every staged change in one transaction.
    ///
    /// Returns the number of changes written. On failure the transaction is
    /// rolled back, nothing is durable and the staged batch is discarded.
    pub async fn commit(&self) -> Result<usize, PersistenceError> {
        let pending = std::mem::take(&mut self.changes().pending);
        if pending.is_empty() {
            return Ok(0);
        }

        let txn = self.conn.begin().await.map_err(PersistenceError::Transaction)?;
        if let Err(err) = apply(&txn, &pending).await {
            log::warn!("rolling back {} staged change(s): {}", pending.len(), err);
            if let Err(rollback) = txn.rollback().await {
                log::error!("rollback failed: {}", rollback);
            }
            return Err(err);
        }
        txn.commit().await.map_err(PersistenceError::Transaction)?;

        let written = pending.len();
        let mut changes = self.changes();
        for change in pending {
            match change.after {
                Some(values) => {
                    changes.tracked.insert(change.key, values);
                }
                None => {
                    changes.tracked.remove(&change.key);
                }
            }
        }
        log::debug!("committed {} change(s)", written);
        Ok(written)
    }
}

impl Drop for RepositoryContext {
    fn drop(&mut self) {
        let pending = self.changes().pending.len();
        if pending > 0 {
            log::warn!("unit of work dropped with {} uncommitted change(s)", pending);
        }
    }
}

async fn apply(txn: &DatabaseTransaction, pending: &[PendingChange]) -> Result<(), PersistenceError> {
    for change in pending {
        let result = txn
            .execute(change.statement.clone())
            .await
            .map_err(|source| PersistenceError::Rejected {
                kind: change.kind,
                table: change.table.clone(),
                source,
            })?;

        let affected = result.rows_affected();
        if !change.accepts(affected) {
            return Err(PersistenceError::RowCount {
                kind: change.kind,
                table: change.table.clone(),
                affected,
                expected: EXPECTED_ROWS,
            });
        }
    }
    Ok(())
}

fn table_name<E: EntityTrait>() -> String {
    E::default().table_name().to_owned()
}

fn snapshot<E: EntityTrait>(model: &E::Model) -> Snapshot {
    E::Column::iter().map(|column| model.get(column)).collect()
}

fn is_primary_key<E: EntityTrait>(column: &E::Column) -> bool {
    E::PrimaryKey::iter().any(|pk| pk.into_column().as_str() == column.as_str())
}

/// Active model with only `columns` set from `model`.
fn active_model<E: EntityTrait>(model: &E::Model, columns: &[E::Column]) -> E::ActiveModel {
    let mut active = <E::ActiveModel as ActiveModelTrait>::default();
    for column in columns {
        active.set(*column, model.get(*column));
    }
    active
}

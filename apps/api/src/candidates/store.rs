//! In-memory candidate table.
//!
//! The store owns every record and the identifier counter. Callers only ever
//! receive clones. Identifiers start at 1, increase strictly and are never
//! reused, so iterating the `BTreeMap` by key yields insertion order.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::candidates::filter::CandidateFilter;
use crate::models::candidate::{CandidateFields, CandidatePatch, CandidateRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("timed out waiting for the candidate table lock")]
    LockTimeout,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default)]
struct Table {
    records: BTreeMap<u64, CandidateRecord>,
    last_id: u64,
}

#[derive(Debug)]
pub struct CandidateStore {
    table: RwLock<Table>,
    lock_timeout: Duration,
}

impl CandidateStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            lock_timeout,
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Table) -> T) -> StoreResult<T> {
        let table = self
            .table
            .try_read_for(self.lock_timeout)
            .ok_or(StoreError::LockTimeout)?;
        Ok(f(&table))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Table) -> T) -> StoreResult<T> {
        let mut table = self
            .table
            .try_write_for(self.lock_timeout)
            .ok_or(StoreError::LockTimeout)?;
        Ok(f(&mut table))
    }

    /// Stores a new record under the next identifier. `updated_at` starts equal to `created_at`.
    pub fn create(
        &self,
        fields: CandidateFields,
        resume_path: Option<String>,
    ) -> StoreResult<CandidateRecord> {
        self.write(|table| {
            table.last_id += 1;
            let now = Utc::now();
            let record = CandidateRecord {
                id: table.last_id,
                fields,
                resume_path,
                created_at: now,
                updated_at: now,
            };
            table.records.insert(record.id, record.clone());
            info!(
                "Added candidate {}. Total: {}",
                record.id,
                table.records.len()
            );
            record
        })
    }

    pub fn get(&self, id: u64) -> StoreResult<Option<CandidateRecord>> {
        self.read(|table| table.records.get(&id).cloned())
    }

    /// Every stored record, in insertion order.
    pub fn list_all(&self) -> StoreResult<Vec<CandidateRecord>> {
        self.read(|table| table.records.values().cloned().collect())
    }

    /// Merges the set fields of `patch` into record `id` and bumps `updated_at`.
    /// Returns `None` when no such record exists.
    pub fn update(&self, id: u64, patch: CandidatePatch) -> StoreResult<Option<CandidateRecord>> {
        self.write(|table| {
            let record = table.records.get_mut(&id)?;
            patch.apply_to(&mut record.fields);
            record.updated_at = next_update_time(record.updated_at, Utc::now());
            Some(record.clone())
        })
    }

    /// Removes record `id`, returning whether anything was removed.
    /// The associated resume file is left for the caller to clean up.
    pub fn delete(&self, id: u64) -> StoreResult<bool> {
        self.write(|table| {
            let removed = table.records.remove(&id).is_some();
            if removed {
                info!("Deleted candidate {id}. Total: {}", table.records.len());
            }
            removed
        })
    }

    /// Records matching every predicate in `filter`, in insertion order.
    pub fn filter(&self, filter: &CandidateFilter) -> StoreResult<Vec<CandidateRecord>> {
        let all = self.list_all()?;
        let total = all.len();
        let matched = filter.apply(all);
        debug!("Filtered {total} candidates down to {}", matched.len());
        Ok(matched)
    }

    pub fn len(&self) -> StoreResult<usize> {
        self.read(|table| table.records.len())
    }

    /// Blocks every other store operation until the returned guard is dropped.
    #[cfg(test)]
    pub(crate) fn hold_lock(&self) -> impl Sized + '_ {
        self.table.write()
    }
}

/// `updated_at` must move forward on every update, even if the wall clock has not.
fn next_update_time(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}

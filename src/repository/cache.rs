//! Single-entry dataset cache owned by the repository.
//!
//! Holds the records of the active agency only. Selecting another agency or
//! clearing the cache replaces the entry wholesale; there is no per-row
//! invalidation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::domain::cliente::Cliente;
use crate::domain::metadata::{Metadata, extract_metadata};
use crate::domain::types::AgencyId;

/// Records of one agency together with their checkbox metadata.
#[derive(Debug, Serialize)]
pub struct Dataset {
    pub agency: AgencyId,
    /// Cache key: the agency file name.
    pub file: String,
    pub clientes: Vec<Cliente>,
    pub metadata: Metadata,
}

impl Dataset {
    /// Wraps freshly loaded records, extracting their metadata once.
    pub fn new(agency: AgencyId, file: impl Into<String>, clientes: Vec<Cliente>) -> Self {
        let metadata = extract_metadata(&clientes);
        Self {
            agency,
            file: file.into(),
            clientes,
            metadata,
        }
    }
}

/// Ticket handed out when a load starts; stale tickets cannot store results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: RwLock<Option<Arc<Dataset>>>,
    generation: AtomicU64,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached dataset if it was loaded from `file`.
    pub fn get(&self, file: &str) -> Option<Arc<Dataset>> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|dataset| dataset.file == file)
            .cloned()
    }

    /// Currently cached dataset, whatever agency it belongs to.
    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Starts a load, invalidating tickets of every earlier load.
    pub fn begin_load(&self) -> LoadTicket {
        LoadTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Stores `dataset` unless a newer load or a clear happened meanwhile.
    ///
    /// Returns `false` when the ticket was stale and nothing was stored.
    pub fn store(&self, ticket: LoadTicket, dataset: Arc<Dataset>) -> bool {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != ticket.0 {
            return false;
        }
        *entry = Some(dataset);
        true
    }

    /// Drops the cached dataset and invalidates loads still in flight.
    pub fn clear(&self) {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
        *entry = None;
    }

    /// Clears the cache only if no load started or clear ran after `ticket`.
    ///
    /// Returns `true` when the entry was dropped.
    pub fn clear_if_current(&self, ticket: LoadTicket) -> bool {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != ticket.0 {
            return false;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        *entry = None;
        true
    }
}

//! Agency CSV loader with an explicit, injectable dataset cache.

use std::sync::Arc;

use backon::{ConstantBuilder, Retryable};

use crate::domain::agency::Agency;
use crate::domain::types::AgencyId;
use crate::models::config::LoaderConfig;
use crate::repository::cache::{Dataset, DatasetCache};
use crate::repository::errors::{LoadError, LoadResult};
use crate::repository::parse::parse_clientes;
use crate::repository::source::{CsvSource, check_body};

pub mod cache;
pub mod errors;
pub mod parse;
pub mod source;

/// Read access to agency datasets.
pub trait DatasetReader {
    fn agencies(&self) -> &[Agency];

    fn agency(&self, id: &AgencyId) -> Option<&Agency> {
        self.agencies().iter().find(|agency| &agency.id == id)
    }

    /// Returns the full dataset of `agency_id`, loading it when not cached.
    ///
    /// `items_per_page` is accepted for callers of the former paged loader
    /// and ignored: the whole dataset is always returned.
    fn load_clientes(
        &self,
        agency_id: &AgencyId,
        items_per_page: Option<usize>,
    ) -> impl Future<Output = LoadResult<Arc<Dataset>>>;

    /// Dataset currently held in memory, if any.
    fn current(&self) -> Option<Arc<Dataset>>;

    /// Drops the cached dataset; the next request reloads from the source.
    fn clear_cache(&self);
}

/// Loads agency exports and keeps the active one cached.
pub struct CsvRepository {
    source: CsvSource,
    agencies: Vec<Agency>,
    options: LoaderConfig,
    cache: Arc<DatasetCache>,
}

impl CsvRepository {
    pub fn new(
        source: CsvSource,
        agencies: Vec<Agency>,
        options: LoaderConfig,
        cache: Arc<DatasetCache>,
    ) -> Self {
        Self {
            source,
            agencies,
            options,
            cache,
        }
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    async fn fetch_with_retry(&self, agency: &Agency) -> LoadResult<Vec<u8>> {
        let retries = self.options.fetch_attempts.saturating_sub(1);
        let backoff = ConstantBuilder::default()
            .with_delay(self.options.retry_delay())
            .with_max_times(retries);

        (|| async { self.fetch_checked(agency).await })
            .retry(backoff)
            .when(LoadError::should_retry)
            .notify(|err: &LoadError, dur| {
                log::warn!(
                    "Fetching {} failed, retrying after {:.2}s: {err}",
                    agency.file,
                    dur.as_secs_f64()
                )
            })
            .await
    }

    async fn fetch_checked(&self, agency: &Agency) -> LoadResult<Vec<u8>> {
        let body = self.source.fetch(&agency.file).await?;
        check_body(&body, self.options.min_body_bytes, &agency.file)?;
        Ok(body)
    }
}

impl DatasetReader for CsvRepository {
    fn agencies(&self) -> &[Agency] {
        &self.agencies
    }

    async fn load_clientes(
        &self,
        agency_id: &AgencyId,
        _items_per_page: Option<usize>,
    ) -> LoadResult<Arc<Dataset>> {
        let agency = self
            .agency(agency_id)
            .ok_or_else(|| LoadError::UnknownAgency(agency_id.to_string()))?;

        if let Some(dataset) = self.cache.get(&agency.file) {
            return Ok(dataset);
        }

        let ticket = self.cache.begin_load();
        log::info!(
            "Loading agency {} from {}",
            agency.id,
            self.source.location(&agency.file)
        );

        let loaded = match self.fetch_with_retry(agency).await {
            Ok(body) => parse_clientes(agency, &body),
            Err(err) => Err(err),
        };

        let clientes = match loaded {
            Ok(clientes) => clientes,
            Err(err) => {
                log::error!("Failed to load agency {}: {err}", agency.id);
                self.cache.clear_if_current(ticket);
                return Err(LoadError::Failed {
                    agency: agency.id.to_string(),
                    file: agency.file.clone(),
                    reason: err.to_string(),
                });
            }
        };

        let dataset = Arc::new(Dataset::new(
            agency.id.clone(),
            agency.file.clone(),
            clientes,
        ));
        if self.cache.store(ticket, Arc::clone(&dataset)) {
            return Ok(dataset);
        }

        // A newer load or a clear ran meanwhile; only another file wins.
        match self.cache.current() {
            Some(current) if current.file == agency.file => Ok(current),
            Some(_) => {
                log::warn!("Discarding stale load of agency {}", agency.id);
                Err(LoadError::Superseded(agency.id.to_string()))
            }
            None => Ok(dataset),
        }
    }

    fn current(&self) -> Option<Arc<Dataset>> {
        self.cache.current()
    }

    fn clear_cache(&self) {
        log::info!("Clearing dataset cache");
        self.cache.clear();
    }
}

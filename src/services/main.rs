use crate::domain::metadata::Metadata;
use crate::domain::types::AgencyId;
use crate::dto::main::{AgencySummary, ClientesQuery, ExportFile, IndexPageData, StatusData};
use crate::pagination::{Paginated, page_slice};
use crate::repository::DatasetReader;
use crate::services::export::{to_export_rows, write_csv};
use crate::services::filter::{FilterActivity, filter_with_activity};
use crate::services::{ServiceError, ServiceResult};

/// Lists the configured agencies for the selector.
pub fn list_agencies<R>(repo: &R) -> Vec<AgencySummary>
where
    R: DatasetReader + ?Sized,
{
    repo.agencies().iter().map(AgencySummary::from).collect()
}

/// Loads the agency dataset, filters it and slices the requested page.
pub async fn load_index_page<R>(
    repo: &R,
    activity: &FilterActivity,
    agency: &AgencyId,
    query: ClientesQuery,
    page_size: usize,
) -> ServiceResult<IndexPageData>
where
    R: DatasetReader + ?Sized,
{
    let dataset = repo
        .load_clientes(agency, Some(page_size))
        .await
        .map_err(|err| {
            log::error!("Failed to load clientes: {err}");
            ServiceError::from(err)
        })?;

    let page = query.page.unwrap_or(1);
    let filtered = query.criteria.is_active();

    let clientes = if filtered {
        let matches = filter_with_activity(&dataset.clientes, &query.criteria, activity);
        let (served, slice) = page_slice(&matches, page, page_size);
        let items = slice.iter().map(|&c| c.clone()).collect();
        Paginated::from_page(items, served, matches.len(), page_size)
    } else {
        Paginated::from_slice(&dataset.clientes, page, page_size)
    };

    Ok(IndexPageData {
        agency: dataset.agency.clone(),
        filtered,
        dataset_total: dataset.clientes.len(),
        clientes,
    })
}

/// Returns the checkbox lists of the agency dataset.
pub async fn load_metadata<R>(repo: &R, agency: &AgencyId) -> ServiceResult<Metadata>
where
    R: DatasetReader + ?Sized,
{
    let dataset = repo
        .load_clientes(agency, None)
        .await
        .map_err(ServiceError::from)?;
    Ok(dataset.metadata.clone())
}

/// Builds the CSV export of one page of the filtered records.
pub async fn export_page<R>(
    repo: &R,
    activity: &FilterActivity,
    agency: &AgencyId,
    query: ClientesQuery,
    page_size: usize,
    max_rows: usize,
) -> ServiceResult<ExportFile>
where
    R: DatasetReader + ?Sized,
{
    let dataset = repo
        .load_clientes(agency, Some(page_size))
        .await
        .map_err(ServiceError::from)?;

    let matches = filter_with_activity(&dataset.clientes, &query.criteria, activity);
    let (page, slice) = page_slice(&matches, query.page.unwrap_or(1), page_size);
    let rows = to_export_rows(slice.iter().copied(), max_rows);

    let body = write_csv(&rows).map_err(|err| {
        log::error!("Failed to write export: {err}");
        ServiceError::Internal(err.to_string())
    })?;

    log::info!("Exported {} rows of agency {agency}", rows.len());

    Ok(ExportFile {
        file_name: format!("{agency}_pagina_{page}.csv"),
        rows: rows.len(),
        body,
    })
}

/// Drops the cached dataset so the next request reloads it.
pub fn clear_cache<R>(repo: &R)
where
    R: DatasetReader + ?Sized,
{
    repo.clear_cache();
}

pub fn status<R>(repo: &R, activity: &FilterActivity) -> StatusData
where
    R: DatasetReader + ?Sized,
{
    let current = repo.current();
    StatusData {
        filtering: activity.is_filtering(),
        active_agency: current.as_ref().map(|d| d.agency.clone()),
        loaded_records: current.as_ref().map(|d| d.clientes.len()),
    }
}

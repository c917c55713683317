use serde::Serialize;

use crate::domain::agency::Agency;
use crate::domain::cliente::Cliente;
use crate::domain::criteria::FilterCriteria;
use crate::domain::types::AgencyId;
use crate::pagination::Paginated;

/// Query accepted by the listing and export services.
#[derive(Debug, Default)]
pub struct ClientesQuery {
    pub criteria: FilterCriteria,
    /// Page number requested by the user interface.
    pub page: Option<usize>,
}

/// One page of records of the active agency.
#[derive(Debug, Serialize)]
pub struct IndexPageData {
    pub agency: AgencyId,
    /// Whether any filter criterion was applied.
    pub filtered: bool,
    /// Size of the loaded dataset before filtering.
    pub dataset_total: usize,
    #[serde(flatten)]
    pub clientes: Paginated<Cliente>,
}

/// CSV file produced for the calling tool.
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub rows: usize,
    pub body: Vec<u8>,
}

/// Agency entry of the selector list.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AgencySummary {
    pub id: AgencyId,
    pub name: String,
    pub file: String,
}

impl From<&Agency> for AgencySummary {
    fn from(agency: &Agency) -> Self {
        Self {
            id: agency.id.clone(),
            name: agency.name.clone(),
            file: agency.file.clone(),
        }
    }
}

/// Progress indicators polled by the interface.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusData {
    pub filtering: bool,
    pub active_agency: Option<AgencyId>,
    pub loaded_records: Option<usize>,
}

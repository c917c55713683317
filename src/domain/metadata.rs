use std::cmp::Reverse;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::cliente::Cliente;

/// Distinct values offered by the filter checkbox groups of one dataset.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    /// Sorted lexicographically.
    pub agencies: Vec<String>,
    /// Sorted lexicographically.
    pub models: Vec<String>,
    /// Sorted newest first.
    pub years: Vec<i32>,
    /// Sorted lexicographically; includes `"null"` when some record has no package.
    pub packages: Vec<String>,
    /// Sorted lexicographically.
    pub advisors: Vec<String>,
}

fn distinct<'a, I>(values: I) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    values
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Collects the sorted distinct non-empty values of every filterable field.
///
/// Not incremental: callers run it again whenever the dataset is reloaded.
pub fn extract_metadata(records: &[Cliente]) -> Metadata {
    let mut years: Vec<i32> = records
        .iter()
        .filter_map(|c| c.anio)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    years.sort_by_key(|year| Reverse(*year));

    Metadata {
        agencies: distinct(records.iter().map(|c| c.agencia.as_str())),
        models: distinct(records.iter().map(|c| c.modelo.as_str())),
        years,
        packages: distinct(records.iter().map(Cliente::package_key)),
        advisors: distinct(records.iter().filter_map(|c| c.asesor.as_deref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cliente::NO_PACKAGE;
    use crate::domain::types::{ClienteId, Serie};

    fn cliente(id: i32, modelo: &str, anio: Option<i32>, paquete: Option<&str>) -> Cliente {
        let mut c = Cliente::new(
            ClienteId::new(id).expect("valid id"),
            Serie::new(format!("S{id}")).expect("valid serie"),
        );
        c.modelo = modelo.to_string();
        c.anio = anio;
        c.paquete = paquete.map(str::to_string);
        c.agencia = "Monterrey".to_string();
        c
    }

    #[test]
    fn extracts_sorted_distinct_values() {
        let records = vec![
            cliente(1, "Vento", Some(2019), Some("Oro")),
            cliente(2, "Jetta", Some(2022), None),
            cliente(3, "Vento", Some(2021), Some("Plata")),
            cliente(4, "", None, Some("Oro")),
        ];

        let metadata = extract_metadata(&records);

        assert_eq!(metadata.agencies, vec!["Monterrey"]);
        assert_eq!(metadata.models, vec!["Jetta", "Vento"]);
        assert_eq!(metadata.years, vec![2022, 2021, 2019]);
        assert_eq!(metadata.packages, vec!["Oro", "Plata", NO_PACKAGE]);
        assert!(metadata.advisors.is_empty());
    }

    #[test]
    fn empty_dataset_yields_empty_lists() {
        assert_eq!(extract_metadata(&[]), Metadata::default());
    }
}

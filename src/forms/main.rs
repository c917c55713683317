use chrono::NaiveDate;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::criteria::{DateRange, DaysRange, FilterCriteria, Selection};
use crate::dto::main::ClientesQuery;
use crate::forms::FormError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter panel state as sent in the query string.
///
/// Multi-select groups use repeated keys (`modelo=Jetta&modelo=Vento`). An
/// absent key leaves the group unrestricted; a key sent only with empty
/// values means nothing is selected.
#[derive(Debug, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_ranges"))]
pub struct FilterForm {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    /// Comma separated serial search.
    #[validate(length(max = 2000))]
    pub serie: Option<String>,
    #[validate(length(max = 200))]
    pub factura: Option<String>,
    #[validate(length(max = 50))]
    pub telefono: Option<String>,
    pub dias_min: Option<u32>,
    pub dias_max: Option<u32>,
    pub desde: Option<String>,
    pub hasta: Option<String>,
    #[serde(default)]
    pub agencia: Vec<String>,
    #[serde(default)]
    pub modelo: Vec<String>,
    #[serde(default)]
    pub anio: Vec<String>,
    #[serde(default)]
    pub paquete: Vec<String>,
    #[serde(default)]
    pub asesor: Vec<String>,
}

fn parse_date(value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| FormError::InvalidDate(value.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, FormError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(v).map(Some),
        None => Ok(None),
    }
}

fn validate_ranges(form: &FilterForm) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (form.dias_min, form.dias_max)
        && min > max
    {
        return Err(ValidationError::new("dias_range"));
    }

    let desde = optional_date(form.desde.as_deref()).ok().flatten();
    let hasta = optional_date(form.hasta.as_deref()).ok().flatten();
    if let (Some(desde), Some(hasta)) = (desde, hasta)
        && desde > hasta
    {
        return Err(ValidationError::new("date_range"));
    }

    Ok(())
}

fn selection(values: Vec<String>) -> Selection<String> {
    if values.is_empty() {
        return Selection::All;
    }
    Selection::only(
        values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    )
}

fn year_selection(values: Vec<String>) -> Result<Selection<i32>, FormError> {
    if values.is_empty() {
        return Ok(Selection::All);
    }
    let years = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse().map_err(|_| FormError::InvalidYear(v.to_string())))
        .collect::<Result<Vec<i32>, FormError>>()?;
    Ok(Selection::only(years))
}

impl FilterForm {
    /// Parses a raw query string, accepting repeated keys.
    pub fn from_query(query: &str) -> Result<Self, FormError> {
        serde_html_form::from_str(query).map_err(|err| FormError::Query(err.to_string()))
    }
}

impl TryFrom<FilterForm> for FilterCriteria {
    type Error = FormError;

    fn try_from(form: FilterForm) -> Result<Self, Self::Error> {
        form.validate()?;

        // a single bound leaves the other end open
        let dias = match (form.dias_min, form.dias_max) {
            (None, None) => None,
            (min, max) => Some(DaysRange {
                min: min.unwrap_or(0),
                max: max.unwrap_or(u32::MAX),
            }),
        };

        Ok(Self {
            serie_terms: form
                .serie
                .as_deref()
                .map(FilterCriteria::parse_serie_terms)
                .unwrap_or_default(),
            nombre_factura: non_blank(form.factura),
            telefono: non_blank(form.telefono),
            dias,
            visita: DateRange {
                from: optional_date(form.desde.as_deref())?,
                to: optional_date(form.hasta.as_deref())?,
            },
            agencias: selection(form.agencia),
            modelos: selection(form.modelo),
            anios: year_selection(form.anio)?,
            paquetes: selection(form.paquete),
            asesores: selection(form.asesor),
        })
    }
}

impl TryFrom<FilterForm> for ClientesQuery {
    type Error = FormError;

    fn try_from(form: FilterForm) -> Result<Self, Self::Error> {
        let page = form.page;
        Ok(Self {
            criteria: FilterCriteria::try_from(form)?,
            page,
        })
    }
}

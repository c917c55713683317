//! CSV parsing and row mapping into [`Cliente`] records.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::domain::agency::{Agency, ResolvedColumns};
use crate::domain::cliente::{Cliente, NO_PACKAGE};
use crate::domain::types::{ClienteId, Serie};
use crate::repository::errors::{LoadError, LoadResult};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parses a last-visit value; anything unparseable is treated as absent.
pub fn parse_visit_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parses an amount such as `$12,500.00`.
pub fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|amount| amount.is_finite())
}

fn field<'r>(record: &'r StringRecord, index: Option<usize>) -> Option<&'r str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn text(record: &StringRecord, index: Option<usize>) -> String {
    field(record, index).unwrap_or_default().to_string()
}

fn optional(record: &StringRecord, index: Option<usize>) -> Option<String> {
    field(record, index).map(str::to_string)
}

/// Maps one raw row; returns `None` when the row has no serie.
pub fn map_row(record: &StringRecord, columns: &ResolvedColumns, id: ClienteId) -> Option<Cliente> {
    let serie = Serie::new(field(record, columns.serie)?).ok()?;

    let paquete = field(record, columns.paquete)
        .filter(|value| !value.eq_ignore_ascii_case(NO_PACKAGE))
        .map(str::to_string);

    Some(Cliente {
        id,
        serie,
        modelo: text(record, columns.modelo),
        anio: field(record, columns.anio).and_then(|v| v.parse().ok()),
        nombre_factura: text(record, columns.nombre_factura),
        nombre_contacto: text(record, columns.nombre_contacto),
        agencia: text(record, columns.agencia),
        tel_movil: optional(record, columns.tel_movil),
        tel_casa: optional(record, columns.tel_casa),
        tel_oficina: optional(record, columns.tel_oficina),
        contacto_preferido: optional(record, columns.contacto_preferido),
        paquete,
        orden: optional(record, columns.orden),
        total: field(record, columns.total).and_then(parse_amount),
        asesor: optional(record, columns.asesor),
        ultima_visita: field(record, columns.ultima_visita).and_then(parse_visit_date),
        dias_sin_venir: field(record, columns.dias_sin_venir)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
    })
}

/// Decodes and parses an agency export into records with sequential ids.
///
/// Malformed rows are logged and skipped; a file without any usable row is
/// an [`LoadError::Empty`] failure.
pub fn parse_clientes(agency: &Agency, body: &[u8]) -> LoadResult<Vec<Cliente>> {
    let text = agency.encoding.decode(body);

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Content(format!("{}: unreadable header row: {e}", agency.file)))?
        .clone();
    let columns = agency.columns.resolve(headers.iter());
    if columns.serie.is_none() {
        log::warn!(
            "{}: serie column {:?} not found in headers",
            agency.file,
            agency.columns.serie
        );
    }

    let mut clientes = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{}: skipping malformed row {}: {e}", agency.file, line + 2);
                skipped += 1;
                continue;
            }
        };

        let next_id = i32::try_from(clientes.len() + 1)
            .map_err(|_| LoadError::Content(format!("{}: too many rows", agency.file)))?;
        let id = ClienteId::new(next_id)
            .map_err(|e| LoadError::Content(format!("{}: {e}", agency.file)))?;

        match map_row(&record, &columns, id) {
            Some(cliente) => clientes.push(cliente),
            None => skipped += 1,
        }
    }

    if clientes.is_empty() {
        return Err(LoadError::Empty(agency.file.clone()));
    }

    log::info!(
        "{}: parsed {} records, skipped {skipped}",
        agency.file,
        clientes.len()
    );

    Ok(clientes)
}

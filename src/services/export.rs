//! Export of filtered records for the external calling tool.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;

use crate::domain::cliente::Cliente;
use crate::domain::types::normalize_phone_digits;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row of the import schema, in column order.
pub const EXPORT_HEADERS: [&str; 19] = [
    "Nombre",
    "Telefono",
    "Telefono Alterno",
    "Correo",
    "Serie",
    "Modelo",
    "Anio",
    "Agencia",
    "Asesor",
    "Ultima Visita",
    "Dias Sin Venir",
    "Paquete",
    "Orden",
    "Campana",
    "Calle",
    "Colonia",
    "Ciudad",
    "Estado",
    "Codigo Postal",
];

/// One row of the 19-column import schema of the calling tool.
///
/// Columns the dealership exports do not carry are written empty.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ExportRow {
    #[serde(rename = "Nombre")]
    pub nombre: String,
    #[serde(rename = "Telefono")]
    pub telefono: String,
    #[serde(rename = "Telefono Alterno")]
    pub telefono_alterno: String,
    #[serde(rename = "Correo")]
    pub correo: String,
    #[serde(rename = "Serie")]
    pub serie: String,
    #[serde(rename = "Modelo")]
    pub modelo: String,
    #[serde(rename = "Anio")]
    pub anio: String,
    #[serde(rename = "Agencia")]
    pub agencia: String,
    #[serde(rename = "Asesor")]
    pub asesor: String,
    #[serde(rename = "Ultima Visita")]
    pub ultima_visita: String,
    #[serde(rename = "Dias Sin Venir")]
    pub dias_sin_venir: String,
    #[serde(rename = "Paquete")]
    pub paquete: String,
    #[serde(rename = "Orden")]
    pub orden: String,
    #[serde(rename = "Campana")]
    pub campana: String,
    #[serde(rename = "Calle")]
    pub calle: String,
    #[serde(rename = "Colonia")]
    pub colonia: String,
    #[serde(rename = "Ciudad")]
    pub ciudad: String,
    #[serde(rename = "Estado")]
    pub estado: String,
    #[serde(rename = "Codigo Postal")]
    pub codigo_postal: String,
}

impl From<&Cliente> for ExportRow {
    fn from(cliente: &Cliente) -> Self {
        let nombre = if cliente.nombre_contacto.trim().is_empty() {
            cliente.nombre_factura.clone()
        } else {
            cliente.nombre_contacto.clone()
        };

        Self {
            nombre,
            telefono: cliente
                .preferred_phone()
                .and_then(normalize_phone_digits)
                .unwrap_or_default(),
            serie: cliente.serie.to_string(),
            modelo: cliente.modelo.clone(),
            anio: cliente.anio.map(|y| y.to_string()).unwrap_or_default(),
            agencia: cliente.agencia.clone(),
            asesor: cliente.asesor.clone().unwrap_or_default(),
            ultima_visita: cliente
                .ultima_visita
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            dias_sin_venir: cliente.dias_sin_venir.to_string(),
            paquete: cliente.paquete.clone().unwrap_or_default(),
            orden: cliente.orden.clone().unwrap_or_default(),
            ..Self::default()
        }
    }
}

/// Maps at most `max_rows` records to the export schema.
pub fn to_export_rows<'a, I>(records: I, max_rows: usize) -> Vec<ExportRow>
where
    I: IntoIterator<Item = &'a Cliente>,
{
    records
        .into_iter()
        .take(max_rows)
        .map(ExportRow::from)
        .collect()
}

/// Serializes rows as a UTF-8 CSV with BOM, quoted fields and CRLF line endings.
pub fn write_csv(rows: &[ExportRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(UTF8_BOM.to_vec());

    // present even when there are no rows
    writer.write_record(EXPORT_HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ClienteId, Serie};

    fn cliente(id: i32) -> Cliente {
        let mut c = Cliente::new(
            ClienteId::new(id).expect("valid id"),
            Serie::new(format!("3VW{id}")).expect("valid serie"),
        );
        c.nombre_contacto = format!("Cliente {id}");
        c
    }

    #[test]
    fn phone_uses_mobile_without_country_code() {
        let mut c = cliente(1);
        c.tel_movil = Some("+528112223333".to_string());

        let row = ExportRow::from(&c);

        assert_eq!(row.telefono, "8112223333");
        assert_eq!(row.nombre, "Cliente 1");
        assert_eq!(row.campana, "");
    }

    #[test]
    fn phone_falls_back_by_priority() {
        let mut c = cliente(1);
        c.tel_oficina = Some("81-1000-0003".to_string());
        c.contacto_preferido = Some("8110000004".to_string());

        assert_eq!(ExportRow::from(&c).telefono, "8110000003");
    }

    #[test]
    fn name_falls_back_to_invoice_name() {
        let mut c = cliente(1);
        c.nombre_contacto = String::new();
        c.nombre_factura = "Flotillas del Norte".to_string();

        assert_eq!(ExportRow::from(&c).nombre, "Flotillas del Norte");
    }

    #[test]
    fn export_is_truncated_to_max_rows() {
        let records: Vec<Cliente> = (1..=750).map(cliente).collect();
        assert_eq!(to_export_rows(&records, 700).len(), 700);
    }

    #[test]
    fn csv_has_bom_crlf_and_quotes() {
        let rows = to_export_rows(&[cliente(1)], 700);
        let bytes = write_csv(&rows).expect("csv written");

        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf8");
        let lines: Vec<&str> = text.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\"Nombre\",\"Telefono\""));
        assert_eq!(lines[0].split("\",\"").count(), 19);
        assert!(lines[1].starts_with("\"Cliente 1\",\"\""));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn empty_export_keeps_header() {
        let bytes = write_csv(&[]).expect("csv written");
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf8");
        let expected = format!("\"{}\"\r\n", EXPORT_HEADERS.join("\",\""));
        assert_eq!(text, expected);
    }

    #[test]
    fn header_matches_row_fields() {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.serialize(ExportRow::default()).expect("row written");
        let bytes = writer.into_inner().expect("flushed");
        let text = String::from_utf8(bytes).expect("utf8");

        assert_eq!(text.lines().next(), Some(EXPORT_HEADERS.join(",").as_str()));
    }
}

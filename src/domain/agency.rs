//! Per-agency source description: file name, encoding and header mapping.
//!
//! Source systems export the same semantic columns under different header
//! names, so every agency carries an explicit [`ColumnMapping`] that is
//! resolved once per parse into [`ResolvedColumns`].

use serde::{Deserialize, Serialize};

use crate::domain::types::AgencyId;

/// Text encoding of an agency CSV export.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceEncoding {
    #[default]
    Utf8,
    /// Strict ISO-8859-1: every byte is the code point of the same value,
    /// so 0x80-0x9F become C1 control characters.
    Latin1,
    /// Windows-1252, the usual single-byte export of Excel and dealer
    /// management systems. Same as `Latin1` outside 0x80-0x9F.
    Windows1252,
}

/// Windows-1252 characters for bytes 0x80-0x9F. Undefined bytes keep their
/// ISO-8859-1 code point.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20ac}', '\u{81}', '\u{201a}', '\u{192}', '\u{201e}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2c6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8d}', '\u{17d}', '\u{8f}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2dc}', '\u{2122}', '\u{161}', '\u{203a}', '\u{153}', '\u{9d}', '\u{17e}', '\u{178}',
];

fn windows_1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9f => WINDOWS_1252_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

impl SourceEncoding {
    /// Decodes raw bytes into text, dropping a leading byte-order mark.
    pub fn decode(self, bytes: &[u8]) -> String {
        let text = match self {
            SourceEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            SourceEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            SourceEncoding::Windows1252 => bytes.iter().map(|&b| windows_1252_char(b)).collect(),
        };
        match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        }
    }
}

/// Header names used by one agency for each semantic field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnMapping {
    pub serie: String,
    pub modelo: String,
    pub anio: String,
    pub nombre_factura: String,
    pub nombre_contacto: String,
    pub agencia: String,
    pub tel_movil: String,
    pub tel_casa: String,
    pub tel_oficina: String,
    pub contacto_preferido: String,
    pub paquete: String,
    pub orden: String,
    pub total: String,
    pub asesor: String,
    pub ultima_visita: String,
    pub dias_sin_venir: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            serie: "SERIE".to_string(),
            modelo: "MODELO".to_string(),
            anio: "ANIO".to_string(),
            nombre_factura: "NOMBRE_FACTURA".to_string(),
            nombre_contacto: "NOMBRE_CONTACTO".to_string(),
            agencia: "AGENCIA".to_string(),
            tel_movil: "TEL_MOVIL".to_string(),
            tel_casa: "TEL_CASA".to_string(),
            tel_oficina: "TEL_OFICINA".to_string(),
            contacto_preferido: "TEL_CONTACTO".to_string(),
            paquete: "PAQUETE".to_string(),
            orden: "ORDEN".to_string(),
            total: "TOTAL".to_string(),
            asesor: "ASESOR".to_string(),
            ultima_visita: "ULTIMA_VISITA".to_string(),
            dias_sin_venir: "DIAS_SIN_VENIR".to_string(),
        }
    }
}

/// Column indices located in a concrete header row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub serie: Option<usize>,
    pub modelo: Option<usize>,
    pub anio: Option<usize>,
    pub nombre_factura: Option<usize>,
    pub nombre_contacto: Option<usize>,
    pub agencia: Option<usize>,
    pub tel_movil: Option<usize>,
    pub tel_casa: Option<usize>,
    pub tel_oficina: Option<usize>,
    pub contacto_preferido: Option<usize>,
    pub paquete: Option<usize>,
    pub orden: Option<usize>,
    pub total: Option<usize>,
    pub asesor: Option<usize>,
    pub ultima_visita: Option<usize>,
    pub dias_sin_venir: Option<usize>,
}

impl ColumnMapping {
    /// Locates every mapped header in `headers`; matching ignores surrounding whitespace.
    pub fn resolve<'h, I>(&self, headers: I) -> ResolvedColumns
    where
        I: IntoIterator<Item = &'h str>,
    {
        let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let find = |name: &str| headers.iter().position(|h| *h == name.trim());

        ResolvedColumns {
            serie: find(&self.serie),
            modelo: find(&self.modelo),
            anio: find(&self.anio),
            nombre_factura: find(&self.nombre_factura),
            nombre_contacto: find(&self.nombre_contacto),
            agencia: find(&self.agencia),
            tel_movil: find(&self.tel_movil),
            tel_casa: find(&self.tel_casa),
            tel_oficina: find(&self.tel_oficina),
            contacto_preferido: find(&self.contacto_preferido),
            paquete: find(&self.paquete),
            orden: find(&self.orden),
            total: find(&self.total),
            asesor: find(&self.asesor),
            ultima_visita: find(&self.ultima_visita),
            dias_sin_venir: find(&self.dias_sin_venir),
        }
    }
}

/// A dealership whose customer-visit export can be loaded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agency {
    pub id: AgencyId,
    pub name: String,
    /// File name relative to the configured data source.
    pub file: String,
    #[serde(default)]
    pub encoding: SourceEncoding,
    #[serde(default)]
    pub columns: ColumnMapping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_finds_agency_specific_headers() {
        let mapping = ColumnMapping {
            modelo: "Modelo".to_string(),
            ..ColumnMapping::default()
        };

        let resolved = mapping.resolve(["SERIE", " Modelo ", "ASESOR"]);

        assert_eq!(resolved.serie, Some(0));
        assert_eq!(resolved.modelo, Some(1));
        assert_eq!(resolved.asesor, Some(2));
        assert_eq!(resolved.total, None);
    }

    #[test]
    fn latin1_decodes_accented_bytes() {
        let bytes = [b'A', b'C', b'U', b'\xd1', b'A'];
        assert_eq!(SourceEncoding::Latin1.decode(&bytes), "ACUÑA");
    }

    #[test]
    fn windows1252_maps_high_range() {
        let bytes = b"\x93Pe\xf1a\x94 \x80 500\x85";
        assert_eq!(
            SourceEncoding::Windows1252.decode(bytes),
            "\u{201c}Peña\u{201d} € 500…"
        );
        assert_eq!(SourceEncoding::Latin1.decode(b"\x80"), "\u{80}");
    }

    #[test]
    fn windows1252_keeps_undefined_bytes() {
        assert_eq!(SourceEncoding::Windows1252.decode(b"\x81\x9d"), "\u{81}\u{9d}");
    }

    #[test]
    fn utf8_strips_bom() {
        let bytes = "\u{feff}SERIE".as_bytes();
        assert_eq!(SourceEncoding::Utf8.decode(bytes), "SERIE");
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClienteId, Serie};

/// Placeholder bucket used for records without a service package.
pub const NO_PACKAGE: &str = "null";

/// Normalized customer-visit record built from one CSV row.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Cliente {
    pub id: ClienteId,
    pub serie: Serie,
    pub modelo: String,
    pub anio: Option<i32>,
    pub nombre_factura: String,
    pub nombre_contacto: String,
    pub agencia: String,
    pub tel_movil: Option<String>,
    pub tel_casa: Option<String>,
    pub tel_oficina: Option<String>,
    pub contacto_preferido: Option<String>,
    pub paquete: Option<String>,
    pub orden: Option<String>,
    pub total: Option<f64>,
    pub asesor: Option<String>,
    pub ultima_visita: Option<NaiveDate>,
    /// Days since the last visit; `0` when the export left it blank.
    pub dias_sin_venir: u32,
}

impl Cliente {
    /// Creates a record with only the mandatory fields populated.
    #[must_use]
    pub fn new(id: ClienteId, serie: Serie) -> Self {
        Self {
            id,
            serie,
            modelo: String::new(),
            anio: None,
            nombre_factura: String::new(),
            nombre_contacto: String::new(),
            agencia: String::new(),
            tel_movil: None,
            tel_casa: None,
            tel_oficina: None,
            contacto_preferido: None,
            paquete: None,
            orden: None,
            total: None,
            asesor: None,
            ultima_visita: None,
            dias_sin_venir: 0,
        }
    }

    /// Phone numbers in contact priority: mobile, landline, office, preferred contact.
    pub fn phones(&self) -> impl Iterator<Item = &str> {
        [
            &self.tel_movil,
            &self.tel_casa,
            &self.tel_oficina,
            &self.contacto_preferido,
        ]
        .into_iter()
        .filter_map(|phone| phone.as_deref())
        .filter(|phone| !phone.trim().is_empty())
    }

    /// First available phone number by contact priority.
    pub fn preferred_phone(&self) -> Option<&str> {
        self.phones().next()
    }

    /// Package label used for filtering, with absent packages in the `"null"` bucket.
    pub fn package_key(&self) -> &str {
        self.paquete.as_deref().unwrap_or(NO_PACKAGE)
    }
}

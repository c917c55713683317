//! Filter criteria applied to a loaded dataset.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Membership rule of one multi-select checkbox group.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T: Ord> {
    /// Every value is selected; the group does not restrict anything.
    All,
    /// Only the listed values pass. An empty set rejects every non-empty value.
    Only(BTreeSet<T>),
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Ord> Selection<T> {
    pub fn only<I: IntoIterator<Item = T>>(values: I) -> Self {
        Selection::Only(values.into_iter().collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Checks a record value against the group.
    ///
    /// Absent values always pass: only a present value missing from a
    /// restrictive set is rejected.
    pub fn admits<Q>(&self, value: Option<&Q>) -> bool
    where
        T: std::borrow::Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match (self, value) {
            (Selection::All, _) | (_, None) => true,
            (Selection::Only(selected), Some(value)) => selected.contains(value),
        }
    }
}

/// Inclusive bounds on days since the last visit.
///
/// Zero is an ordinary value: a record visited today stays in `[0, 100]`.
/// Older dashboards dropped zero-day records once the range was narrowed
/// from its default span; this type deliberately does not.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaysRange {
    pub min: u32,
    pub max: u32,
}

impl DaysRange {
    pub fn contains(&self, days: u32) -> bool {
        (self.min..=self.max).contains(&days)
    }
}

/// Inclusive calendar range on the last-visit date.
///
/// The range only filters once both ends are set.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.from.zip(self.to)
    }
}

/// Complete set of criteria; every active criterion must pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterCriteria {
    /// Serial substrings; a record matches if its serie contains any of them.
    pub serie_terms: Vec<String>,
    pub nombre_factura: Option<String>,
    pub telefono: Option<String>,
    pub dias: Option<DaysRange>,
    pub visita: DateRange,
    pub agencias: Selection<String>,
    pub modelos: Selection<String>,
    pub anios: Selection<i32>,
    pub paquetes: Selection<String>,
    pub asesores: Selection<String>,
}

impl FilterCriteria {
    /// Splits a comma separated serial search into trimmed, non-empty terms.
    pub fn parse_serie_terms(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// True when at least one criterion narrows the dataset.
    pub fn is_active(&self) -> bool {
        !self.serie_terms.is_empty()
            || self.nombre_factura.is_some()
            || self.telefono.is_some()
            || self.dias.is_some()
            || self.visita.bounds().is_some()
            || !self.agencias.is_all()
            || !self.modelos.is_all()
            || !self.anios.is_all()
            || !self.paquetes.is_all()
            || !self.asesores.is_all()
    }
}

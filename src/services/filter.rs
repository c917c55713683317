//! Multi-criteria filter engine over an in-memory dataset.
//!
//! Recomputes from scratch on every call; there is no index structure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::cliente::Cliente;
use crate::domain::criteria::FilterCriteria;

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Compiled form of [`FilterCriteria`] with search terms lower-cased once.
struct Predicate<'c> {
    criteria: &'c FilterCriteria,
    serie_terms: Vec<String>,
    nombre_factura: Option<String>,
    telefono: Option<String>,
}

impl<'c> Predicate<'c> {
    fn new(criteria: &'c FilterCriteria) -> Self {
        let lower = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
        };
        Self {
            criteria,
            serie_terms: criteria
                .serie_terms
                .iter()
                .map(|term| term.trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
            nombre_factura: lower(&criteria.nombre_factura),
            telefono: lower(&criteria.telefono),
        }
    }

    fn matches(&self, cliente: &Cliente) -> bool {
        let c = self.criteria;

        if !self.serie_terms.is_empty() {
            let serie = cliente.serie.to_lowercase();
            if !self.serie_terms.iter().any(|term| serie.contains(term.as_str())) {
                return false;
            }
        }

        if let Some(term) = &self.nombre_factura
            && !contains_ci(&cliente.nombre_factura, term)
        {
            return false;
        }

        if let Some(term) = &self.telefono
            && !cliente.phones().any(|phone| contains_ci(phone, term))
        {
            return false;
        }

        if let Some(range) = c.dias
            && !range.contains(cliente.dias_sin_venir)
        {
            return false;
        }

        if let Some((from, to)) = c.visita.bounds() {
            match cliente.ultima_visita {
                Some(date) if date >= from && date <= to => {}
                _ => return false,
            }
        }

        c.agencias.admits(non_empty(&cliente.agencia))
            && c.modelos.admits(non_empty(&cliente.modelo))
            && c.anios.admits(cliente.anio.as_ref())
            && c.paquetes.admits(Some(cliente.package_key()))
            && c.asesores.admits(cliente.asesor.as_deref().and_then(non_empty))
    }
}

/// Returns the records passing every active criterion, in their original order.
///
/// With no active criterion the full input is returned.
pub fn filter_clientes<'a>(records: &'a [Cliente], criteria: &FilterCriteria) -> Vec<&'a Cliente> {
    if !criteria.is_active() {
        return records.iter().collect();
    }
    let predicate = Predicate::new(criteria);
    records.iter().filter(|c| predicate.matches(c)).collect()
}

/// Tracks whether a filter computation is running.
///
/// The flag stays raised for `settle` after the last computation finishes so
/// clients polling it get a visible loading affordance.
#[derive(Debug)]
pub struct FilterActivity {
    running: AtomicUsize,
    last_finished: Mutex<Option<Instant>>,
    settle: Duration,
}

impl FilterActivity {
    pub fn new(settle: Duration) -> Self {
        Self {
            running: AtomicUsize::new(0),
            last_finished: Mutex::new(None),
            settle,
        }
    }

    /// Raises the flag until the returned guard is dropped.
    pub fn start(&self) -> FilterGuard<'_> {
        self.running.fetch_add(1, Ordering::SeqCst);
        FilterGuard { activity: self }
    }

    pub fn is_filtering(&self) -> bool {
        if self.running.load(Ordering::SeqCst) > 0 {
            return true;
        }
        self.last_finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|finished| finished.elapsed() < self.settle)
    }
}

/// Clears the in-progress signal of a [`FilterActivity`] when dropped.
pub struct FilterGuard<'a> {
    activity: &'a FilterActivity,
}

impl Drop for FilterGuard<'_> {
    fn drop(&mut self) {
        *self
            .activity
            .last_finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        self.activity.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Runs [`filter_clientes`] while signalling progress through `activity`.
pub fn filter_with_activity<'a>(
    records: &'a [Cliente],
    criteria: &FilterCriteria,
    activity: &FilterActivity,
) -> Vec<&'a Cliente> {
    let _guard = activity.start();
    let filtered = filter_clientes(records, criteria);
    log::debug!("Filtered {} of {} records", filtered.len(), records.len());
    filtered
}

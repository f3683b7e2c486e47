// ============================================================================
// QUERY CACHE - Caché de lectura de las listas de países
// ============================================================================
// Las entradas se borran al invalidar (tras cada escritura correcta) u,
// opcionalmente, por antigüedad. Una carga iniciada antes de invalidar no
// debe guardar su resultado: cada clave lleva un contador de generación.
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;
use chrono::{DateTime, Utc};
use crate::models::Country;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Países con al menos una empresa
    Countries,
    /// Países que esperan su primer proveedor
    CountriesForAdding,
}

impl QueryKey {
    pub const ALL: [QueryKey; 2] = [QueryKey::Countries, QueryKey::CountriesForAdding];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Countries => "countries",
            QueryKey::CountriesForAdding => "countries-for-adding",
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    countries: Vec<Country>,
    fetched_at: DateTime<Utc>,
}

/// Ticket que se entrega al iniciar una carga; ver [`QueryCache::store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RefCell<HashMap<QueryKey, CacheEntry>>,
    generations: RefCell<HashMap<QueryKey, u64>>,
    ttl: Option<chrono::Duration>,
}

impl QueryCache {
    pub fn new(ttl: Option<chrono::Duration>) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// Valor vigente en caché, si lo hay. Las entradas caducadas se eliminan.
    pub fn get(&self, key: QueryKey) -> Option<Vec<Country>> {
        let mut entries = self.entries.borrow_mut();
        let age = Utc::now().signed_duration_since(entries.get(&key)?.fetched_at);

        if self.ttl.is_some_and(|ttl| age > ttl) {
            log::info!("⌛ [CACHE] `{}` caducado ({}s)", key.as_str(), age.num_seconds());
            entries.remove(&key);
            return None;
        }
        entries.get(&key).map(|entry| entry.countries.clone())
    }

    pub fn begin_fetch(&self, key: QueryKey) -> FetchTicket {
        FetchTicket {
            key,
            generation: self.generation(key),
        }
    }

    /// Guardar el resultado salvo que la clave se haya invalidado desde el ticket
    pub fn store(&self, ticket: FetchTicket, countries: Vec<Country>) -> bool {
        if self.generation(ticket.key) != ticket.generation {
            log::info!(
                "🗑️ [CACHE] Resultado de `{}` descartado: invalidado durante la carga",
                ticket.key.as_str()
            );
            return false;
        }
        self.entries.borrow_mut().insert(
            ticket.key,
            CacheEntry {
                countries,
                fetched_at: Utc::now(),
            },
        );
        true
    }

    pub fn invalidate(&self, key: QueryKey) {
        self.entries.borrow_mut().remove(&key);
        *self.generations.borrow_mut().entry(key).or_insert(0) += 1;
        log::debug!("🗑️ [CACHE] `{}` invalidado", key.as_str());
    }

    pub fn invalidate_all(&self) {
        for key in QueryKey::ALL {
            self.invalidate(key);
        }
    }

    pub fn contains(&self, key: QueryKey) -> bool {
        self.entries.borrow().contains_key(&key)
    }

    fn generation(&self, key: QueryKey) -> u64 {
        self.generations.borrow().get(&key).copied().unwrap_or(0)
    }
}

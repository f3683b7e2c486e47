// ============================================================================
// COUNTRIES SERVICE - Acceso a datos del dashboard
// ============================================================================
// Las lecturas pasan por la QueryCache; cada escritura correcta invalida AMBAS
// listas: añadir proveedores mueve un país de "por añadir" a la lista de
// países activos (y un reset lo devuelve).
// ============================================================================

use std::rc::Rc;
use serde_json::Value;
use crate::error::{ApiError, ValidationError, LOAD_FALLBACK, MUTATION_FALLBACK};
use crate::models::country::{validate_companies, validate_country_code, validate_price};
use crate::models::{ApiEnvelope, Country, CountryUpdate, PendingSubmission, Provider, ProviderCompany};
use crate::services::http_client::HttpClient;
use crate::services::query_cache::{QueryCache, QueryKey};
use crate::services::transport::Transport;
use crate::utils::COUNTRIES_PATH;

pub struct CountriesService<T: Transport> {
    client: Rc<HttpClient<T>>,
    cache: QueryCache,
}

impl<T: Transport> CountriesService<T> {
    pub fn new(client: Rc<HttpClient<T>>, cache_ttl: Option<chrono::Duration>) -> Self {
        Self {
            client,
            cache: QueryCache::new(cache_ttl),
        }
    }

    pub fn client(&self) -> &HttpClient<T> {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ------------------------------------------------------------------------
    // Consultas
    // ------------------------------------------------------------------------

    /// Países que ya tienen empresas (`companiesCount > 0`)
    pub async fn list_countries(&self) -> Result<Vec<Country>, ApiError> {
        self.query(QueryKey::Countries, Country::is_onboarded).await
    }

    /// Países a la espera de su primer proveedor (`companiesCount == 0`).
    /// Las entradas sin contador no aparecen en ninguna lista.
    pub async fn list_countries_for_adding(&self) -> Result<Vec<Country>, ApiError> {
        self.query(QueryKey::CountriesForAdding, Country::is_awaiting)
            .await
    }

    async fn query(&self, key: QueryKey, keep: fn(&Country) -> bool) -> Result<Vec<Country>, ApiError> {
        if let Some(hit) = self.cache.get(key) {
            log::debug!("📋 [COUNTRIES] `{}` servido desde caché ({})", key.as_str(), hit.len());
            return Ok(hit);
        }

        let ticket = self.cache.begin_fetch(key);
        let countries: Vec<Country> = self
            .fetch_all()
            .await?
            .into_iter()
            .filter(|c| keep(c))
            .collect();

        log::info!("✅ [COUNTRIES] `{}` cargado: {} países", key.as_str(), countries.len());
        self.cache.store(ticket, countries.clone());
        Ok(countries)
    }

    async fn fetch_all(&self) -> Result<Vec<Country>, ApiError> {
        let response = self
            .client
            .get(COUNTRIES_PATH)
            .await
            .map_err(ApiError::into_load)?;

        let envelope: ApiEnvelope = response.json().map_err(|e| {
            log::error!("❌ [COUNTRIES] Respuesta de lista ilegible: {}", e);
            ApiError::Load(LOAD_FALLBACK.to_string())
        })?;

        let entries = match (envelope.success, &envelope.data) {
            (true, Some(Value::Array(entries))) => entries,
            _ => {
                let message = envelope
                    .error_message()
                    .unwrap_or_else(|| LOAD_FALLBACK.to_string());
                log::error!("❌ [COUNTRIES] Lista rechazada: {}", message);
                return Err(ApiError::Load(message));
            }
        };

        let mut countries = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<Country>(entry.clone()) {
                Ok(country) if country.is_listable() => {
                    if !country.has_consistent_count() {
                        log::debug!(
                            "ℹ️ [COUNTRIES] {} declara {:?} empresas, {} adjuntas",
                            country.code,
                            country.companies_count,
                            country.total_companies()
                        );
                    }
                    countries.push(country);
                }
                Ok(country) => log::warn!("⚠️ [COUNTRIES] Entrada sin code/nombre, se omite: {:?}", country.code),
                Err(e) => log::warn!("⚠️ [COUNTRIES] Entrada mal formada, se omite: {}", e),
            }
        }
        Ok(countries)
    }

    // ------------------------------------------------------------------------
    // Mutaciones
    // ------------------------------------------------------------------------

    /// Reemplazar la lista completa de proveedores de un país
    pub async fn submit_providers(
        &self,
        country_code: &str,
        providers: &[Provider],
    ) -> Result<Option<Value>, ApiError> {
        validate_country_code(country_code)?;
        if providers.is_empty() {
            return Err(ValidationError::NoProviders.into());
        }
        for provider in providers {
            provider.validate()?;
        }

        let body = CountryUpdate::Providers {
            providers: providers.to_vec(),
        };
        let data = self.mutate(country_code, &body).await?;
        log::info!(
            "✅ [COUNTRIES] {} proveedores guardados para {}",
            providers.len(),
            country_code
        );
        Ok(data)
    }

    pub async fn submit(&self, submission: &PendingSubmission) -> Result<Option<Value>, ApiError> {
        self.submit_providers(&submission.country_code, &submission.providers)
            .await
    }

    /// Actualización plana `{price, companies}` para backends con el formato antiguo
    pub async fn submit_legacy_companies(
        &self,
        country_code: &str,
        price: f64,
        companies: &[ProviderCompany],
    ) -> Result<Option<Value>, ApiError> {
        validate_country_code(country_code)?;
        validate_price(price)?;
        validate_companies(companies)?;

        let body = CountryUpdate::Legacy {
            price,
            companies: companies
                .iter()
                .map(|c| ProviderCompany::new(c.name.trim()))
                .collect(),
        };
        self.mutate(country_code, &body).await
    }

    /// Quitar todos los proveedores del país. El país en sí se conserva.
    pub async fn reset_country(&self, country_code: &str) -> Result<Option<Value>, ApiError> {
        validate_country_code(country_code)?;
        let data = self.mutate(country_code, &CountryUpdate::reset()).await?;
        log::info!("🗑️ [COUNTRIES] {} reseteado", country_code);
        Ok(data)
    }

    async fn mutate(&self, country_code: &str, body: &CountryUpdate) -> Result<Option<Value>, ApiError> {
        let path = format!("{}/{}", COUNTRIES_PATH, country_code.trim());
        let response = self
            .client
            .patch_json(&path, body)
            .await
            .map_err(ApiError::into_mutation)?;

        let envelope: ApiEnvelope = response.json().map_err(|e| {
            log::error!("❌ [COUNTRIES] Respuesta de escritura ilegible: {}", e);
            ApiError::Mutation(MUTATION_FALLBACK.to_string())
        })?;

        if !envelope.success {
            let message = envelope
                .error_message()
                .unwrap_or_else(|| MUTATION_FALLBACK.to_string());
            log::error!("❌ [COUNTRIES] Actualización de {} rechazada: {}", country_code, message);
            return Err(ApiError::Mutation(message));
        }

        self.cache.invalidate_all();
        Ok(envelope.data)
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use crate::error::ValidationError;

/// Empresa de un país en el formato plano (antiguo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Empresa dentro de un proveedor, y elemento del body en el formato antiguo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCompany {
    pub name: String,
}

impl ProviderCompany {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub companies: Vec<ProviderCompany>,
}

impl Provider {
    /// Un proveedor se puede enviar con nombre, precio positivo y al menos una empresa
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyProviderName);
        }
        validate_price(self.price)?;
        validate_companies(&self.companies)
    }
}

pub(crate) fn validate_price(price: f64) -> Result<(), ValidationError> {
    // NaN también falla la comparación
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositivePrice)
    }
}

pub(crate) fn validate_companies(companies: &[ProviderCompany]) -> Result<(), ValidationError> {
    if companies.is_empty() {
        return Err(ValidationError::NoCompanies);
    }
    if companies.iter().any(|c| c.name.trim().is_empty()) {
        return Err(ValidationError::EmptyCompanyName);
    }
    Ok(())
}

pub(crate) fn validate_country_code(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::EmptyCountryCode);
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidCountryCode(code.to_string()));
    }
    Ok(())
}

/// `null` y un campo ausente significan "valor por defecto"
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// País tal como lo devuelve `GET countries`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: String,
    pub country: String,
    #[serde(rename = "country_ar", default)]
    pub country_ar: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    /// Ausente si el backend no lo envía; ese país no está en ninguna lista
    #[serde(default)]
    pub companies_count: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub companies: Vec<Company>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Country {
    /// Activo = al menos una empresa (según el contador)
    pub fn is_onboarded(&self) -> bool {
        self.companies_count.is_some_and(|n| n > 0)
    }

    /// A la espera de su primer proveedor: contador presente y a cero
    pub fn is_awaiting(&self) -> bool {
        self.companies_count == Some(0)
    }

    /// Las listas omiten las entradas sin código o sin nombre en inglés
    pub fn is_listable(&self) -> bool {
        !self.code.trim().is_empty() && !self.country.trim().is_empty()
    }

    /// Empresas presentes en el registro: las de los proveedores si se usa ese
    /// formato, si no la lista plana.
    pub fn total_companies(&self) -> usize {
        if self.providers.is_empty() {
            self.companies.len()
        } else {
            self.providers.iter().map(|p| p.companies.len()).sum()
        }
    }

    pub fn has_consistent_count(&self) -> bool {
        self.companies_count
            .is_some_and(|n| self.total_companies() == n as usize)
    }

    /// Nombre árabe si se pide y existe, si no el nombre en inglés
    pub fn display_name(&self, arabic: bool) -> &str {
        match (&self.country_ar, arabic) {
            (Some(ar), true) if !ar.trim().is_empty() => ar,
            _ => &self.country,
        }
    }

    /// Etiqueta del selector, p. ej. `France (FR)`
    pub fn label(&self, arabic: bool) -> String {
        format!("{} ({})", self.display_name(arabic), self.code.to_uppercase())
    }
}

/// Body de `PATCH countries/{code}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CountryUpdate {
    Providers { providers: Vec<Provider> },
    /// Formato plano para backends que aún no usan proveedores
    Legacy {
        price: f64,
        companies: Vec<ProviderCompany>,
    },
}

impl CountryUpdate {
    pub fn reset() -> Self {
        CountryUpdate::Providers { providers: Vec::new() }
    }
}

/// Sobre genérico `{success, data, error}` de todos los endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ApiEnvelope {
    /// El campo `error`, solo si es un string
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            Some(serde_json::Value::String(msg)) if !msg.trim().is_empty() => Some(msg.clone()),
            _ => None,
        }
    }
}

/// Envío pendiente del asistente, en memoria hasta enviar o cerrar
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub country_code: String,
    pub providers: Vec<Provider>,
}

impl PendingSubmission {
    pub fn company_count(&self) -> usize {
        self.providers.iter().map(|p| p.companies.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn acme() -> Provider {
        Provider {
            name: "Acme".into(),
            price: 5.0,
            companies: vec![ProviderCompany::new("A"), ProviderCompany::new("B")],
        }
    }

    #[test]
    fn provider_validation_rules() {
        assert!(acme().validate().is_ok());

        let mut p = acme();
        p.name = "   ".into();
        assert_eq!(p.validate(), Err(ValidationError::EmptyProviderName));

        let mut p = acme();
        p.price = 0.0;
        assert_eq!(p.validate(), Err(ValidationError::NonPositivePrice));
        p.price = f64::NAN;
        assert_eq!(p.validate(), Err(ValidationError::NonPositivePrice));

        let mut p = acme();
        p.companies.clear();
        assert_eq!(p.validate(), Err(ValidationError::NoCompanies));
    }

    #[test]
    fn country_code_must_be_a_plain_segment() {
        assert!(validate_country_code("fr").is_ok());
        assert_eq!(validate_country_code(" "), Err(ValidationError::EmptyCountryCode));
        assert!(matches!(
            validate_country_code("fr/../admin"),
            Err(ValidationError::InvalidCountryCode(_))
        ));
    }

    #[test]
    fn country_parses_both_shapes() {
        let country: Country = serde_json::from_value(json!({
            "code": "fr",
            "country": "France",
            "country_ar": "فرنسا",
            "flag": "https://flags/fr.png",
            "price": 2.5,
            "companiesCount": 2,
            "companies": [
                { "id": "c1", "name": "A", "createdAt": "2024-01-01", "updatedAt": "2024-01-02" },
                { "id": "c2", "name": "B", "createdAt": "2024-01-01", "updatedAt": "2024-01-02" }
            ]
        }))
        .unwrap();
        assert!(country.is_onboarded());
        assert!(country.has_consistent_count());
        assert_eq!(country.display_name(true), "فرنسا");
        assert_eq!(country.label(false), "France (FR)");

        let with_providers: Country = serde_json::from_value(json!({
            "code": "us",
            "country": "United States",
            "companiesCount": 3,
            "providers": [
                { "name": "Acme", "price": 5, "companies": [{ "name": "A" }, { "name": "B" }] },
                { "name": "Zed", "price": 1.5, "companies": [{ "name": "C" }] }
            ]
        }))
        .unwrap();
        assert_eq!(with_providers.total_companies(), 3);
        assert_eq!(with_providers.display_name(true), "United States");
    }

    #[test]
    fn missing_counter_and_null_fields() {
        let unreported: Country =
            serde_json::from_value(json!({ "code": "de", "country": "Germany" })).unwrap();
        assert_eq!(unreported.companies_count, None);
        assert!(!unreported.is_onboarded());
        assert!(!unreported.is_awaiting());

        let nulls: Country = serde_json::from_value(json!({
            "code": "it",
            "country": "Italy",
            "companiesCount": 0,
            "flag": null,
            "price": null,
            "companies": null,
            "providers": null
        }))
        .unwrap();
        assert!(nulls.is_awaiting());
        assert_eq!(nulls.flag, "");
        assert_eq!(nulls.price, 0.0);
        assert!(nulls.companies.is_empty());
    }

    #[test]
    fn update_bodies() {
        let body = serde_json::to_value(CountryUpdate::Providers {
            providers: vec![acme()],
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "providers": [{ "name": "Acme", "price": 5.0, "companies": [{ "name": "A" }, { "name": "B" }] }] })
        );

        let legacy = serde_json::to_value(CountryUpdate::Legacy {
            price: 0.0,
            companies: vec![],
        })
        .unwrap();
        assert_eq!(legacy, json!({ "price": 0.0, "companies": [] }));

        assert_eq!(
            serde_json::to_value(CountryUpdate::reset()).unwrap(),
            json!({ "providers": [] })
        );
    }

    #[test]
    fn envelope_error_must_be_a_string() {
        let env: ApiEnvelope =
            serde_json::from_value(json!({ "success": false, "error": { "code": 9 } })).unwrap();
        assert_eq!(env.error_message(), None);

        let env: ApiEnvelope =
            serde_json::from_value(json!({ "success": false, "error": "Country not found" }))
                .unwrap();
        assert_eq!(env.error_message().as_deref(), Some("Country not found"));
    }
}

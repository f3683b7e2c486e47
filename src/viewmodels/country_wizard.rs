// ============================================================================
// COUNTRY WIZARD - Diálogos de añadir / editar país sin la UI
// ============================================================================
// Pasos: SelectCountry -> BuildProvider -> Review
// Los proveedores se construyen en memoria y solo llegan al backend en submit().
// Un proveedor solo se añade con nombre, precio > 0 y al menos una empresa.
// ============================================================================

use crate::context::{format_template, Dictionary};
use crate::error::{ApiError, ValidationError};
use crate::models::country::validate_country_code;
use crate::models::{Country, PendingSubmission, Provider, ProviderCompany};
use crate::services::countries_service::CountriesService;
use crate::services::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    /// País elegido de la lista "por añadir"
    Add,
    /// País existente, con sus proveedores cargados
    Edit { country_code: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    SelectCountry,
    BuildProvider,
    Review,
}

/// Proveedor en edición
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderDraft {
    pub name: String,
    pub price: f64,
    pub companies: Vec<ProviderCompany>,
}

impl ProviderDraft {
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.price == 0.0 && self.companies.is_empty()
    }

    fn build(&self) -> Result<Provider, ValidationError> {
        let provider = Provider {
            name: self.name.trim().to_string(),
            price: self.price,
            companies: self.companies.clone(),
        };
        provider.validate()?;
        Ok(provider)
    }
}

/// Totales tras un envío correcto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionSummary {
    pub providers: usize,
    pub companies: usize,
}

impl SubmissionSummary {
    pub fn message(&self, mode: &WizardMode, dict: &Dictionary) -> String {
        match mode {
            WizardMode::Add => format_template(
                &dict.dashboard.companies_added,
                &[("count", self.companies.to_string())],
            ),
            WizardMode::Edit { .. } => format_template(
                &dict.dashboard.providers_updated,
                &[
                    ("providers", self.providers.to_string()),
                    ("companies", self.companies.to_string()),
                ],
            ),
        }
    }
}

pub struct CountryWizard {
    mode: WizardMode,
    selected_code: Option<String>,
    draft: ProviderDraft,
    providers: Vec<Provider>,
    editing: Option<usize>,
    last_error: Option<String>,
    submitting: bool,
}

impl CountryWizard {
    pub fn new_add() -> Self {
        Self {
            mode: WizardMode::Add,
            selected_code: None,
            draft: ProviderDraft::default(),
            providers: Vec::new(),
            editing: None,
            last_error: None,
            submitting: false,
        }
    }

    pub fn new_edit(country: &Country) -> Self {
        log::info!(
            "✏️ [WIZARD] Editando {} ({} proveedores)",
            country.code,
            country.providers.len()
        );
        Self {
            mode: WizardMode::Edit {
                country_code: country.code.clone(),
            },
            providers: country.providers.clone(),
            ..Self::new_add()
        }
    }

    // ------------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------------

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn country_code(&self) -> Option<&str> {
        match &self.mode {
            WizardMode::Edit { country_code } => Some(country_code),
            WizardMode::Add => self.selected_code.as_deref(),
        }
    }

    pub fn draft(&self) -> &ProviderDraft {
        &self.draft
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn step(&self) -> WizardStep {
        if self.country_code().is_none() {
            WizardStep::SelectCountry
        } else if self.providers.is_empty() || self.editing.is_some() || !self.draft.is_blank() {
            WizardStep::BuildProvider
        } else {
            WizardStep::Review
        }
    }

    pub fn total_companies(&self) -> usize {
        self.providers.iter().map(|p| p.companies.len()).sum()
    }

    // ------------------------------------------------------------------------
    // Selección de país (modo añadir)
    // ------------------------------------------------------------------------

    pub fn select_country(&mut self, code: &str) -> Result<(), ValidationError> {
        if let WizardMode::Edit { country_code } = &self.mode {
            log::warn!("⚠️ [WIZARD] El país está fijado a {} en modo edición", country_code);
            return Ok(());
        }
        validate_country_code(code)?;
        self.selected_code = Some(code.trim().to_string());
        Ok(())
    }

    /// Volver al selector de país, descartando lo construido
    pub fn reset_country_selection(&mut self) {
        if self.mode == WizardMode::Add {
            self.selected_code = None;
            self.clear_building();
        }
    }

    // ------------------------------------------------------------------------
    // Borrador de proveedor
    // ------------------------------------------------------------------------

    pub fn set_provider_name(&mut self, name: &str) {
        self.draft.name = name.to_string();
    }

    pub fn set_provider_price(&mut self, price: f64) {
        self.draft.price = price;
    }

    pub fn add_company(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCompanyName);
        }
        self.draft.companies.push(ProviderCompany::new(name));
        Ok(())
    }

    pub fn remove_company(&mut self, index: usize) -> Result<ProviderCompany, ValidationError> {
        if index >= self.draft.companies.len() {
            return Err(ValidationError::UnknownCompany(index));
        }
        Ok(self.draft.companies.remove(index))
    }

    /// Añadir el borrador como proveedor nuevo, o reemplazar el que se edita
    pub fn commit_provider(&mut self) -> Result<(), ValidationError> {
        let provider = self.draft.build()?;
        match self.editing.take() {
            Some(index) if index < self.providers.len() => self.providers[index] = provider,
            _ => self.providers.push(provider),
        }
        self.draft = ProviderDraft::default();
        Ok(())
    }

    pub fn edit_provider(&mut self, index: usize) -> Result<(), ValidationError> {
        let provider = self
            .providers
            .get(index)
            .ok_or(ValidationError::UnknownProvider(index))?;
        self.draft = ProviderDraft {
            name: provider.name.clone(),
            price: provider.price,
            companies: provider.companies.clone(),
        };
        self.editing = Some(index);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft = ProviderDraft::default();
    }

    pub fn remove_provider(&mut self, index: usize) -> Result<Provider, ValidationError> {
        if index >= self.providers.len() {
            return Err(ValidationError::UnknownProvider(index));
        }
        match self.editing {
            Some(editing) if editing == index => self.cancel_edit(),
            Some(editing) if editing > index => self.editing = Some(editing - 1),
            _ => {}
        }
        Ok(self.providers.remove(index))
    }

    // ------------------------------------------------------------------------
    // Enviar / cerrar
    // ------------------------------------------------------------------------

    pub fn payload(&self) -> Result<PendingSubmission, ValidationError> {
        let country_code = self.country_code().ok_or(ValidationError::EmptyCountryCode)?;
        validate_country_code(country_code)?;
        if self.providers.is_empty() {
            return Err(ValidationError::NoProviders);
        }
        Ok(PendingSubmission {
            country_code: country_code.to_string(),
            providers: self.providers.clone(),
        })
    }

    /// Enviar todos los proveedores. Si va bien se limpia el asistente; si falla
    /// se conserva el borrador y el mensaje queda en `last_error()`.
    pub async fn submit<T: Transport>(
        &mut self,
        service: &CountriesService<T>,
    ) -> Result<SubmissionSummary, ApiError> {
        let payload = match self.payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.submitting = true;
        self.last_error = None;
        let outcome = service.submit(&payload).await;
        self.submitting = false;

        match outcome {
            Ok(_) => {
                let summary = SubmissionSummary {
                    providers: payload.providers.len(),
                    companies: payload.company_count(),
                };
                log::info!(
                    "✅ [WIZARD] {}: {} proveedores / {} empresas enviados",
                    payload.country_code,
                    summary.providers,
                    summary.companies
                );
                self.close();
                Ok(summary)
            }
            Err(e) => {
                log::error!("❌ [WIZARD] Envío de {} fallido: {}", payload.country_code, e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Descartar todo. En modo edición se mantiene el país.
    pub fn close(&mut self) {
        self.selected_code = None;
        self.providers.clear();
        self.clear_building();
    }

    fn clear_building(&mut self) {
        if self.mode == WizardMode::Add {
            self.providers.clear();
        }
        self.draft = ProviderDraft::default();
        self.editing = None;
        self.last_error = None;
        self.submitting = false;
    }
}

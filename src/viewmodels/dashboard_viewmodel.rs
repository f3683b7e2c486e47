// ============================================================================
// DASHBOARD VIEWMODEL - Guard de ruta, tabla de países, diálogo de borrado, navbar
// ============================================================================

use std::rc::Rc;
use chrono::{DateTime, Duration, Utc};
use crate::context::{format_template, get_dictionary, Dictionary, Locale};
use crate::error::ApiError;
use crate::models::Country;
use crate::services::countries_service::CountriesService;
use crate::services::transport::Transport;
use crate::stores::{AuthGate, AuthStore};
use crate::utils::SUCCESS_MESSAGE_MILLIS;

/// Resultado del guard de ruta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Sesión persistida aún sin restaurar, no pintar nada
    Wait,
    Stay,
    Redirect(String),
}

/// Una fila de la tabla de países
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRow {
    pub code: String,
    pub flag: String,
    pub name_en: String,
    pub name_ar: String,
    /// Nombre en el idioma actual
    pub display_name: String,
    pub price_label: String,
    pub companies_count: u32,
}

impl CountryRow {
    pub fn from_country(country: &Country, locale: Locale) -> Self {
        Self {
            code: country.code.clone(),
            flag: country.flag.clone(),
            name_en: country.country.clone(),
            name_ar: country.country_ar.clone().unwrap_or_default(),
            display_name: country.display_name(locale.is_rtl()).to_string(),
            price_label: format!("${}", country.price),
            companies_count: country.companies_count.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDialog {
    pub country_code: String,
    pub country_name: String,
}

#[derive(Debug, Clone, PartialEq)]
struct SuccessMessage {
    text: String,
    shown_at: DateTime<Utc>,
}

pub struct DashboardViewModel<T: Transport> {
    countries: Rc<CountriesService<T>>,
    store: AuthStore,
    locale: Locale,
    delete_dialog: Option<DeleteDialog>,
    deleting: bool,
    success: Option<SuccessMessage>,
}

impl<T: Transport> DashboardViewModel<T> {
    pub fn new(countries: Rc<CountriesService<T>>, store: AuthStore, locale: Locale) -> Self {
        Self {
            countries,
            store,
            locale,
            delete_dialog: None,
            deleting: false,
            success: None,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn dictionary(&self) -> &'static Dictionary {
        get_dictionary(self.locale)
    }

    /// Nada se decide antes de la hidratación. Después, sin token o sin flag
    /// se cierra la sesión y se redirige al login.
    pub fn guard(&self) -> RouteDecision {
        match self.store.gate() {
            AuthGate::Pending => RouteDecision::Wait,
            AuthGate::Authenticated => RouteDecision::Stay,
            AuthGate::Anonymous => {
                self.store.logout();
                log::info!("🔒 [DASHBOARD] Sin sesión, redirigiendo al login");
                RouteDecision::Redirect(self.locale.login_route())
            }
        }
    }

    pub async fn load_rows(&self) -> Result<Vec<CountryRow>, ApiError> {
        let countries = self.countries.list_countries().await?;
        Ok(countries
            .iter()
            .map(|c| CountryRow::from_country(c, self.locale))
            .collect())
    }

    /// Opciones del selector de país del diálogo Añadir: `(code, label)`
    pub async fn load_country_options(&self) -> Result<Vec<(String, String)>, ApiError> {
        let countries = self.countries.list_countries_for_adding().await?;
        Ok(countries
            .iter()
            .map(|c| (c.code.clone(), c.label(self.locale.is_rtl())))
            .collect())
    }

    // ------------------------------------------------------------------------
    // Diálogo de borrado (reset)
    // ------------------------------------------------------------------------

    pub fn request_delete(&mut self, row: &CountryRow) {
        self.delete_dialog = Some(DeleteDialog {
            country_code: row.code.clone(),
            country_name: row.display_name.clone(),
        });
    }

    pub fn delete_dialog(&self) -> Option<&DeleteDialog> {
        self.delete_dialog.as_ref()
    }

    pub fn delete_prompt(&self) -> Option<String> {
        self.delete_dialog.as_ref().map(|d| {
            format_template(
                &self.dictionary().dashboard.delete_message,
                &[("country", d.country_name.clone())],
            )
        })
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn cancel_delete(&mut self) {
        if !self.deleting {
            self.delete_dialog = None;
        }
    }

    /// Resetear el país del diálogo abierto. El diálogo se cierra siempre.
    pub async fn confirm_delete(&mut self) -> Result<(), ApiError> {
        let Some(dialog) = self.delete_dialog.clone() else {
            return Ok(());
        };

        self.deleting = true;
        let outcome = self.countries.reset_country(&dialog.country_code).await;
        self.deleting = false;
        self.delete_dialog = None;

        match outcome {
            Ok(_) => {
                log::info!("🗑️ [DASHBOARD] {} reseteado", dialog.country_code);
                Ok(())
            }
            Err(e) => {
                log::error!("❌ [DASHBOARD] Reset de {} fallido: {}", dialog.country_code, e);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Navbar + aviso de éxito
    // ------------------------------------------------------------------------

    pub fn show_logout(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Devuelve la ruta a la que navegar
    pub fn logout(&self) -> String {
        self.store.logout();
        self.locale.login_route()
    }

    pub fn switch_locale_path(&self, current_path: &str) -> String {
        self.locale.switch_path(current_path)
    }

    pub fn show_success(&mut self, text: impl Into<String>) {
        self.show_success_at(text, Utc::now());
    }

    pub fn show_success_at(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.success = Some(SuccessMessage {
            text: text.into(),
            shown_at: now,
        });
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success_message_at(Utc::now())
    }

    /// Texto del aviso mientras siga dentro de su ventana
    pub fn success_message_at(&self, now: DateTime<Utc>) -> Option<&str> {
        let success = self.success.as_ref()?;
        let window = Duration::milliseconds(i64::from(SUCCESS_MESSAGE_MILLIS));
        (now.signed_duration_since(success.shown_at) < window).then_some(success.text.as_str())
    }
}

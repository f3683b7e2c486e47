// ============================================================================
// APP - Raíz de composición
// ============================================================================
// Conecta storage + canal de auth -> AuthStore -> HttpClient -> servicios y
// entrega los view models del idioma actual.
// ============================================================================

use std::rc::Rc;
use crate::config::AppConfig;
use crate::context::Locale;
use crate::models::Country;
use crate::services::auth_service::AuthService;
use crate::services::broadcast::AuthChannel;
use crate::services::countries_service::CountriesService;
use crate::services::http_client::HttpClient;
use crate::services::transport::Transport;
use crate::stores::AuthStore;
use crate::utils::KeyValueStorage;
use crate::viewmodels::{CountryWizard, DashboardViewModel, LoginViewModel};

pub struct AdminApp<T: Transport> {
    store: AuthStore,
    client: Rc<HttpClient<T>>,
    countries: Rc<CountriesService<T>>,
    auth: Rc<AuthService<T>>,
    locale: Locale,
}

impl<T: Transport> AdminApp<T> {
    /// Construir el grafo de objetos y restaurar la sesión persistida
    pub fn new(
        config: &AppConfig,
        transport: T,
        storage: Rc<dyn KeyValueStorage>,
        channel: Rc<dyn AuthChannel>,
        locale: Locale,
    ) -> Self {
        let store = AuthStore::new(storage, channel);
        store.hydrate();

        let client = Rc::new(HttpClient::new(config.backend_url(), transport, store.clone()));
        let countries = Rc::new(CountriesService::new(client.clone(), config.cache_ttl()));
        let auth = Rc::new(AuthService::new(client.clone()));

        log::info!(
            "🚀 [APP] Dashboard IMS listo ({}, backend {}, idioma {})",
            config.environment,
            client.base_url(),
            locale.as_str()
        );

        Self {
            store,
            client,
            countries,
            auth,
            locale,
        }
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    pub fn client(&self) -> &HttpClient<T> {
        &self.client
    }

    pub fn countries(&self) -> Rc<CountriesService<T>> {
        self.countries.clone()
    }

    pub fn auth(&self) -> Rc<AuthService<T>> {
        self.auth.clone()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Se llama al navegar; el idioma es el primer segmento de la ruta
    pub fn navigate(&mut self, path: &str) {
        let locale = Locale::from_path(path);
        if locale != self.locale {
            log::info!("🌐 [APP] Idioma {} -> {}", self.locale.as_str(), locale.as_str());
            self.locale = locale;
        }
    }

    pub fn dashboard(&self) -> DashboardViewModel<T> {
        DashboardViewModel::new(self.countries.clone(), self.store.clone(), self.locale)
    }

    pub fn login_form(&self) -> LoginViewModel<T> {
        LoginViewModel::new(self.auth.clone(), self.store.clone(), self.locale)
    }

    pub fn add_wizard(&self) -> CountryWizard {
        CountryWizard::new_add()
    }

    pub fn edit_wizard(&self, country: &Country) -> CountryWizard {
        CountryWizard::new_edit(country)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AdminApp<crate::services::transport::ReqwestTransport> {
    /// Cliente nativo sobre reqwest. Sin sincronización entre pestañas.
    pub fn native(
        config: &AppConfig,
        storage: Rc<dyn KeyValueStorage>,
        locale: Locale,
    ) -> Result<Self, crate::error::TransportError> {
        let transport = crate::services::transport::ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::new(
            config,
            transport,
            storage,
            Rc::new(crate::services::broadcast::NoopChannel),
            locale,
        ))
    }
}

#[cfg(target_arch = "wasm32")]
impl AdminApp<crate::services::transport::GlooTransport> {
    /// App de navegador: localStorage, BroadcastChannel y fetch
    pub fn browser(config: &AppConfig) -> Self {
        use crate::services::broadcast::{BrowserAuthChannel, NoopChannel};
        use crate::services::transport::GlooTransport;
        use crate::utils::{BrowserStorage, AUTH_CHANNEL_NAME};

        let channel: Rc<dyn AuthChannel> = match BrowserAuthChannel::open(AUTH_CHANNEL_NAME) {
            Ok(channel) => Rc::new(channel),
            Err(e) => {
                log::warn!("⚠️ [APP] {}; las pestañas no se sincronizarán", e);
                Rc::new(NoopChannel)
            }
        };

        let locale = web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .and_then(|path| {
                path.trim_start_matches('/')
                    .split('/')
                    .next()
                    .and_then(Locale::parse)
            })
            .unwrap_or_else(|| Locale::from_segment(&config.default_locale));

        Self::new(
            config,
            GlooTransport::new(config.request_timeout()),
            Rc::new(BrowserStorage),
            channel,
            locale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::broadcast::NoopChannel;
    use crate::services::transport::{HttpResponse, MemoryTransport};
    use crate::utils::MemoryStorage;

    fn app() -> AdminApp<MemoryTransport> {
        AdminApp::new(
            &AppConfig::default(),
            MemoryTransport::always(HttpResponse::new(200, "{}")),
            Rc::new(MemoryStorage::new()),
            Rc::new(NoopChannel),
            Locale::English,
        )
    }

    #[test]
    fn store_is_hydrated_on_start() {
        let app = app();
        assert!(app.store().has_hydrated());
        assert!(!app.store().is_authenticated());
    }

    #[test]
    fn navigation_switches_locale() {
        let mut app = app();
        app.navigate("/ar/login");
        assert_eq!(app.locale(), Locale::Arabic);
        assert_eq!(app.dashboard().locale(), Locale::Arabic);
        assert_eq!(app.login_form().locale(), Locale::Arabic);
    }
}

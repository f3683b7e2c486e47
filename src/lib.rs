// ============================================================================
// IMS DASHBOARD - Cliente de administración para el backend de países IMS
// ============================================================================
// - Stores:     AuthStore (persistido, sincronizado entre pestañas)
// - Services:   pipeline HttpClient, acceso a países, login
// - ViewModels: formulario de login, dashboard, asistentes de país
// - Context:    idioma en/ar y diccionarios
// ============================================================================

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod stores;
pub mod utils;
pub mod viewmodels;

pub use app::AdminApp;
pub use config::{AppConfig, CONFIG};
pub use error::{ApiError, ValidationError};

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use wasm_bindgen::prelude::*;
    use crate::app::AdminApp;
    use crate::config::CONFIG;
    use crate::services::transport::GlooTransport;

    // La app vive mientras viva la página
    thread_local! {
        static APP: RefCell<Option<AdminApp<GlooTransport>>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        if CONFIG.is_logging_enabled() {
            wasm_logger::init(wasm_logger::Config::default());
        }
        log::info!("🚀 IMS Dashboard - {}", CONFIG.environment);

        let app = AdminApp::browser(&CONFIG);
        APP.with(|cell| *cell.borrow_mut() = Some(app));
        Ok(())
    }

    /// Aviso de cambio de ruta desde la página anfitriona
    #[wasm_bindgen]
    pub fn navigate(path: &str) {
        APP.with(|cell| {
            if let Some(app) = cell.borrow_mut().as_mut() {
                app.navigate(path);
            } else {
                log::warn!("⚠️ [APP] navigate() antes de start");
            }
        });
    }

    #[wasm_bindgen]
    pub fn is_authenticated() -> bool {
        APP.with(|cell| {
            cell.borrow()
                .as_ref()
                .is_some_and(|app| app.store().is_authenticated())
        })
    }

    #[wasm_bindgen]
    pub fn logout() {
        APP.with(|cell| {
            if let Some(app) = cell.borrow().as_ref() {
                app.store().logout();
            }
        });
    }
}

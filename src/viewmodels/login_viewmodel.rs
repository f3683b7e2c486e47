// ============================================================================
// LOGIN VIEWMODEL - Estado del formulario de login + envío
// ============================================================================

use std::rc::Rc;
use crate::context::{get_dictionary, Locale};
use crate::error::{ApiError, ValidationError};
use crate::services::auth_service::AuthService;
use crate::services::transport::Transport;
use crate::stores::{AuthGate, AuthStore};

/// Mensajes bajo el formulario, ya traducidos
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFormErrors {
    pub username: Option<String>,
    pub password: Option<String>,
    pub api: Option<String>,
}

impl LoginFormErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.api.is_none()
    }
}

pub struct LoginViewModel<T: Transport> {
    auth: Rc<AuthService<T>>,
    store: AuthStore,
    locale: Locale,
    errors: LoginFormErrors,
    submitting: bool,
}

impl<T: Transport> LoginViewModel<T> {
    pub fn new(auth: Rc<AuthService<T>>, store: AuthStore, locale: Locale) -> Self {
        Self {
            auth,
            store,
            locale,
            errors: LoginFormErrors::default(),
            submitting: false,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn errors(&self) -> &LoginFormErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Ya hay sesión: ir directamente al dashboard
    pub fn redirect_if_authenticated(&self) -> Option<String> {
        match self.store.gate() {
            AuthGate::Authenticated => Some(self.locale.home_route()),
            AuthGate::Pending | AuthGate::Anonymous => None,
        }
    }

    /// Devuelve la ruta a la que navegar si va bien. Los errores también quedan
    /// en [`LoginViewModel::errors`] para mostrarlos.
    pub async fn submit(&mut self, username: &str, password: &str) -> Result<String, ApiError> {
        let dict = get_dictionary(self.locale);
        self.errors = LoginFormErrors::default();

        if username.trim().is_empty() {
            self.errors.username = Some(dict.login.errors.required.clone());
        }
        if password.is_empty() {
            self.errors.password = Some(dict.login.errors.required.clone());
        }
        if self.errors.username.is_some() {
            return Err(ValidationError::EmptyUsername.into());
        }
        if self.errors.password.is_some() {
            return Err(ValidationError::EmptyPassword.into());
        }

        self.submitting = true;
        let outcome = self.auth.perform_login(username, password).await;
        self.submitting = false;

        match outcome {
            Ok(_) => Ok(self.locale.home_route()),
            Err(e) => {
                let message = match &e {
                    ApiError::LoginRejected(Some(msg)) => msg.clone(),
                    _ => dict.login.errors.invalid_credentials.clone(),
                };
                log::warn!("🔒 Login fallido: {}", e);
                self.errors.api = Some(message);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::error::TransportError;
    use crate::services::broadcast::NoopChannel;
    use crate::services::http_client::HttpClient;
    use crate::services::transport::{HttpResponse, MemoryTransport};
    use crate::utils::MemoryStorage;

    fn view_model(transport: MemoryTransport, locale: Locale) -> LoginViewModel<MemoryTransport> {
        let store = AuthStore::new(Rc::new(MemoryStorage::new()), Rc::new(NoopChannel));
        store.hydrate();
        let client = Rc::new(HttpClient::new("http://api", transport, store.clone()));
        LoginViewModel::new(Rc::new(AuthService::new(client)), store, locale)
    }

    #[tokio::test]
    async fn required_fields_use_the_dictionary() {
        let mut vm = view_model(MemoryTransport::always(HttpResponse::new(200, "{}")), Locale::Arabic);
        let err = vm.submit("", "").await.unwrap_err();

        assert_eq!(err, ApiError::Validation(ValidationError::EmptyUsername));
        let required = &get_dictionary(Locale::Arabic).login.errors.required;
        assert_eq!(vm.errors().username.as_ref(), Some(required));
        assert_eq!(vm.errors().password.as_ref(), Some(required));
    }

    #[tokio::test]
    async fn success_redirects_home() {
        let mut vm = view_model(
            MemoryTransport::always(HttpResponse::json_value(
                200,
                &json!({
                    "success": true,
                    "data": { "user": { "id": "1", "username": "ops", "role": "admin" }, "token": "t" }
                }),
            )),
            Locale::Arabic,
        );

        assert_eq!(vm.redirect_if_authenticated(), None);
        assert_eq!(vm.submit("ops", "pw").await.unwrap(), "/ar");
        assert!(vm.errors().is_empty());
        assert_eq!(vm.redirect_if_authenticated().as_deref(), Some("/ar"));
    }

    #[tokio::test]
    async fn rejection_shows_server_message_or_generic_text() {
        let mut vm = view_model(
            MemoryTransport::always(HttpResponse::json_value(
                401,
                &json!({ "success": false, "error": "Account locked" }),
            )),
            Locale::English,
        );
        vm.submit("ops", "pw").await.unwrap_err();
        assert_eq!(vm.errors().api.as_deref(), Some("Account locked"));

        let mut offline = view_model(
            MemoryTransport::new(|_| Err(TransportError::Network("offline".into()))),
            Locale::English,
        );
        offline.submit("ops", "pw").await.unwrap_err();
        assert_eq!(
            offline.errors().api.as_deref(),
            Some("Invalid username or password")
        );
    }
}

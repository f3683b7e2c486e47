use std::rc::Rc;
use crate::error::{ApiError, ValidationError};
use crate::models::{ApiEnvelope, LoginPayload, LoginRequest};
use crate::services::http_client::{Access, HttpClient};
use crate::services::transport::Transport;
use crate::utils::LOGIN_PATH;

/// Login con credenciales contra `POST auth/login`
pub struct AuthService<T: Transport> {
    client: Rc<HttpClient<T>>,
}

impl<T: Transport> AuthService<T> {
    pub fn new(client: Rc<HttpClient<T>>) -> Self {
        Self { client }
    }

    /// Hacer login y pasar la sesión al store si tiene éxito
    pub async fn perform_login(&self, username: &str, password: &str) -> Result<LoginPayload, ApiError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }

        log::info!("🔐 Iniciando sesión como {}...", username);
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = match self
            .client
            .post_json(LOGIN_PATH, &request, Access::Public)
            .await
        {
            Ok(response) => response,
            Err(ApiError::Http { status, message }) => {
                log::warn!("🔒 Login rechazado (HTTP {})", status);
                return Err(ApiError::LoginRejected(message));
            }
            Err(e) => return Err(e),
        };

        let envelope: ApiEnvelope = response
            .json()
            .map_err(|e| {
                log::error!("❌ Respuesta de login ilegible: {}", e);
                ApiError::LoginRejected(None)
            })?;

        let payload = match (envelope.success, envelope.data.clone()) {
            (true, Some(data)) => serde_json::from_value::<LoginPayload>(data).map_err(|e| {
                log::error!("❌ Respuesta de login sin user/token: {}", e);
                ApiError::LoginRejected(None)
            })?,
            _ => return Err(ApiError::LoginRejected(envelope.error_message())),
        };

        if payload.token.is_empty() {
            return Err(ApiError::LoginRejected(None));
        }

        self.client.store().login(payload.clone());
        log::info!("✅ Login exitoso: {} ({})", payload.user.username, payload.user.role);
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::services::broadcast::LocalChannelHub;
    use crate::services::transport::{HttpResponse, Method, MemoryTransport};
    use crate::stores::AuthStore;
    use crate::utils::MemoryStorage;

    fn service(response: HttpResponse) -> (AuthService<MemoryTransport>, Rc<HttpClient<MemoryTransport>>, LocalChannelHub) {
        let hub = LocalChannelHub::new();
        let store = AuthStore::new(Rc::new(MemoryStorage::new()), Rc::new(hub.endpoint()));
        store.hydrate();
        let client = Rc::new(HttpClient::new("http://api", MemoryTransport::always(response), store));
        (AuthService::new(client.clone()), client, hub)
    }

    #[tokio::test]
    async fn successful_login_populates_store() {
        let (auth, client, hub) = service(HttpResponse::json_value(
            200,
            &json!({
                "success": true,
                "data": {
                    "user": { "id": "7", "username": "ops", "role": "admin" },
                    "token": "jwt-1"
                }
            }),
        ));

        let payload = auth.perform_login(" ops ", "secret").await.unwrap();
        assert_eq!(payload.token, "jwt-1");
        assert_eq!(client.store().token().as_deref(), Some("jwt-1"));
        assert!(client.store().is_authenticated());
        assert_eq!(hub.posted(), 1);

        let sent = client.transport().last_request().unwrap();
        assert_eq!(sent.method, Method::Post);
        assert!(sent.url.ends_with("/auth/login"));
        assert_eq!(
            sent.json_body::<serde_json::Value>().unwrap(),
            json!({ "username": "ops", "password": "secret" })
        );
    }

    #[tokio::test]
    async fn rejection_carries_server_message() {
        let (auth, client, _) = service(HttpResponse::json_value(
            401,
            &json!({ "success": false, "error": "Invalid credentials" }),
        ));

        let err = auth.perform_login("ops", "wrong").await.unwrap_err();
        assert_eq!(err, ApiError::LoginRejected(Some("Invalid credentials".into())));
        assert!(!client.store().is_authenticated());
    }

    #[tokio::test]
    async fn unsuccessful_envelope_is_rejected() {
        let (auth, client, _) = service(HttpResponse::json_value(200, &json!({ "success": false })));
        assert_eq!(
            auth.perform_login("ops", "pw").await.unwrap_err(),
            ApiError::LoginRejected(None)
        );
        assert!(!client.store().is_authenticated());
    }

    #[tokio::test]
    async fn missing_credentials_never_hit_the_network() {
        let (auth, client, _) = service(HttpResponse::new(200, "{}"));
        assert_eq!(
            auth.perform_login("  ", "pw").await.unwrap_err(),
            ApiError::Validation(ValidationError::EmptyUsername)
        );
        assert_eq!(
            auth.perform_login("ops", "").await.unwrap_err(),
            ApiError::Validation(ValidationError::EmptyPassword)
        );
        assert_eq!(client.transport().request_count(), 0);
    }
}

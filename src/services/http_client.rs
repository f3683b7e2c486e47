// ============================================================================
// HTTP CLIENT - Pipeline único para todas las llamadas al backend
// ============================================================================
// Interceptor de petición:  Content-Type JSON + token Bearer leído en cada llamada
// Interceptor de respuesta: 401 -> AuthStore::logout() + ApiError::Unauthenticated
// Sin reintentos. El resto de fallos pasan sin cambios.
// ============================================================================

use serde::Serialize;
use crate::error::ApiError;
use crate::models::ApiEnvelope;
use crate::services::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::stores::AuthStore;
use crate::utils::{CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};

/// Si la petición pasa por la inyección de token y el manejo del 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Authorized,
    /// Solo login: sin token, y un 401 son credenciales malas, no sesión caducada
    Public,
}

pub struct HttpClient<T: Transport> {
    base_url: String,
    transport: T,
    store: AuthStore,
}

impl<T: Transport> HttpClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T, store: AuthStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            store,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse, ApiError> {
        self.send(HttpRequest::new(Method::Get, self.url(path)), Access::Authorized)
            .await
    }

    pub async fn patch_json<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpResponse, ApiError> {
        let request = self.json_request(Method::Patch, path, body)?;
        self.send(request, Access::Authorized).await
    }

    pub async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        access: Access,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.json_request(Method::Post, path, body)?;
        self.send(request, access).await
    }

    fn json_request<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let mut request = HttpRequest::new(method, self.url(path));
        let json = serde_json::to_string(body)
            .map_err(|e| ApiError::Network(format!("Serialization error: {}", e)))?;
        request.body = Some(json);
        Ok(request)
    }

    pub async fn send(&self, request: HttpRequest, access: Access) -> Result<HttpResponse, ApiError> {
        let request = self.intercept_request(request, access);
        log::debug!("🌐 [HTTP] {} {}", request.method.as_str(), request.url);
        let outcome = self.transport.send(request).await;
        self.intercept_response(outcome.map_err(ApiError::from), access)
    }

    fn intercept_request(&self, mut request: HttpRequest, access: Access) -> HttpRequest {
        request.set_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);

        let token = match access {
            Access::Authorized => self.store.token().filter(|t| !t.is_empty()),
            Access::Public => None,
        };
        match token {
            Some(token) => request.set_header(HEADER_AUTHORIZATION, format!("Bearer {}", token)),
            // Nunca enviar un header Authorization vacío
            None => request.remove_header(HEADER_AUTHORIZATION),
        }
        request
    }

    fn intercept_response(
        &self,
        outcome: Result<HttpResponse, ApiError>,
        access: Access,
    ) -> Result<HttpResponse, ApiError> {
        let response = outcome?;
        if response.ok() {
            return Ok(response);
        }

        if response.status == 401 && access == Access::Authorized {
            log::warn!("🔒 [HTTP] 401 recibido, cerrando sesión");
            self.store.logout();
            return Err(ApiError::Unauthenticated);
        }

        let message = response
            .json::<ApiEnvelope>()
            .ok()
            .and_then(|env| env.error_message());
        log::warn!("⚠️ [HTTP] Estado {}: {:?}", response.status, message);
        Err(ApiError::Http {
            status: response.status,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use serde_json::json;
    use crate::error::TransportError;
    use crate::models::{LoginPayload, UserData};
    use crate::services::broadcast::LocalChannelHub;
    use crate::services::transport::MemoryTransport;
    use crate::utils::MemoryStorage;

    fn hydrated_store(hub: &LocalChannelHub) -> AuthStore {
        let store = AuthStore::new(Rc::new(MemoryStorage::new()), Rc::new(hub.endpoint()));
        store.hydrate();
        store
    }

    fn login(store: &AuthStore, token: &str) {
        store.login(LoginPayload {
            user: UserData {
                id: "1".into(),
                username: "ops".into(),
                role: "admin".into(),
            },
            token: token.into(),
        });
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let hub = LocalChannelHub::new();
        let store = hydrated_store(&hub);
        let client = HttpClient::new(
            "http://localhost:3000/api/",
            MemoryTransport::always(HttpResponse::new(200, "{}")),
            store,
        );

        client.get("countries").await.unwrap();
        let sent = client.transport().last_request().unwrap();
        assert_eq!(sent.url, "http://localhost:3000/api/countries");
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        assert!(sent.header("Authorization").is_none());
    }

    #[tokio::test]
    async fn token_is_read_at_call_time() {
        let hub = LocalChannelHub::new();
        let store = hydrated_store(&hub);
        let client = HttpClient::new(
            "http://api",
            MemoryTransport::always(HttpResponse::new(200, "{}")),
            store.clone(),
        );

        login(&store, "first");
        client.get("countries").await.unwrap();
        login(&store, "second");
        client.get("countries").await.unwrap();

        let auth: Vec<Option<String>> = client
            .transport()
            .requests()
            .iter()
            .map(|r| r.header("Authorization").map(str::to_string))
            .collect();
        assert_eq!(
            auth,
            vec![Some("Bearer first".to_string()), Some("Bearer second".to_string())]
        );
    }

    #[tokio::test]
    async fn unauthorized_logs_out_exactly_once() {
        let hub = LocalChannelHub::new();
        let store = hydrated_store(&hub);
        login(&store, "expired");
        let posted_before = hub.posted();

        let client = HttpClient::new(
            "http://api",
            MemoryTransport::always(HttpResponse::json_value(401, &json!({ "error": "expired" }))),
            store.clone(),
        );

        let err = client.get("countries").await.unwrap_err();
        assert_eq!(err, ApiError::Unauthenticated);
        assert!(!store.is_authenticated());
        assert_eq!(hub.posted() - posted_before, 1);

        // Ya anónimo: el segundo 401 no vuelve a emitir
        let err = client.get("countries").await.unwrap_err();
        assert!(err.is_unauthenticated());
        assert_eq!(hub.posted() - posted_before, 1);
    }

    #[tokio::test]
    async fn public_requests_skip_token_and_logout() {
        let hub = LocalChannelHub::new();
        let store = hydrated_store(&hub);
        login(&store, "live");

        let client = HttpClient::new(
            "http://api",
            MemoryTransport::always(HttpResponse::json_value(
                401,
                &json!({ "success": false, "error": "Invalid credentials" }),
            )),
            store.clone(),
        );

        let err = client
            .post_json("auth/login", &json!({ "username": "a", "password": "b" }), Access::Public)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 401,
                message: Some("Invalid credentials".into())
            }
        );
        assert!(store.is_authenticated());
        assert!(client.transport().last_request().unwrap().header("Authorization").is_none());
    }

    #[tokio::test]
    async fn transport_and_status_errors_pass_through() {
        let hub = LocalChannelHub::new();
        let store = hydrated_store(&hub);
        login(&store, "t");

        let offline = HttpClient::new(
            "http://api",
            MemoryTransport::new(|_| Err(TransportError::Network("connection refused".into()))),
            store.clone(),
        );
        assert_eq!(
            offline.get("countries").await.unwrap_err(),
            ApiError::Network("connection refused".into())
        );

        let failing = HttpClient::new(
            "http://api",
            MemoryTransport::always(HttpResponse::new(503, "Service Unavailable")),
            store.clone(),
        );
        assert_eq!(
            failing.get("countries").await.unwrap_err(),
            ApiError::Http {
                status: 503,
                message: None
            }
        );
        assert_eq!(failing.transport().request_count(), 1);
        assert!(store.is_authenticated());
    }
}

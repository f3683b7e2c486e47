// ============================================================================
// TRANSPORT - Petición/respuesta en bruto, sin lógica de negocio
// ============================================================================
// wasm32: fetch de gloo-net con AbortController (timeout + abort al soltar)
// nativo: reqwest
// tests:  MemoryTransport con un handler programado
// ============================================================================

use std::cell::RefCell;
use std::time::Duration;
use serde::de::DeserializeOwned;
use crate::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Buscar un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Reemplazar el header con el mismo nombre si existe
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.remove_header(name);
        self.headers.push((name.to_string(), value.into()));
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn json_body<T: DeserializeOwned>(&self) -> Option<T> {
        self.body.as_deref().and_then(|b| serde_json::from_str(b).ok())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json_value(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Frontera entre el cliente HTTP y la red.
///
/// Soltar el future devuelto cancela la petición.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::rc::Rc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

// ----------------------------------------------------------------------------
// Transporte en memoria
// ----------------------------------------------------------------------------

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError>>;

/// Responde con una closure y registra todo lo recibido
pub struct MemoryTransport {
    handler: Handler,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MemoryTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Todas las peticiones reciben la misma respuesta
    pub fn always(response: HttpResponse) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn count_matching(&self, method: Method, url_suffix: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(url_suffix))
            .count()
    }
}

impl Transport for MemoryTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        (self.handler)(&request)
    }
}

// ----------------------------------------------------------------------------
// Transporte nativo
// ----------------------------------------------------------------------------

#[cfg(not(target_arch = "wasm32"))]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let timeout = self.timeout;
        let map_err = move |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Network(e.to_string())
            }
        };

        let response = builder.send().await.map_err(map_err)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_err)?;
        Ok(HttpResponse { status, body })
    }
}

// ----------------------------------------------------------------------------
// Transporte del navegador
// ----------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
pub struct GlooTransport {
    timeout: Duration,
}

#[cfg(target_arch = "wasm32")]
impl GlooTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

/// Aborta el fetch si se suelta el future antes de terminar
#[cfg(target_arch = "wasm32")]
struct AbortOnDrop {
    controller: web_sys::AbortController,
    finished: bool,
}

#[cfg(target_arch = "wasm32")]
impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if !self.finished {
            log::info!("🛑 [HTTP] Petición soltada, abortando fetch");
            self.controller.abort();
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Transport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        use std::cell::Cell;
        use std::rc::Rc;
        use gloo_net::http::RequestBuilder;

        let controller = web_sys::AbortController::new()
            .map_err(|e| TransportError::Network(format!("{:?}", e)))?;
        let signal = controller.signal();
        let mut guard = AbortOnDrop {
            controller: controller.clone(),
            finished: false,
        };

        let timed_out = Rc::new(Cell::new(false));
        let flag = timed_out.clone();
        let millis = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
        // Soltar el Timeout lo cancela
        let _timer = gloo_timers::callback::Timeout::new(millis, move || {
            flag.set(true);
            controller.abort();
        });

        let mut builder = match request.method {
            Method::Get => RequestBuilder::new(&request.url).method(gloo_net::http::Method::GET),
            Method::Post => RequestBuilder::new(&request.url).method(gloo_net::http::Method::POST),
            Method::Patch => RequestBuilder::new(&request.url).method(gloo_net::http::Method::PATCH),
        };
        builder = builder.abort_signal(Some(&signal));
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let prepared = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError::Network(e.to_string()))?;

        let outcome = prepared.send().await;
        guard.finished = true;

        let response = outcome.map_err(|e| {
            if timed_out.get() {
                TransportError::Timeout(self.timeout)
            } else if signal.aborted() {
                TransportError::Cancelled
            } else {
                TransportError::Network(e.to_string())
            }
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

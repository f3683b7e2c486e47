// ============================================================================
// AUTH CHANNEL - Mensajes de login/logout entre pestañas
// ============================================================================
// Navegador: BroadcastChannel("auth_channel").
// Nativo/tests: LocalChannelHub, un endpoint por pestaña simulada.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use crate::error::ChannelError;
use crate::models::AuthEvent;

pub type AuthEventHandler = Box<dyn Fn(AuthEvent)>;

/// Pub/sub que usa el AuthStore.
///
/// Un evento publicado llega a todos los *demás* endpoints del canal,
/// nunca al emisor.
pub trait AuthChannel {
    fn post(&self, event: &AuthEvent) -> Result<(), ChannelError>;
    fn on_message(&self, handler: AuthEventHandler);
}

/// Canal para una sola pestaña: lo publicado no llega a nadie
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChannel;

impl AuthChannel for NoopChannel {
    fn post(&self, _event: &AuthEvent) -> Result<(), ChannelError> {
        Ok(())
    }

    fn on_message(&self, _handler: AuthEventHandler) {}
}

fn decode(raw: &str) -> Option<AuthEvent> {
    match serde_json::from_str::<AuthEvent>(raw) {
        Ok(event) => Some(event),
        Err(e) => {
            log::warn!("⚠️ [AUTH_CHANNEL] Mensaje mal formado descartado: {}", e);
            None
        }
    }
}

// ----------------------------------------------------------------------------
// Hub en memoria
// ----------------------------------------------------------------------------

struct Endpoint {
    id: usize,
    handlers: Vec<Rc<dyn Fn(AuthEvent)>>,
}

#[derive(Default)]
struct HubInner {
    endpoints: Vec<Endpoint>,
    queue: VecDeque<(usize, String)>,
}

/// Sustituto en proceso de un `BroadcastChannel` del navegador.
///
/// Los mensajes se encolan como JSON y se entregan en [`LocalChannelHub::flush`],
/// igual que la entrega asíncrona del navegador.
#[derive(Clone, Default)]
pub struct LocalChannelHub {
    inner: Rc<RefCell<HubInner>>,
    posted: Rc<Cell<usize>>,
}

impl LocalChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abrir un endpoint nuevo (uno por pestaña)
    pub fn endpoint(&self) -> LocalAuthChannel {
        let mut inner = self.inner.borrow_mut();
        let id = inner.endpoints.len();
        inner.endpoints.push(Endpoint {
            id,
            handlers: Vec::new(),
        });
        LocalAuthChannel {
            hub: self.clone(),
            id,
        }
    }

    /// Total de mensajes publicados en el hub
    pub fn posted(&self) -> usize {
        self.posted.get()
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Entregar mensajes hasta vaciar la cola, incluidos los que publiquen los
    /// handlers durante la entrega. Devuelve el número de entregas.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.inner.borrow_mut().queue.pop_front();
            let Some((sender, raw)) = next else { break };
            let Some(event) = decode(&raw) else { continue };

            let targets: Vec<Rc<dyn Fn(AuthEvent)>> = self
                .inner
                .borrow()
                .endpoints
                .iter()
                .filter(|e| e.id != sender)
                .flat_map(|e| e.handlers.iter().cloned())
                .collect();

            for handler in targets {
                handler(event.clone());
                delivered += 1;
            }
        }
        delivered
    }
}

/// Vista de una pestaña sobre un [`LocalChannelHub`]
#[derive(Clone)]
pub struct LocalAuthChannel {
    hub: LocalChannelHub,
    id: usize,
}

impl AuthChannel for LocalAuthChannel {
    fn post(&self, event: &AuthEvent) -> Result<(), ChannelError> {
        let raw = serde_json::to_string(event).map_err(|e| ChannelError::Encode(e.to_string()))?;
        self.hub.inner.borrow_mut().queue.push_back((self.id, raw));
        self.hub.posted.set(self.hub.posted.get() + 1);
        Ok(())
    }

    fn on_message(&self, handler: AuthEventHandler) {
        let mut inner = self.hub.inner.borrow_mut();
        if let Some(endpoint) = inner.endpoints.iter_mut().find(|e| e.id == self.id) {
            endpoint.handlers.push(Rc::from(handler));
        }
    }
}

// ----------------------------------------------------------------------------
// BroadcastChannel del navegador
// ----------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
pub struct BrowserAuthChannel {
    channel: web_sys::BroadcastChannel,
}

#[cfg(target_arch = "wasm32")]
impl BrowserAuthChannel {
    pub fn open(name: &str) -> Result<Self, ChannelError> {
        let channel = web_sys::BroadcastChannel::new(name).map_err(|_| ChannelError::Unavailable)?;
        log::info!("📡 [AUTH_CHANNEL] Canal `{}` abierto", name);
        Ok(Self { channel })
    }
}

#[cfg(target_arch = "wasm32")]
impl AuthChannel for BrowserAuthChannel {
    fn post(&self, event: &AuthEvent) -> Result<(), ChannelError> {
        let raw = serde_json::to_string(event).map_err(|e| ChannelError::Encode(e.to_string()))?;
        // Publicar un objeto estructurado, no un string, para otros clientes del canal
        let value = js_sys::JSON::parse(&raw).map_err(|e| ChannelError::Encode(format!("{:?}", e)))?;
        self.channel
            .post_message(&value)
            .map_err(|e| ChannelError::Post(format!("{:?}", e)))
    }

    fn on_message(&self, handler: AuthEventHandler) {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;

        let closure = Closure::wrap(Box::new(move |message: web_sys::MessageEvent| {
            let raw = js_sys::JSON::stringify(&message.data())
                .ok()
                .and_then(|s| s.as_string());
            if let Some(event) = raw.as_deref().and_then(decode) {
                handler(event);
            }
        }) as Box<dyn FnMut(web_sys::MessageEvent)>);

        self.channel
            .set_onmessage(Some(closure.as_ref().unchecked_ref()));
        // El canal vive lo mismo que la app; la closure vive con él
        closure.forget();
    }
}

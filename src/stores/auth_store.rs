// ============================================================================
// AUTH STORE - Estado de sesión global del proceso
// ============================================================================
// Ciclo de vida: Uninitialized -> Hydrating -> Hydrated(autenticado | anónimo)
// Cada login/logout efectivo se persiste y se emite a las otras pestañas.
// Los eventos recibidos se aplican localmente sin reenviarlos.
// ============================================================================

use std::cell::Cell;
use std::rc::{Rc, Weak};
use crate::models::{AuthEvent, LoginPayload, PersistedSession, Session, UserData};
use crate::services::broadcast::AuthChannel;
use crate::state::{ReactiveState, SubscriptionId};
use crate::utils::{load_from_storage, save_to_storage, KeyValueStorage, STORAGE_KEY_AUTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationPhase {
    Uninitialized,
    Hydrating,
    Hydrated,
}

/// Lo que un guard de ruta puede concluir del store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGate {
    /// Estado persistido aún sin restaurar; la autenticación no es fiable
    Pending,
    Authenticated,
    Anonymous,
}

struct AuthStoreInner {
    session: ReactiveState<Session>,
    phase: Cell<HydrationPhase>,
    storage: Rc<dyn KeyValueStorage>,
    channel: Rc<dyn AuthChannel>,
}

/// Handle compartido; los clones apuntan a la misma sesión
#[derive(Clone)]
pub struct AuthStore {
    inner: Rc<AuthStoreInner>,
}

impl AuthStore {
    /// Crear el store y escuchar el canal de auth.
    /// Llamar a [`AuthStore::hydrate`] antes de fiarse de `is_authenticated`.
    pub fn new(storage: Rc<dyn KeyValueStorage>, channel: Rc<dyn AuthChannel>) -> Self {
        let inner = Rc::new(AuthStoreInner {
            session: ReactiveState::new(Session::default()),
            phase: Cell::new(HydrationPhase::Uninitialized),
            storage,
            channel,
        });

        // Weak: el canal no debe mantener vivo el store
        let weak: Weak<AuthStoreInner> = Rc::downgrade(&inner);
        inner.channel.on_message(Box::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                AuthStore { inner }.apply_remote(event);
            }
        }));

        Self { inner }
    }

    // ------------------------------------------------------------------------
    // Hidratación
    // ------------------------------------------------------------------------

    /// Restaurar la sesión persistida (si existe) y activar `has_hydrated`.
    /// Solo se ejecuta una vez.
    pub fn hydrate(&self) {
        if self.inner.phase.get() != HydrationPhase::Uninitialized {
            log::warn!("⚠️ [AUTH] hydrate() llamado dos veces, se ignora");
            return;
        }
        self.inner.phase.set(HydrationPhase::Hydrating);

        let restored = load_from_storage::<PersistedSession>(self.inner.storage.as_ref(), STORAGE_KEY_AUTH)
            .and_then(|persisted| persisted.state.into_login());

        match restored {
            Some(payload) => {
                log::info!("✅ [AUTH] Sesión restaurada para {}", payload.user.username);
                self.inner.session.update(|s| {
                    s.apply_login(payload);
                    true
                });
            }
            None => log::info!("ℹ️ [AUTH] Sin sesión persistida, se inicia como anónimo"),
        }

        self.set_has_hydrated(true);
    }

    /// La capa de persistencia lo llama cuando el estado previo está restaurado
    pub fn set_has_hydrated(&self, value: bool) {
        if value {
            self.inner.phase.set(HydrationPhase::Hydrated);
        }
        self.inner.session.update(|s| {
            if s.has_hydrated == value {
                return false;
            }
            s.has_hydrated = value;
            true
        });
    }

    pub fn phase(&self) -> HydrationPhase {
        self.inner.phase.get()
    }

    // ------------------------------------------------------------------------
    // Mutaciones
    // ------------------------------------------------------------------------

    /// Guardar la sesión y avisar a las otras pestañas. No hace nada si ya hay
    /// sesión con el mismo usuario y token.
    pub fn login(&self, payload: LoginPayload) {
        if self.apply_login(payload.clone()) {
            log::info!("🔐 [AUTH] Login como {}", payload.user.username);
            self.broadcast(&AuthEvent::Login(payload));
        }
    }

    /// Cerrar la sesión y avisar a las otras pestañas. No hace nada sin sesión.
    pub fn logout(&self) {
        if self.apply_logout() {
            log::info!("🚪 [AUTH] Sesión cerrada");
            self.broadcast(&AuthEvent::Logout);
        }
    }

    /// Aplicar un evento de otra pestaña. Nunca se reenvía.
    fn apply_remote(&self, event: AuthEvent) {
        match event {
            AuthEvent::Login(payload) => {
                if self.apply_login(payload) {
                    log::info!("🔄 [AUTH] Login recibido de otra pestaña");
                }
            }
            AuthEvent::Logout => {
                if self.apply_logout() {
                    log::info!("🔄 [AUTH] Logout recibido de otra pestaña");
                }
            }
        }
    }

    fn apply_login(&self, payload: LoginPayload) -> bool {
        if payload.token.is_empty() {
            log::warn!("⚠️ [AUTH] Login sin token, se ignora");
            return false;
        }
        let changed = self.inner.session.update(|s| {
            if s.matches(&payload) {
                return false;
            }
            s.apply_login(payload);
            true
        });
        if changed {
            self.persist();
        }
        changed
    }

    fn apply_logout(&self) -> bool {
        let changed = self.inner.session.update(|s| {
            if !s.is_authenticated {
                return false;
            }
            s.clear();
            true
        });
        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&self) {
        let persisted = self.inner.session.with(Session::to_persisted);
        if let Err(e) = save_to_storage(self.inner.storage.as_ref(), STORAGE_KEY_AUTH, &persisted) {
            log::error!("❌ [AUTH] No se pudo persistir la sesión: {}", e);
        }
    }

    fn broadcast(&self, event: &AuthEvent) {
        if let Err(e) = self.inner.channel.post(event) {
            log::error!("❌ [AUTH] No se pudo emitir el evento de auth: {}", e);
        }
    }

    // ------------------------------------------------------------------------
    // Lecturas
    // ------------------------------------------------------------------------

    pub fn session(&self) -> Session {
        self.inner.session.get()
    }

    /// Token actual, leído en el momento de la llamada
    pub fn token(&self) -> Option<String> {
        self.inner.session.with(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<UserData> {
        self.inner.session.with(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.with(|s| s.is_authenticated)
    }

    pub fn has_hydrated(&self) -> bool {
        self.inner.session.with(|s| s.has_hydrated)
    }

    pub fn gate(&self) -> AuthGate {
        self.inner.session.with(|s| {
            if !s.has_hydrated {
                AuthGate::Pending
            } else if s.is_authenticated && s.token.as_deref().is_some_and(|t| !t.is_empty()) {
                AuthGate::Authenticated
            } else {
                AuthGate::Anonymous
            }
        })
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Session) + 'static,
    {
        self.inner.session.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.session.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use crate::services::broadcast::{LocalChannelHub, NoopChannel};
    use crate::utils::{KeyValueStorage, MemoryStorage};

    fn payload(token: &str) -> LoginPayload {
        LoginPayload {
            user: UserData {
                id: "42".into(),
                username: "operator".into(),
                role: "admin".into(),
            },
            token: token.into(),
        }
    }

    fn store_on(hub: &LocalChannelHub, storage: Rc<MemoryStorage>) -> AuthStore {
        AuthStore::new(storage, Rc::new(hub.endpoint()))
    }

    #[test]
    fn starts_pending_until_hydrated() {
        let store = AuthStore::new(Rc::new(MemoryStorage::new()), Rc::new(NoopChannel));
        assert_eq!(store.phase(), HydrationPhase::Uninitialized);
        assert_eq!(store.gate(), AuthGate::Pending);

        store.hydrate();
        assert_eq!(store.phase(), HydrationPhase::Hydrated);
        assert!(store.has_hydrated());
        assert_eq!(store.gate(), AuthGate::Anonymous);
    }

    #[test]
    fn login_then_logout_restores_previous_state() {
        let store = AuthStore::new(Rc::new(MemoryStorage::new()), Rc::new(NoopChannel));
        store.hydrate();
        let before = store.session();

        store.login(payload("t1"));
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("t1"));
        assert_eq!(store.gate(), AuthGate::Authenticated);

        store.logout();
        assert_eq!(store.session(), before);
        assert!(store.has_hydrated());
    }

    #[test]
    fn double_logout_broadcasts_once() {
        let hub = LocalChannelHub::new();
        let store = store_on(&hub, Rc::new(MemoryStorage::new()));
        store.hydrate();
        store.login(payload("t1"));
        let after_login = hub.posted();

        store.logout();
        store.logout();
        assert_eq!(hub.posted() - after_login, 1);
    }

    #[test]
    fn same_login_is_idempotent_and_new_token_overwrites() {
        let hub = LocalChannelHub::new();
        let store = store_on(&hub, Rc::new(MemoryStorage::new()));
        store.hydrate();

        store.login(payload("t1"));
        store.login(payload("t1"));
        assert_eq!(hub.posted(), 1);

        store.login(payload("t2"));
        assert_eq!(hub.posted(), 2);
        assert_eq!(store.token().as_deref(), Some("t2"));
    }

    #[test]
    fn login_without_token_is_ignored() {
        let hub = LocalChannelHub::new();
        let storage = Rc::new(MemoryStorage::new());
        let store = store_on(&hub, storage.clone());
        let peer = store_on(&hub, Rc::new(MemoryStorage::new()));
        store.hydrate();
        peer.hydrate();
        let saved = storage.get_item(STORAGE_KEY_AUTH).unwrap();

        store.login(payload(""));
        assert_eq!(store.gate(), AuthGate::Anonymous);
        assert!(store.token().is_none());
        assert_eq!(hub.posted(), 0);
        assert_eq!(storage.get_item(STORAGE_KEY_AUTH).unwrap(), saved);

        peer.login(payload("t1"));
        hub.flush();
        store.login(payload(""));
        assert_eq!(store.token().as_deref(), Some("t1"));
        assert_eq!(hub.posted(), 1);
    }

    #[test]
    fn session_survives_reload() {
        let storage = Rc::new(MemoryStorage::new());
        let first = AuthStore::new(storage.clone(), Rc::new(NoopChannel));
        first.hydrate();
        first.login(payload("persisted"));

        let reloaded = AuthStore::new(storage, Rc::new(NoopChannel));
        assert!(!reloaded.is_authenticated());
        reloaded.hydrate();
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user().map(|u| u.username).as_deref(), Some("operator"));
    }

    #[test]
    fn broken_persisted_state_hydrates_anonymous() {
        let storage = Rc::new(MemoryStorage::new());
        storage
            .set_item(
                STORAGE_KEY_AUTH,
                r#"{"state":{"isAuthenticated":true,"token":"orphan"},"version":0}"#,
            )
            .unwrap();

        let store = AuthStore::new(storage, Rc::new(NoopChannel));
        store.hydrate();
        assert_eq!(store.gate(), AuthGate::Anonymous);
        assert!(store.token().is_none());
    }

    #[test]
    fn subscribers_see_each_change() {
        let store = AuthStore::new(Rc::new(MemoryStorage::new()), Rc::new(NoopChannel));
        let log: Rc<RefCell<Vec<bool>>> = Rc::default();
        let sink = log.clone();
        store.subscribe(move |s| sink.borrow_mut().push(s.is_authenticated));

        store.hydrate();
        store.login(payload("t"));
        store.logout();
        store.logout();

        assert_eq!(*log.borrow(), vec![false, true, false]);
    }

    #[test]
    fn remote_events_are_mirrored_without_echo() {
        let hub = LocalChannelHub::new();
        let tab_a = store_on(&hub, Rc::new(MemoryStorage::new()));
        let tab_b = store_on(&hub, Rc::new(MemoryStorage::new()));
        tab_a.hydrate();
        tab_b.hydrate();

        tab_a.login(payload("shared"));
        hub.flush();
        assert!(tab_b.is_authenticated());
        assert_eq!(tab_b.token().as_deref(), Some("shared"));
        assert_eq!(hub.posted(), 1);

        tab_b.logout();
        hub.flush();
        assert!(!tab_a.is_authenticated());
        assert_eq!(hub.posted(), 2);
        assert_eq!(hub.pending(), 0);
    }
}

use std::rc::Rc;
use ims_dashboard::models::{LoginPayload, UserData};
use ims_dashboard::services::{LocalChannelHub, NoopChannel};
use ims_dashboard::stores::{AuthGate, AuthStore};
use ims_dashboard::utils::{KeyValueStorage, MemoryStorage, STORAGE_KEY_AUTH};

fn payload(token: &str) -> LoginPayload {
    LoginPayload {
        user: UserData {
            id: "u-1".into(),
            username: "operator".into(),
            role: "admin".into(),
        },
        token: token.into(),
    }
}

/// Las pestañas de un mismo perfil comparten localStorage pero no memoria
fn open_tab(hub: &LocalChannelHub, storage: &Rc<MemoryStorage>) -> AuthStore {
    let store = AuthStore::new(storage.clone(), Rc::new(hub.endpoint()));
    store.hydrate();
    store
}

#[test]
fn login_and_logout_converge_across_tabs() {
    let hub = LocalChannelHub::new();
    let storage = Rc::new(MemoryStorage::new());
    let tab_a = open_tab(&hub, &storage);
    let tab_b = open_tab(&hub, &storage);
    let tab_c = open_tab(&hub, &storage);

    tab_a.login(payload("jwt"));
    assert!(!tab_b.is_authenticated());

    hub.flush();
    assert_eq!(tab_b.token().as_deref(), Some("jwt"));
    assert_eq!(tab_c.gate(), AuthGate::Authenticated);
    // Los eventos recibidos no se reenvían
    assert_eq!(hub.posted(), 1);
    assert_eq!(hub.pending(), 0);

    tab_c.logout();
    hub.flush();
    assert!(!tab_a.is_authenticated());
    assert!(!tab_b.is_authenticated());
    assert_eq!(hub.posted(), 2);
}

#[test]
fn token_refresh_in_one_tab_overwrites_the_others() {
    let hub = LocalChannelHub::new();
    let storage = Rc::new(MemoryStorage::new());
    let tab_a = open_tab(&hub, &storage);
    let tab_b = open_tab(&hub, &storage);

    tab_a.login(payload("first"));
    hub.flush();
    tab_b.login(payload("second"));
    hub.flush();

    assert_eq!(tab_a.token().as_deref(), Some("second"));
    assert_eq!(tab_b.token().as_deref(), Some("second"));
}

#[test]
fn new_tab_hydrates_from_persisted_envelope() {
    let hub = LocalChannelHub::new();
    let storage = Rc::new(MemoryStorage::new());
    let tab_a = open_tab(&hub, &storage);
    tab_a.login(payload("persisted"));

    let raw = storage.get_item(STORAGE_KEY_AUTH).unwrap().unwrap();
    let envelope: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(envelope["version"], 0);
    assert_eq!(envelope["state"]["isAuthenticated"], true);
    assert_eq!(envelope["state"]["token"], "persisted");

    let late = AuthStore::new(storage.clone(), Rc::new(NoopChannel));
    assert_eq!(late.gate(), AuthGate::Pending);
    late.hydrate();
    assert_eq!(late.user().map(|u| u.username), Some("operator".to_string()));
}

#[test]
fn login_then_logout_restores_the_anonymous_session() {
    let storage = Rc::new(MemoryStorage::new());
    let store = AuthStore::new(storage, Rc::new(NoopChannel));
    store.hydrate();
    let before = store.session();

    store.login(payload("t"));
    store.logout();
    assert_eq!(store.session(), before);
    assert!(store.has_hydrated());
}

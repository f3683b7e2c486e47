use serde::{Deserialize, Serialize};
use crate::models::auth::{LoginPayload, UserData};

// ============================================================================
// SESSION - Estado de autenticación del AuthStore
// ============================================================================

/// Copia de la sesión autenticada.
///
/// `is_authenticated` es cierto solo si hay `user` y `token`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub user: Option<UserData>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub has_hydrated: bool,
}

impl Session {
    pub fn matches(&self, payload: &LoginPayload) -> bool {
        self.is_authenticated
            && self.user.as_ref() == Some(&payload.user)
            && self.token.as_deref() == Some(payload.token.as_str())
    }

    pub(crate) fn apply_login(&mut self, payload: LoginPayload) {
        self.user = Some(payload.user);
        self.token = Some(payload.token);
        self.is_authenticated = true;
    }

    pub(crate) fn clear(&mut self) {
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
    }

    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            state: PersistedAuthState {
                user: self.user.clone(),
                token: self.token.clone(),
                is_authenticated: self.is_authenticated,
            },
            version: PERSIST_VERSION,
        }
    }
}

/// Versión escrita en el sobre persistido
pub const PERSIST_VERSION: u32 = 0;

/// Sobre guardado bajo la clave de auth: `{"state": {...}, "version": 0}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub state: PersistedAuthState,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAuthState {
    #[serde(default)]
    pub user: Option<UserData>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl PersistedAuthState {
    /// Login restaurado, o `None` si el estado guardado es anónimo o le
    /// falta user o token.
    pub fn into_login(self) -> Option<LoginPayload> {
        if !self.is_authenticated {
            return None;
        }
        match (self.user, self.token) {
            (Some(user), Some(token)) if !token.is_empty() => Some(LoginPayload { user, token }),
            _ => None,
        }
    }
}

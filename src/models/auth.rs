use serde::{Deserialize, Serialize};

/// Perfil del operador devuelto por `POST auth/login`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub role: String,
}

/// `data` de un login correcto; también viaja en el evento `login`
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LoginPayload {
    pub user: UserData,
    pub token: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Mensaje del canal de broadcast `auth_channel`.
///
/// Formato: `{"event":"login","data":{...}}` o `{"event":"logout"}`.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum AuthEvent {
    Login(LoginPayload),
    Logout,
}

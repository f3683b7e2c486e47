/// Clave de storage con el sobre de auth persistido
pub const STORAGE_KEY_AUTH: &str = "user-auth";

/// Canal de broadcast compartido por todas las pestañas
pub const AUTH_CHANNEL_NAME: &str = "auth_channel";

/// Rutas del backend, relativas a la URL base
pub const COUNTRIES_PATH: &str = "countries";
pub const LOGIN_PATH: &str = "auth/login";

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Tiempo que el dashboard muestra un aviso de éxito
pub const SUCCESS_MESSAGE_MILLIS: u32 = 3_000;

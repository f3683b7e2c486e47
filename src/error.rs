// ============================================================================
// ERRORS - Errores que llegan a los view models
// ============================================================================

use std::time::Duration;
use thiserror::Error;

/// Mensaje por defecto cuando una lista no trae un `error` utilizable
pub const LOAD_FALLBACK: &str = "Failed to load countries";
/// Mensaje por defecto cuando una escritura no trae un `error` utilizable
pub const MUTATION_FALLBACK: &str = "Failed to update country";

/// Errores de validación de formularios. Nunca se envían al servidor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("country code is required")]
    EmptyCountryCode,

    #[error("country code `{0}` is not a valid path segment")]
    InvalidCountryCode(String),

    #[error("provider name is required")]
    EmptyProviderName,

    #[error("price is required and must be greater than 0")]
    NonPositivePrice,

    #[error("at least one company is required")]
    NoCompanies,

    #[error("company name is required")]
    EmptyCompanyName,

    #[error("at least one provider is required")]
    NoProviders,

    #[error("no provider at position {0}")]
    UnknownProvider(usize),

    #[error("no company at position {0}")]
    UnknownCompany(usize),

    #[error("username is required")]
    EmptyUsername,

    #[error("password is required")]
    EmptyPassword,
}

/// Errores del pipeline HTTP y de la capa de acceso a datos
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Respuesta de lista mal formada o fallida
    #[error("{0}")]
    Load(String),

    /// Escritura rechazada (no 2xx o `success: false`)
    #[error("{0}")]
    Mutation(String),

    /// 401 del backend. La sesión ya se ha cerrado.
    #[error("session expired, please sign in again")]
    Unauthenticated,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Login rechazado, con el mensaje del servidor si lo hay
    #[error("login rejected: {}", .0.as_deref().unwrap_or("invalid credentials"))]
    LoginRejected(Option<String>),

    /// Estado de error distinto de 401, sin modificar
    #[error("HTTP {status}")]
    Http { status: u16, message: Option<String> },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Convertir un fallo HTTP en fallo de lista
    pub fn into_load(self) -> Self {
        match self {
            ApiError::Http { message, .. } => {
                ApiError::Load(message.unwrap_or_else(|| LOAD_FALLBACK.to_string()))
            }
            other => other,
        }
    }

    /// Convertir un fallo HTTP en fallo de escritura
    pub fn into_mutation(self) -> Self {
        match self {
            ApiError::Http { message, .. } => {
                ApiError::Mutation(message.unwrap_or_else(|| MUTATION_FALLBACK.to_string()))
            }
            other => other,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}

/// Fallos de transporte, antes de interpretar el estado
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(msg) => ApiError::Network(msg),
            TransportError::Timeout(after) => ApiError::Timeout(after),
            TransportError::Cancelled => ApiError::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,

    #[error("could not serialize value: {0}")]
    Serialize(String),

    #[error("could not write `{key}`")]
    Write { key: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    #[error("broadcast channel is not available")]
    Unavailable,

    #[error("could not encode auth event: {0}")]
    Encode(String),

    #[error("could not post auth event: {0}")]
    Post(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_take_server_message_or_fallback() {
        let with_message = ApiError::Http {
            status: 500,
            message: Some("database down".into()),
        };
        assert_eq!(with_message.into_load(), ApiError::Load("database down".into()));

        let bare = ApiError::Http {
            status: 422,
            message: None,
        };
        assert_eq!(
            bare.into_mutation(),
            ApiError::Mutation(MUTATION_FALLBACK.into())
        );
    }

    #[test]
    fn relabel_keeps_other_variants() {
        assert_eq!(ApiError::Unauthenticated.into_load(), ApiError::Unauthenticated);
        assert_eq!(
            ApiError::Network("reset".into()).into_mutation(),
            ApiError::Network("reset".into())
        );
    }
}

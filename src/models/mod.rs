pub mod auth;
pub mod country;
pub mod session;

pub use auth::{AuthEvent, LoginPayload, LoginRequest, UserData};
pub use country::{
    ApiEnvelope, Company, Country, CountryUpdate, PendingSubmission, Provider, ProviderCompany,
};
pub use session::{PersistedAuthState, PersistedSession, Session};

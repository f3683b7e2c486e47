pub mod auth_store;

pub use auth_store::{AuthGate, AuthStore, HydrationPhase};

pub mod auth_service;
pub mod broadcast;
pub mod countries_service;
pub mod http_client;
pub mod query_cache;
pub mod transport;

pub use auth_service::AuthService;
pub use broadcast::{AuthChannel, LocalAuthChannel, LocalChannelHub, NoopChannel};
pub use countries_service::CountriesService;
pub use http_client::{Access, HttpClient};
pub use query_cache::{QueryCache, QueryKey};
pub use transport::{HttpRequest, HttpResponse, MemoryTransport, Method, Transport};

#[cfg(target_arch = "wasm32")]
pub use broadcast::BrowserAuthChannel;
#[cfg(target_arch = "wasm32")]
pub use transport::GlooTransport;
#[cfg(not(target_arch = "wasm32"))]
pub use transport::ReqwestTransport;
